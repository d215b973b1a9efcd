//! Drone delivery: fly a drone over generated terrain, pick up packages and
//! drop them off for points.
//!
//! This binary runs the game headless under an autopilot for a fixed number
//! of frames, which is how the simulation is smoke-tested without a window.

mod autopilot;
mod config;
mod drone;
mod events;
mod render;
mod state;

use std::time::Duration;

use anyhow::Result;
use engine_core::Time;
use input::InputState;

use autopilot::Autopilot;
use config::GameConfig;
use render::{render_frame, DrawList, MeshLibrary};
use state::GameState;

/// Fixed simulation step for headless runs.
const FRAME: Duration = Duration::from_nanos(1_000_000_000 / 60);
/// Nominal screen size handed to the overlay.
const SCREEN: (f32, f32) = (1280.0, 720.0);

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = GameConfig::load();
    if !GameConfig::exists() {
        config.save();
    }
    log::info!(
        "Starting drone delivery: {}x{} playfield, {} obstacle slots, {} frames",
        config.map_size_x,
        config.map_size_z,
        config.obstacle_count(),
        config.headless_frames
    );

    let meshes = MeshLibrary::build();
    log::debug!(
        "Built mesh library: {} triangles, {} bytes of vertices",
        meshes.triangle_count(),
        meshes.vertex_bytes()
    );

    let mut time = Time::new();
    let mut state = GameState::new(config.clone(), &time)?;
    let mut input = InputState::new();
    let mut pilot = Autopilot::new();
    let mut frame = DrawList::default();
    let mut collisions = 0u32;

    for _ in 0..config.headless_frames {
        time.step(FRAME);
        input.begin_frame();
        for (key, key_state) in pilot.key_events(&state) {
            input.process_keyboard(key, key_state);
        }

        for action in input.actions() {
            if let Some(event) = state.handle_action(action, &time)? {
                event.log();
            }
        }
        for event in state.update(time.delta_seconds(), &input.drone_controls())? {
            if matches!(event, events::GameEvent::Collision { .. }) {
                collisions += 1;
            }
            event.log();
        }

        frame.clear();
        frame.clear_color = state.begin_frame();
        render_frame(&state, &mut frame, SCREEN);
    }

    log::info!(
        "Finished {} frames ({:.1}s simulated): score {}, {} deliveries, {} collisions, {} draw calls in the last frame",
        time.frame_count(),
        time.elapsed().as_secs_f32(),
        state.score,
        state.deliveries,
        collisions,
        frame.commands.len()
    );
    Ok(())
}
