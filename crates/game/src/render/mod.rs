//! Rendering: turn the game state into (mesh, shader, model matrix) draw calls.
//!
//! The host owns the GPU, camera and viewports. The game only decides what
//! to draw and where, through the `Renderer` trait.

pub mod overlay;

use std::collections::HashMap;

use glam::{Mat4, Quat, Vec3};
use physics::{ObstacleKind, DRONE_BODY_HEIGHT};
use procgen::{
    blade_mesh, building_mesh, crate_mesh, drone_body_mesh, indicator_mesh, tile_mesh, tree_mesh,
    MeshData, COLOR_BLUE, COLOR_RED,
};

use crate::state::GameState;
pub use overlay::TextItem;

/// Scale applied to objects in the top-down minimap so they stay visible.
pub const MINIMAP_SCALE: f32 = 3.0;

/// Beacon pillar height above a package or drop zone.
const BEACON_HEIGHT: f32 = 100.0;
/// Beacon pillar width.
const BEACON_WIDTH: f32 = 0.07;
/// Indicator tilt toward the objective.
const INDICATOR_PITCH_DEG: f32 = 110.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshId {
    Tile,
    Tree,
    Building,
    DroneBody,
    Blade,
    Target,
    Delivery,
    Indicator,
}

impl MeshId {
    pub const ALL: [MeshId; 8] = [
        MeshId::Tile,
        MeshId::Tree,
        MeshId::Building,
        MeshId::DroneBody,
        MeshId::Blade,
        MeshId::Target,
        MeshId::Delivery,
        MeshId::Indicator,
    ];
}

impl From<ObstacleKind> for MeshId {
    fn from(kind: ObstacleKind) -> Self {
        match kind {
            ObstacleKind::Tree => MeshId::Tree,
            ObstacleKind::Building => MeshId::Building,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderId {
    /// Plain per-vertex colour.
    VertexColor,
    /// Ground tiles, displaced by the height field.
    Terrain,
    /// Darkens everything outside a radius around the drone.
    Fog,
}

/// Which view is being drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    Main,
    Minimap,
}

/// Per-pass values every shader can read.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneUniforms {
    pub drone_position: Vec3,
    pub fog: bool,
    /// Seed of the terrain height field, for shaders that displace tiles.
    pub terrain_seed: f32,
}

/// Receives draw calls for one frame.
pub trait Renderer {
    /// Start a view. Called before any draw of that view.
    fn begin_pass(&mut self, _pass: Pass, _uniforms: &SceneUniforms) {}

    fn draw(&mut self, mesh: MeshId, shader: ShaderId, model: Mat4);

    fn draw_text(&mut self, _text: &TextItem) {}
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCommand {
    pub pass: Pass,
    pub mesh: MeshId,
    pub shader: ShaderId,
    pub model: Mat4,
}

/// A `Renderer` that records draw calls, for headless runs and tests.
#[derive(Debug, Default)]
pub struct DrawList {
    pass: Option<Pass>,
    pub clear_color: [f32; 4],
    pub commands: Vec<DrawCommand>,
    pub text: Vec<TextItem>,
}

impl DrawList {
    pub fn clear(&mut self) {
        self.pass = None;
        self.commands.clear();
        self.text.clear();
    }

    pub fn count(&self, pass: Pass, mesh: MeshId) -> usize {
        self.commands
            .iter()
            .filter(|c| c.pass == pass && c.mesh == mesh)
            .count()
    }
}

impl Renderer for DrawList {
    fn begin_pass(&mut self, pass: Pass, _uniforms: &SceneUniforms) {
        self.pass = Some(pass);
    }

    fn draw(&mut self, mesh: MeshId, shader: ShaderId, model: Mat4) {
        self.commands.push(DrawCommand {
            pass: self.pass.unwrap_or(Pass::Main),
            mesh,
            shader,
            model,
        });
    }

    fn draw_text(&mut self, text: &TextItem) {
        self.text.push(text.clone());
    }
}

/// CPU-side geometry for every mesh the game draws, built once at load time.
pub struct MeshLibrary {
    meshes: HashMap<MeshId, MeshData>,
}

impl MeshLibrary {
    pub fn build() -> Self {
        let meshes = MeshId::ALL
            .into_iter()
            .map(|id| {
                let mesh = match id {
                    MeshId::Tile => tile_mesh(),
                    MeshId::Tree => tree_mesh(),
                    MeshId::Building => building_mesh(),
                    MeshId::DroneBody => drone_body_mesh(),
                    MeshId::Blade => blade_mesh(),
                    MeshId::Target => crate_mesh(COLOR_RED),
                    MeshId::Delivery => crate_mesh(COLOR_BLUE),
                    MeshId::Indicator => indicator_mesh(),
                };
                (id, mesh)
            })
            .collect();
        Self { meshes }
    }

    pub fn get(&self, id: MeshId) -> Option<&MeshData> {
        self.meshes.get(&id)
    }

    pub fn triangle_count(&self) -> usize {
        self.meshes.values().map(MeshData::triangle_count).sum()
    }

    /// Bytes of vertex data to upload for the whole library.
    pub fn vertex_bytes(&self) -> usize {
        MeshId::ALL
            .iter()
            .filter_map(|&id| self.get(id))
            .map(|m| m.vertex_bytes().len())
            .sum()
    }
}

fn uniforms(state: &GameState) -> SceneUniforms {
    SceneUniforms {
        drone_position: state.drone.position,
        fog: state.fog,
        terrain_seed: state.terrain.creation_time(),
    }
}

/// Pillar marking a package or drop zone from afar.
fn beacon_matrix(base: Mat4) -> Mat4 {
    base * Mat4::from_translation(Vec3::new(0.0, BEACON_HEIGHT / 2.0, 0.0))
        * Mat4::from_scale(Vec3::new(BEACON_WIDTH, BEACON_HEIGHT, BEACON_WIDTH))
}

/// Cone hovering over the drone, pointing at the current objective.
pub fn indicator_matrix(state: &GameState) -> Mat4 {
    let drone = &state.drone;
    let to_goal = (state.objective() - drone.position).normalize_or_zero();
    let yaw = to_goal.x.atan2(to_goal.z);
    let above = drone.position + Vec3::new(0.0, drone.size * DRONE_BODY_HEIGHT + 1.0, 0.0);

    Mat4::from_translation(above)
        * Mat4::from_quat(Quat::from_rotation_y(yaw))
        * Mat4::from_quat(Quat::from_rotation_x(INDICATOR_PITCH_DEG.to_radians()))
        * Mat4::from_scale(drone.size / 2.0 * Vec3::new(0.5, 2.5, 0.5))
}

/// Submit the whole scene once. `scale` enlarges the drone and packages.
pub fn render_scene(state: &GameState, renderer: &mut impl Renderer, scale: f32) {
    let object_shader = if state.fog {
        ShaderId::Fog
    } else {
        ShaderId::VertexColor
    };
    let field = state.terrain.playfield();

    if state.fog {
        // Dark plane under the whole map so the fog edge has something to fade into.
        let (sx, sz) = (field.size_x as f32, field.size_z as f32);
        let void = Mat4::from_translation(Vec3::new(-sx * 2.0, -0.01, -sz * 2.0))
            * Mat4::from_scale(Vec3::new(sx * 2.0, 0.0, sz * 4.0));
        renderer.draw(MeshId::Tile, ShaderId::VertexColor, void);
    }

    renderer.draw(MeshId::DroneBody, ShaderId::VertexColor, state.drone.base_matrix(scale));
    for blade in state.drone.blade_matrices(scale) {
        renderer.draw(MeshId::Blade, ShaderId::VertexColor, blade);
    }

    for placed in state.terrain.placed_obstacles() {
        renderer.draw(placed.kind().into(), object_shader, placed.transform);
    }
    for &tile in state.terrain.tile_matrices() {
        renderer.draw(MeshId::Tile, ShaderId::Terrain, tile);
    }

    let scaled = Mat4::from_scale(Vec3::splat(scale));
    let target = state.terrain.target();
    renderer.draw(MeshId::Target, object_shader, target.matrix() * scaled);

    match state.carried_target() {
        Some(carried) => {
            renderer.draw(MeshId::Delivery, object_shader, carried.delivery_matrix() * scaled);
            if state.show_ui {
                let beacon = beacon_matrix(carried.delivery_matrix());
                renderer.draw(MeshId::Delivery, ShaderId::VertexColor, beacon);
            }
        }
        None if state.show_ui => {
            renderer.draw(MeshId::Target, ShaderId::VertexColor, beacon_matrix(target.matrix()));
        }
        None => {}
    }
}

/// Draw one frame: the main view, then the indicator, score and minimap when the UI is on.
pub fn render_frame(state: &GameState, renderer: &mut impl Renderer, screen: (f32, f32)) {
    let uniforms = uniforms(state);

    renderer.begin_pass(Pass::Main, &uniforms);
    render_scene(state, renderer, 1.0);
    if !state.show_ui {
        return;
    }

    renderer.draw(MeshId::Indicator, ShaderId::VertexColor, indicator_matrix(state));
    for item in overlay::build(state, screen.0, screen.1) {
        renderer.draw_text(&item);
    }

    renderer.begin_pass(Pass::Minimap, &uniforms);
    render_scene(state, renderer, MINIMAP_SCALE);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use engine_core::FixedClock;
    use input::KeyAction;

    fn state() -> GameState {
        let config = GameConfig {
            map_size_x: 20,
            map_size_z: 20,
            seed: Some(4),
            ..Default::default()
        };
        GameState::new(config, &FixedClock(1.0)).unwrap()
    }

    #[test]
    fn frame_draws_every_object_in_both_passes() {
        let s = state();
        let mut list = DrawList::default();
        render_frame(&s, &mut list, (1280.0, 720.0));

        let obstacles = s.terrain.placed_obstacles().len();
        for pass in [Pass::Main, Pass::Minimap] {
            assert_eq!(list.count(pass, MeshId::DroneBody), 1);
            assert_eq!(list.count(pass, MeshId::Blade), 4);
            assert_eq!(list.count(pass, MeshId::Tile), 21 * 21);
            assert_eq!(
                list.count(pass, MeshId::Tree) + list.count(pass, MeshId::Building),
                obstacles
            );
            // Package plus its beacon.
            assert_eq!(list.count(pass, MeshId::Target), 2);
            assert_eq!(list.count(pass, MeshId::Delivery), 0);
        }
        assert_eq!(list.count(Pass::Main, MeshId::Indicator), 1);
        assert_eq!(list.count(Pass::Minimap, MeshId::Indicator), 0);
        assert_eq!(list.text.len(), 1);
    }

    #[test]
    fn hidden_ui_skips_minimap_and_beacons() {
        let mut s = state();
        s.handle_action(KeyAction::ToggleUi, &FixedClock(0.0)).unwrap();
        let mut list = DrawList::default();
        render_frame(&s, &mut list, (1280.0, 720.0));

        assert!(list.commands.iter().all(|c| c.pass == Pass::Main));
        assert_eq!(list.count(Pass::Main, MeshId::Target), 1);
        assert_eq!(list.count(Pass::Main, MeshId::Indicator), 0);
        assert!(list.text.is_empty());
    }

    #[test]
    fn fog_switches_object_shader_and_adds_backdrop() {
        let mut s = state();
        s.fog = true;
        let mut list = DrawList::default();
        render_scene(&s, &mut list, 1.0);

        let target = list
            .commands
            .iter()
            .find(|c| c.mesh == MeshId::Target && c.shader != ShaderId::VertexColor);
        assert_eq!(target.map(|c| c.shader), Some(ShaderId::Fog));
        let tiles = list.count(Pass::Main, MeshId::Tile);
        assert_eq!(tiles, 21 * 21 + 1);
    }

    #[test]
    fn carrying_shows_the_drop_zone() {
        let mut s = state();
        let t = *s.terrain.target();
        s.drone.position = t.position + Vec3::new(0.0, t.height() + 0.1, 0.0);
        s.update(0.0, &Default::default()).unwrap();
        assert!(s.drone.is_carrying());

        let mut list = DrawList::default();
        render_scene(&s, &mut list, 1.0);
        assert_eq!(list.count(Pass::Main, MeshId::Delivery), 2);
        assert_eq!(list.count(Pass::Main, MeshId::Target), 1);
    }

    #[test]
    fn indicator_points_at_the_objective() {
        let mut s = state();
        s.drone.position = Vec3::new(0.0, 5.0, 0.0);
        let m = indicator_matrix(&s);
        let origin = m.transform_point3(Vec3::ZERO);
        assert!((origin.y - (5.0 + 0.4 * DRONE_BODY_HEIGHT + 1.0)).abs() < 1e-5);
    }

    #[test]
    fn library_holds_every_mesh() {
        let library = MeshLibrary::build();
        for id in MeshId::ALL {
            assert!(library.get(id).is_some_and(|m| m.triangle_count() > 0), "{:?}", id);
        }
        assert!(library.triangle_count() > 0);
        assert!(library.vertex_bytes() > 0);
    }
}
