//! Scripted pilot for headless runs. Presses and releases keys through the
//! normal input path, so it exercises the same code as a human player.

use std::collections::HashSet;
use std::f32::consts::{PI, TAU};

use glam::Vec3;
use input::{ElementState, KeyCode};

use crate::state::GameState;

/// Cruising altitude below the ceiling, above every obstacle.
const CRUISE_MARGIN: f32 = 0.5;
/// Horizontal distance at which the pilot stops and descends.
const ARRIVAL_RADIUS: f32 = 0.15;
/// Heading error tolerated before flying forward.
const HEADING_TOLERANCE: f32 = 0.08;
/// Boost only when the objective is further than this.
const BOOST_DISTANCE: f32 = 4.0;

#[derive(Debug, Default)]
pub struct Autopilot {
    held: HashSet<KeyCode>,
}

/// Wrap an angle into `(-PI, PI]`.
fn wrap_angle(a: f32) -> f32 {
    let a = a.rem_euclid(TAU);
    if a > PI {
        a - TAU
    } else {
        a
    }
}

impl Autopilot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys the pilot wants held this frame.
    pub fn desired_keys(&self, state: &GameState) -> HashSet<KeyCode> {
        let mut keys = HashSet::new();
        let drone = &state.drone;
        let goal = state.objective();

        let offset = Vec3::new(goal.x - drone.position.x, 0.0, goal.z - drone.position.z);
        let distance = offset.length();

        if distance <= ARRIVAL_RADIUS {
            keys.insert(KeyCode::ControlLeft);
            return keys;
        }

        let cruise = state.config().map_ceiling - CRUISE_MARGIN;
        if drone.position.y < cruise && distance > 1.0 {
            keys.insert(KeyCode::ShiftLeft);
            return keys;
        }

        // Heading whose forward vector (-sin a, 0, -cos a) points at the goal.
        let wanted = (-offset.x).atan2(-offset.z);
        let error = wrap_angle(wanted - drone.heading);
        if error.abs() > HEADING_TOLERANCE {
            keys.insert(if error > 0.0 { KeyCode::KeyQ } else { KeyCode::KeyE });
        } else {
            keys.insert(KeyCode::KeyW);
            if distance > BOOST_DISTANCE {
                keys.insert(KeyCode::Space);
            }
        }
        keys
    }

    /// Key transitions that move the held set to what the pilot wants now.
    pub fn key_events(&mut self, state: &GameState) -> Vec<(KeyCode, ElementState)> {
        let wanted = self.desired_keys(state);
        let mut events: Vec<(KeyCode, ElementState)> = self
            .held
            .difference(&wanted)
            .map(|&k| (k, ElementState::Released))
            .collect();
        events.extend(wanted.difference(&self.held).map(|&k| (k, ElementState::Pressed)));
        self.held = wanted;
        events
    }
}
