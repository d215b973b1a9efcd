//! Game state: the world, the drone, score and view toggles, advanced once per frame.

use engine_core::Clock;
use glam::Vec3;
use input::{DroneControls, KeyAction};
use procgen::{PlacementError, Target, Terrain};

use crate::config::GameConfig;
use crate::drone::{Drone, SPAWN_POSITION};
use crate::events::GameEvent;

/// Frames the delivery flash stays on screen.
pub const FEEDBACK_FRAMES: u32 = 15;

/// Distance moved per second at normal speed.
const MOVE_SPEED: f32 = 3.0;
/// Yaw change per second.
const TURN_SPEED: f32 = 1.5;
/// Rotor spin per second while hovering.
const IDLE_SPIN: f32 = 15.0;
/// Rotor spin per second while moving.
const ACTIVE_SPIN: f32 = 25.0;
/// Vertical moves are this much faster than horizontal ones.
const CLIMB_FACTOR: f32 = 1.2;
/// A rejected move is undone with this much extra push.
const BOUNCE_FACTOR: f32 = 1.2;
/// Extra air kept between the drone and the ground.
const GROUND_GAP: f32 = 0.05;

pub const CLEAR_DELIVERED: [f32; 4] = [0.1, 1.0, 0.1, 1.0];
pub const CLEAR_FOG: [f32; 4] = [0.01, 0.01, 0.06, 1.0];
pub const CLEAR_SKY: [f32; 4] = [0.3, 0.3, 0.8, 1.0];

/// Camera placement relative to the drone. The host owns the camera itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMode {
    FirstPerson,
    ThirdPerson,
}

impl CameraMode {
    fn toggled(self) -> Self {
        match self {
            CameraMode::FirstPerson => CameraMode::ThirdPerson,
            CameraMode::ThirdPerson => CameraMode::FirstPerson,
        }
    }
}

pub struct GameState {
    config: GameConfig,
    pub terrain: Terrain,
    pub drone: Drone,
    pub score: u32,
    /// Frames left of the delivery flash.
    pub feedback: u32,
    pub camera_mode: CameraMode,
    /// Draw obstacles and packages with the fog shader.
    pub fog: bool,
    /// Show score, beacon, heading indicator and minimap.
    pub show_ui: bool,
    pub deliveries: u32,
}

impl GameState {
    /// Generate the first world, reading the creation time from `clock`.
    pub fn new(config: GameConfig, clock: &impl Clock) -> Result<Self, PlacementError> {
        let terrain = Terrain::generate(config.terrain_config(), clock.elapsed_seconds())?;
        let drone = Drone::new(SPAWN_POSITION, config.drone_size);
        Ok(Self {
            config,
            terrain,
            drone,
            score: 0,
            feedback: 0,
            camera_mode: CameraMode::FirstPerson,
            fog: false,
            show_ui: true,
            deliveries: 0,
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Reset score and drone and generate a fresh world.
    pub fn restart(&mut self, clock: &impl Clock) -> Result<(), PlacementError> {
        self.score = 0;
        self.feedback = 0;
        self.deliveries = 0;
        self.camera_mode = CameraMode::FirstPerson;
        self.show_ui = true;
        self.drone = Drone::new(SPAWN_POSITION, self.config.drone_size);
        self.terrain.regenerate(clock.elapsed_seconds())
    }

    /// Apply a discrete key action.
    pub fn handle_action(
        &mut self,
        action: KeyAction,
        clock: &impl Clock,
    ) -> Result<Option<GameEvent>, PlacementError> {
        match action {
            KeyAction::Restart => {
                self.restart(clock)?;
                return Ok(Some(GameEvent::Restarted));
            }
            KeyAction::ToggleCamera => self.camera_mode = self.camera_mode.toggled(),
            KeyAction::ToggleFog => self.fog = !self.fog,
            KeyAction::ToggleUi => self.show_ui = !self.show_ui,
        }
        log::debug!(
            "{:?}: camera {:?}, fog {}, ui {}",
            action,
            self.camera_mode,
            self.fog,
            self.show_ui
        );
        Ok(None)
    }

    /// The package the drone is holding, if any.
    pub fn carried_target(&self) -> Option<&Target> {
        self.drone.carrying().and_then(|h| self.terrain.resolve(h))
    }

    /// Where the drone should head next: the package, or its drop zone once picked up.
    pub fn objective(&self) -> Vec3 {
        match self.carried_target() {
            Some(target) => target.delivery_position,
            None => self.terrain.target().position,
        }
    }

    /// Advance one frame of flight.
    pub fn update(
        &mut self,
        dt: f32,
        controls: &DroneControls,
    ) -> Result<Vec<GameEvent>, PlacementError> {
        let mut events = Vec::new();

        let dt = if controls.boost {
            dt * self.config.map_ceiling / 5.0
        } else {
            dt
        };
        let step = dt * MOVE_SPEED;
        let mut spin = dt * IDLE_SPIN;
        let (forward, right) = self.drone.movement_axes();

        let mut moves = Vec::with_capacity(3);
        if controls.forward {
            moves.push(forward * step);
        } else if controls.back {
            moves.push(-forward * step);
        }
        if controls.strafe_right {
            moves.push(right * step);
        } else if controls.strafe_left {
            moves.push(-right * step);
        }
        if controls.ascend {
            moves.push(Vec3::Y * step * CLIMB_FACTOR);
        } else if controls.descend {
            moves.push(Vec3::NEG_Y * step * CLIMB_FACTOR);
        }
        if !moves.is_empty() {
            spin = dt * ACTIVE_SPIN;
        }
        for delta in moves {
            self.translate(delta, &mut events);
        }
        self.drone.blade_angle += spin;

        let turn = dt * TURN_SPEED;
        if controls.rotate_left {
            self.drone.heading += turn;
        } else if controls.rotate_right {
            self.drone.heading -= turn;
        }

        self.update_target(&mut events)?;
        Ok(events)
    }

    /// Pick up, carry and deliver the package.
    fn update_target(&mut self, events: &mut Vec<GameEvent>) -> Result<(), PlacementError> {
        let handle = self.terrain.target_handle();
        if self.drone.try_acquire(self.terrain.target(), handle) {
            events.push(GameEvent::TargetAcquired {
                reward: self.terrain.target().reward(),
            });
        }

        let Some(handle) = self.drone.carrying() else {
            return Ok(());
        };
        let Some(target) = self.terrain.resolve_mut(handle) else {
            // Package replaced underneath us (restart); nothing left to carry.
            self.drone.release();
            return Ok(());
        };
        self.drone.carry(target);
        if !target.can_deliver() {
            return Ok(());
        }

        let reward = target.reward();
        // Replace first so a failed placement leaves the package carried and unscored.
        self.terrain.generate_target()?;
        self.score += reward;
        self.deliveries += 1;
        self.feedback = FEEDBACK_FRAMES;
        self.drone.release();
        events.push(GameEvent::TargetDelivered {
            reward,
            score: self.score,
        });
        Ok(())
    }

    /// Move the drone by `delta`, keeping it in bounds and bouncing it off obstacles.
    fn translate(&mut self, delta: Vec3, events: &mut Vec<GameEvent>) {
        let payload = self.carried_target().map(|t| t.size);
        let old = self.drone.position;
        self.drone.position = self.keep_in_bounds(old + delta, payload);

        let moved = self.drone.position - old;
        if self.terrain.hit(&self.drone.body(payload)) {
            self.drone.position -= moved * BOUNCE_FACTOR;
            events.push(GameEvent::Collision {
                position: self.drone.position,
            });
        }
    }

    /// Clamp a position to the playfield, above the ground and below the ceiling.
    pub fn keep_in_bounds(&self, position: Vec3, payload: Option<f32>) -> Vec3 {
        let field = self.terrain.playfield();
        let x = position.x.clamp(-field.half_x(), field.half_x());
        let z = position.z.clamp(-field.half_z(), field.half_z());

        let floor = self.terrain.height_at(x, z) + self.drone.ground_clearance(payload) + GROUND_GAP;
        let y = position.y.max(floor).min(self.config.map_ceiling);
        Vec3::new(x, y, z)
    }

    /// Clear colour for the next frame. Counts the delivery flash down.
    pub fn begin_frame(&mut self) -> [f32; 4] {
        if self.feedback > 0 {
            self.feedback -= 1;
            CLEAR_DELIVERED
        } else if self.fog {
            CLEAR_FOG
        } else {
            CLEAR_SKY
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine_core::FixedClock;
    use physics::{Building, GroundPoint};

    fn empty_config() -> GameConfig {
        GameConfig {
            obstacle_area_per_obstacle: u32::MAX,
            seed: Some(21),
            ..Default::default()
        }
    }

    fn state() -> GameState {
        GameState::new(empty_config(), &FixedClock(2.0)).unwrap()
    }

    /// Put the drone into the pickup window above the package.
    fn hover_over_target(state: &mut GameState) {
        let t = state.terrain.target();
        state.drone.position = t.position + Vec3::new(0.0, t.height() + 0.1, 0.0);
    }

    const IDLE: DroneControls = DroneControls {
        forward: false,
        back: false,
        strafe_left: false,
        strafe_right: false,
        ascend: false,
        descend: false,
        rotate_left: false,
        rotate_right: false,
        boost: false,
    };

    #[test]
    fn new_state_starts_at_spawn() {
        let s = state();
        assert_eq!(s.drone.position, SPAWN_POSITION);
        assert_eq!(s.score, 0);
        assert!(s.terrain.obstacles().is_empty());
        assert_eq!(s.terrain.creation_time(), 2.0);
    }

    #[test]
    fn forward_moves_along_heading_and_spins_faster() {
        let mut s = state();
        let events = s
            .update(0.1, &DroneControls { forward: true, ..IDLE })
            .unwrap();
        assert!(events.is_empty());
        assert!((s.drone.position.z - (5.0 - 0.3)).abs() < 1e-5);
        assert!((s.drone.blade_angle - 2.5).abs() < 1e-5);

        let mut idle = state();
        idle.update(0.1, &IDLE).unwrap();
        assert!((idle.drone.blade_angle - 1.5).abs() < 1e-5);
    }

    #[test]
    fn boost_scales_by_ceiling() {
        let mut s = state();
        s.update(0.1, &DroneControls { strafe_right: true, boost: true, ..IDLE })
            .unwrap();
        assert!((s.drone.position.x - 0.9).abs() < 1e-5);
    }

    #[test]
    fn rotation_turns_the_heading() {
        let mut s = state();
        s.update(1.0, &DroneControls { rotate_left: true, ..IDLE }).unwrap();
        assert!((s.drone.heading - 1.5).abs() < 1e-6);
        s.update(0.5, &DroneControls { rotate_right: true, ..IDLE }).unwrap();
        assert!((s.drone.heading - 0.75).abs() < 1e-6);
    }

    #[test]
    fn drone_stays_inside_the_playfield() {
        let mut s = state();
        s.drone.position = Vec3::new(54.9, 14.9, 0.0);
        s.update(1.0, &DroneControls { strafe_right: true, ascend: true, ..IDLE })
            .unwrap();
        assert_eq!(s.drone.position.x, 55.0);
        assert_eq!(s.drone.position.y, 15.0);

        s.update(10.0, &DroneControls { descend: true, ..IDLE }).unwrap();
        let ground = s.terrain.height_at(55.0, 0.0);
        assert!((s.drone.position.y - (ground + 0.075 + 0.05)).abs() < 1e-5);
    }

    #[test]
    fn obstacle_pushes_the_drone_back() {
        let mut s = state();
        s.drone.position = Vec3::new(10.0, 0.5, 12.5);
        s.terrain
            .insert_obstacle(Building::new(GroundPoint::new(10.0, 10.0), 4.0, 2.0).into());

        let before = s.drone.position;
        let events = s.update(0.6, &DroneControls { forward: true, ..IDLE }).unwrap();
        assert!(matches!(events.as_slice(), [GameEvent::Collision { .. }]));
        // Pushed past the starting point, away from the building.
        assert!(s.drone.position.z > before.z);
    }

    #[test]
    fn pickup_then_delivery_scores_and_replaces_the_package() {
        let mut s = state();
        hover_over_target(&mut s);
        let first = s.terrain.target_handle();

        let events = s.update(0.0, &IDLE).unwrap();
        assert!(matches!(events.as_slice(), [GameEvent::TargetAcquired { .. }]));
        assert_eq!(s.drone.carrying(), Some(first));

        // Carry the package to its drop zone.
        let target = *s.terrain.target();
        let hang = s.drone.position.y - s.drone.payload_position(target.size).y;
        s.drone.position = target.delivery_position + Vec3::new(0.0, hang, 0.0);
        let events = s.update(0.0, &IDLE).unwrap();

        let reward = target.reward();
        assert_eq!(
            events,
            vec![GameEvent::TargetDelivered { reward, score: reward }]
        );
        assert_eq!(s.score, reward);
        assert!(reward >= 5);
        assert!(!s.drone.is_carrying());
        assert_ne!(s.terrain.target_handle(), first);
        assert_eq!(s.feedback, FEEDBACK_FRAMES);
    }

    #[test]
    fn failed_replacement_keeps_the_package_unscored() {
        let config = GameConfig {
            map_size_x: 20,
            map_size_z: 20,
            placement_attempt_cap: Some(500),
            ..empty_config()
        };
        let mut s = GameState::new(config, &FixedClock(2.0)).unwrap();
        hover_over_target(&mut s);
        s.update(0.0, &IDLE).unwrap();
        let first = s.terrain.target_handle();
        assert_eq!(s.drone.carrying(), Some(first));

        // Pack the field so no new package fits anywhere.
        for x in -10..=10 {
            for z in -10..=10 {
                let at = GroundPoint::new(x as f32, z as f32);
                s.terrain.insert_obstacle(Building::new(at, 0.5, 3.0).into());
            }
        }

        let target = *s.terrain.target();
        let hang = s.drone.position.y - s.drone.payload_position(target.size).y;
        s.drone.position = target.delivery_position + Vec3::new(0.0, hang, 0.0);

        for _ in 0..2 {
            let err = s.update(0.0, &IDLE).unwrap_err();
            assert!(matches!(err, PlacementError::TerrainTooDense { .. }));
            assert_eq!(s.score, 0);
            assert_eq!(s.deliveries, 0);
            assert_eq!(s.feedback, 0);
            assert_eq!(s.drone.carrying(), Some(first));
            assert_eq!(s.terrain.target_handle(), first);
        }
    }

    #[test]
    fn carried_package_is_not_delivered_far_from_the_drop_zone() {
        let mut s = state();
        hover_over_target(&mut s);
        s.update(0.0, &IDLE).unwrap();
        assert!(s.drone.is_carrying());

        let events = s.update(0.5, &DroneControls { ascend: true, ..IDLE }).unwrap();
        assert!(events.is_empty());
        assert!(s.drone.is_carrying());
        let carried = s.carried_target().unwrap();
        assert_eq!(carried.position, s.drone.payload_position(carried.size));
        assert_eq!(s.objective(), carried.delivery_position);
    }

    #[test]
    fn delivery_flash_counts_down() {
        let mut s = state();
        s.feedback = 2;
        assert_eq!(s.begin_frame(), CLEAR_DELIVERED);
        assert_eq!(s.begin_frame(), CLEAR_DELIVERED);
        assert_eq!(s.begin_frame(), CLEAR_SKY);

        s.handle_action(KeyAction::ToggleFog, &FixedClock(0.0)).unwrap();
        assert_eq!(s.begin_frame(), CLEAR_FOG);
    }

    #[test]
    fn toggles_flip_flags() {
        let mut s = state();
        let clock = FixedClock(0.0);
        s.handle_action(KeyAction::ToggleCamera, &clock).unwrap();
        s.handle_action(KeyAction::ToggleUi, &clock).unwrap();
        assert_eq!(s.camera_mode, CameraMode::ThirdPerson);
        assert!(!s.show_ui);
    }

    #[test]
    fn restart_resets_everything() {
        let mut s = state();
        hover_over_target(&mut s);
        s.update(0.0, &IDLE).unwrap();
        s.score = 40;
        s.show_ui = false;
        s.camera_mode = CameraMode::ThirdPerson;

        let event = s.handle_action(KeyAction::Restart, &FixedClock(9.0)).unwrap();
        assert_eq!(event, Some(GameEvent::Restarted));
        assert_eq!(s.score, 0);
        assert!(s.show_ui);
        assert_eq!(s.camera_mode, CameraMode::FirstPerson);
        assert!(!s.drone.is_carrying());
        assert_eq!(s.drone.position, SPAWN_POSITION);
        assert_eq!(s.terrain.creation_time(), 9.0);
    }
}
