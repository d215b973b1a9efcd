//! The player drone: pose, rotor animation and the package it carries.

use std::f32::consts::FRAC_PI_4;

use engine_core::Transform;
use glam::{Mat4, Quat, Vec3};
use physics::{payload_height, DroneBody, DRONE_ARM_LENGTH, DRONE_BODY_HEIGHT};
use procgen::{Target, TargetHandle};

/// Slack allowed between the drone's belly and the package top, and around the package footprint.
pub const PICKUP_TOLERANCE: f32 = 0.2;

/// Where the drone starts and restarts.
pub const SPAWN_POSITION: Vec3 = procgen::SPAWN_POSITION;

/// Gap between the drone's belly and the top of a carried package.
const PAYLOAD_GAP: f32 = 0.01;

#[derive(Debug, Clone, PartialEq)]
pub struct Drone {
    pub position: Vec3,
    pub size: f32,
    /// Yaw in radians. At 0 the drone faces -Z.
    pub heading: f32,
    /// Rotor spin in radians.
    pub blade_angle: f32,
    carrying: Option<TargetHandle>,
}

impl Drone {
    pub fn new(position: Vec3, size: f32) -> Self {
        Self {
            position,
            size,
            heading: 0.0,
            blade_angle: 0.0,
            carrying: None,
        }
    }

    pub fn carrying(&self) -> Option<TargetHandle> {
        self.carrying
    }

    pub fn is_carrying(&self) -> bool {
        self.carrying.is_some()
    }

    /// Half of the body height at this drone's size.
    pub fn half_height(&self) -> f32 {
        DRONE_BODY_HEIGHT * self.size / 2.0
    }

    /// Latch onto `target` if the drone hovers just above it.
    ///
    /// Does nothing while already carrying. Returns whether the package was picked up.
    pub fn try_acquire(&mut self, target: &Target, handle: TargetHandle) -> bool {
        if self.carrying.is_some() {
            return false;
        }

        let top = target.position.y + target.height();
        if top >= self.position.y {
            return false;
        }
        if self.position.y - self.half_height() > top + PICKUP_TOLERANCE {
            return false;
        }

        let reach = target.half_footprint() + PICKUP_TOLERANCE;
        let dx = (self.position.x - target.position.x).abs();
        let dz = (self.position.z - target.position.z).abs();
        if dx <= reach && dz <= reach {
            self.carrying = Some(handle);
            true
        } else {
            false
        }
    }

    /// Let go of the carried package.
    pub fn release(&mut self) -> Option<TargetHandle> {
        self.carrying.take()
    }

    /// Where a carried package of the given size hangs.
    pub fn payload_position(&self, payload_size: f32) -> Vec3 {
        let drop = self.half_height() + payload_size / 3.0 + PAYLOAD_GAP;
        self.position - Vec3::new(0.0, drop, 0.0)
    }

    /// Move a carried package under the drone and turn it with the drone.
    pub fn carry(&self, target: &mut Target) {
        target.position = self.payload_position(target.size);
        target.heading = self.heading;
    }

    /// Collision volume, grown by the carried package's height if any.
    pub fn body(&self, payload_size: Option<f32>) -> DroneBody {
        let body = DroneBody::new(self.position, self.size);
        match payload_size {
            Some(size) => body.with_payload(size),
            None => body,
        }
    }

    /// Lowest altitude above the ground the drone may fly at.
    pub fn ground_clearance(&self, payload_size: Option<f32>) -> f32 {
        self.size * DRONE_BODY_HEIGHT * 0.75 + payload_size.map_or(0.0, payload_height)
    }

    pub fn transform(&self) -> Transform {
        Transform::from_position_scale(self.position, Vec3::splat(self.size)).with_yaw(self.heading)
    }

    /// Unit vectors for forward and right movement on the ground plane.
    pub fn movement_axes(&self) -> (Vec3, Vec3) {
        let t = self.transform();
        (t.forward(), t.right())
    }

    /// Model matrix of the body mesh, optionally scaled for the minimap.
    pub fn base_matrix(&self, scale: f32) -> Mat4 {
        self.transform().to_matrix() * Mat4::from_scale(Vec3::splat(scale))
    }

    /// Model matrices of the four rotors at the arm tips.
    pub fn blade_matrices(&self, scale: f32) -> [Mat4; 4] {
        let half_span = DRONE_ARM_LENGTH * self.size / 2.0;
        let lift = self.size * (DRONE_ARM_LENGTH / 10.0 + DRONE_BODY_HEIGHT / 8.0 + 0.02);
        let yaw = Quat::from_rotation_y(self.heading);
        let spin = Quat::from_rotation_y(self.heading + self.blade_angle);
        let blade_scale = Vec3::new(2.0, 1.0, 1.0) * self.size * scale;

        let (s, c) = FRAC_PI_4.sin_cos();
        [(-1.0, 1.0), (-1.0, -1.0), (1.0, -1.0), (1.0, 1.0)].map(|(dx, dz)| {
            let tip = yaw * Vec3::new(dx * c * half_span, 0.0, dz * s * half_span);
            let position = self.position + tip + Vec3::new(0.0, lift, 0.0);
            Mat4::from_scale_rotation_translation(blade_scale, spin, position)
        })
    }
}
