//! The package the drone must pick up and its drop zone.

use engine_core::Transform;
use glam::{Mat4, Vec3};
use physics::{payload_height, Building, GroundPoint};

/// Default package edge length.
pub const DEFAULT_TARGET_SIZE: f32 = 0.3;

/// Minimum ground distance between pickup and drop zone.
pub const MIN_DELIVERY_DISTANCE: f32 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Target {
    /// Current package position. Follows the drone while carried.
    pub position: Vec3,
    /// Centre of the drop zone.
    pub delivery_position: Vec3,
    pub size: f32,
    /// Package yaw; mirrors the carrying drone's heading.
    pub heading: f32,
    /// Distance from pickup to drop zone at generation time; the score reward.
    pub distance: f32,
}

impl Target {
    pub fn new(pickup: Vec3, delivery: Vec3, size: f32) -> Self {
        Self {
            position: pickup,
            delivery_position: delivery,
            size,
            heading: 0.0,
            distance: pickup.distance(delivery),
        }
    }

    pub fn height(&self) -> f32 {
        payload_height(self.size)
    }

    /// Half of the package's footprint edge.
    pub fn half_footprint(&self) -> f32 {
        self.size / 2.0
    }

    /// Whether the package is close enough to the drop zone to count as delivered.
    pub fn can_deliver(&self) -> bool {
        self.position.distance(self.delivery_position) <= self.size
    }

    /// Points awarded for delivering this package.
    pub fn reward(&self) -> u32 {
        self.distance.floor() as u32
    }

    pub fn matrix(&self) -> Mat4 {
        Transform::from_position_scale(self.position, self.scale())
            .with_yaw(self.heading)
            .to_matrix()
    }

    pub fn delivery_matrix(&self) -> Mat4 {
        Transform::from_position_scale(self.delivery_position, self.scale()).to_matrix()
    }

    fn scale(&self) -> Vec3 {
        Vec3::new(self.size, self.height(), self.size)
    }

    /// Footprint used to keep pickup and drop zone clear of obstacles.
    pub fn clearance_footprint(at: GroundPoint, size: f32) -> Building {
        Building::new(at, size / 2.0, size * 3.0 / 10.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> Target {
        Target::new(Vec3::new(0.0, 0.1, 0.0), Vec3::new(6.0, 0.1, 8.0), 0.3)
    }

    #[test]
    fn distance_and_reward_are_precomputed() {
        let t = target();
        assert!((t.distance - 10.0).abs() < 1e-5);
        assert_eq!(t.reward(), 10);
    }

    #[test]
    fn delivery_requires_package_within_its_size() {
        let mut t = target();
        assert!(!t.can_deliver());

        t.position = t.delivery_position + Vec3::new(0.31, 0.0, 0.0);
        assert!(!t.can_deliver());

        t.position = t.delivery_position + Vec3::new(0.2, 0.1, 0.0);
        assert!(t.can_deliver());
    }

    #[test]
    fn matrix_scales_package_height() {
        let t = target();
        let top = t.matrix().transform_point3(Vec3::new(0.0, 0.5, 0.0));
        assert!((top.y - (0.1 + t.height() / 2.0)).abs() < 1e-6);
    }
}
