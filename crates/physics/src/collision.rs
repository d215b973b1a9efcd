//! Approximate hit tests between the drone and obstacles.
//!
//! The drone is treated as an upright elliptical cylinder: a lateral radius
//! derived from its arm span and a vertical half-extent derived from its body
//! height. While carrying a package its vertical reach grows by the package
//! height so the dangling payload does not clip into geometry.

use glam::Vec3;

use crate::obstacle::{Building, GroundPoint, Obstacle, Tree, UprightShape};

/// Length of one drone arm (tip to tip) at size 1.
pub const DRONE_ARM_LENGTH: f32 = 1.75;
/// Width of one drone arm at size 1.
pub const DRONE_ARM_WIDTH: f32 = 0.25;
/// Height of the drone body at size 1.
pub const DRONE_BODY_HEIGHT: f32 = 0.25;
/// Default drone scale.
pub const DRONE_SIZE: f32 = 0.4;

/// A package's rendered height is its size divided by this.
pub const PAYLOAD_HEIGHT_DIVISOR: f32 = 1.5;

/// Height of a package of the given size.
pub fn payload_height(size: f32) -> f32 {
    size / PAYLOAD_HEIGHT_DIVISOR
}

/// The collision volume of a drone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DroneBody {
    pub position: Vec3,
    pub size: f32,
    /// Size of the carried package, if any.
    pub payload: Option<f32>,
}

impl DroneBody {
    pub fn new(position: Vec3, size: f32) -> Self {
        Self {
            position,
            size,
            payload: None,
        }
    }

    pub fn with_payload(mut self, payload_size: f32) -> Self {
        self.payload = Some(payload_size);
        self
    }

    pub fn lateral_radius(&self) -> f32 {
        self.size * DRONE_ARM_LENGTH / 2.0
    }

    pub fn vertical_radius(&self) -> f32 {
        self.size * DRONE_BODY_HEIGHT * 0.75
    }

    /// Vertical radius grown by the carried package, if any.
    pub fn loaded_vertical_radius(&self) -> f32 {
        self.vertical_radius() + self.payload.map_or(0.0, payload_height)
    }

    fn ground(&self) -> GroundPoint {
        GroundPoint::from_vec3(self.position)
    }
}

/// Whether a drone with the given radii touches a cone standing at `cone.base`.
///
/// The cone radius is interpolated linearly from the base to a small tip
/// radius; the vertical band extends half the drone radius above the tip.
pub fn cone_hit(cone: &UprightShape, drone: Vec3, radius_xz: f32, radius_y: f32) -> bool {
    if drone.y < cone.base.y - radius_y || drone.y > cone.base.y + cone.height + radius_y / 2.0 {
        return false;
    }

    let d = (drone.y - cone.base.y).abs();
    let slope = (0.05 - cone.radius) / cone.height;
    let intercept = cone.radius + 0.01;
    let r = (slope * d + intercept).abs();

    GroundPoint::from_vec3(drone).distance(GroundPoint::from_vec3(cone.base)) <= r + radius_xz
}

/// Whether a drone with the given radii touches an upright cylinder.
pub fn cylinder_hit(cylinder: &UprightShape, drone: Vec3, radius_xz: f32, radius_y: f32) -> bool {
    if drone.y < cylinder.base.y - radius_y
        || drone.y > cylinder.base.y + cylinder.height + radius_y
    {
        return false;
    }

    GroundPoint::from_vec3(drone).distance(GroundPoint::from_vec3(cylinder.base))
        <= cylinder.radius + radius_xz
}

impl Building {
    pub fn hit(&self, drone: &DroneBody) -> bool {
        let radius_xz = drone.lateral_radius();
        let mut radius_y = drone.vertical_radius();

        if drone.position.y > self.height + radius_y {
            radius_y = drone.loaded_vertical_radius();
        }
        if drone.position.y > self.height + radius_y {
            return false;
        }

        let reach = self.hit_half_width() + radius_xz;
        let p = drone.ground();
        (p.x - self.position.x).abs() <= reach && (p.z - self.position.z).abs() <= reach
    }
}

impl Tree {
    pub fn hit(&self, drone: &DroneBody) -> bool {
        let radius_xz = drone.lateral_radius();
        let radius_y = drone.vertical_radius();

        let lobe_hit = |lobe: UprightShape| {
            let ry = if drone.position.y > lobe.base.y {
                drone.loaded_vertical_radius()
            } else {
                radius_y
            };
            cone_hit(&lobe, drone.position, radius_xz, ry)
        };

        lobe_hit(self.lower_lobe())
            || lobe_hit(self.upper_lobe())
            || cylinder_hit(&self.trunk(), drone.position, radius_xz, radius_y)
    }
}

impl Obstacle {
    pub fn hit(&self, drone: &DroneBody) -> bool {
        match self {
            Obstacle::Tree(t) => t.hit(drone),
            Obstacle::Building(b) => b.hit(drone),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drone_at(x: f32, y: f32, z: f32) -> DroneBody {
        DroneBody::new(Vec3::new(x, y, z), DRONE_SIZE)
    }

    #[test]
    fn drone_above_small_tree_is_clear() {
        let tree = Tree::new(GroundPoint::ORIGIN, 0.5, 1.0);
        assert!(!tree.hit(&drone_at(0.0, 5.0, 0.0)));
    }

    #[test]
    fn drone_inside_canopy_hits() {
        let tree = Tree::new(GroundPoint::ORIGIN, 0.5, 1.0);
        assert!(tree.hit(&drone_at(0.0, 0.6, 0.0)));
    }

    #[test]
    fn drone_beside_tree_is_clear() {
        let tree = Tree::new(GroundPoint::ORIGIN, 0.5, 1.0);
        assert!(!tree.hit(&drone_at(2.0, 0.6, 0.0)));
    }

    #[test]
    fn trunk_is_hit_below_canopy() {
        let tree = Tree::new(GroundPoint::ORIGIN, 1.0, 10.0);
        // Below the lower lobe (base at 4.0) but inside the trunk band.
        assert!(tree.hit(&drone_at(0.5, 1.0, 0.0)));
        assert!(!tree.hit(&drone_at(1.0, 1.0, 0.0)));
    }

    #[test]
    fn carried_payload_extends_reach_over_tree_top() {
        let tree = Tree::new(GroundPoint::ORIGIN, 0.5, 1.0);
        let drone = drone_at(0.0, 1.3, 0.0);
        assert!(!tree.hit(&drone));
        assert!(tree.hit(&drone.with_payload(0.3)));
    }

    #[test]
    fn building_hit_at_ground_inside_footprint() {
        let building = Building::new(GroundPoint::new(10.0, 10.0), 4.0, 2.0);
        assert!(building.hit(&drone_at(10.0, 0.1, 10.0)));
        assert!(!building.hit(&drone_at(20.0, 0.1, 20.0)));
    }

    #[test]
    fn building_lateral_reach_uses_quarter_footprint() {
        let building = Building::new(GroundPoint::ORIGIN, 4.0, 2.0);
        // 2.0 / 4 + 0.4 * 1.75 / 2 = 0.85
        assert!(building.hit(&drone_at(0.8, 1.0, 0.0)));
        assert!(!building.hit(&drone_at(0.9, 1.0, 0.0)));
    }

    #[test]
    fn carried_payload_extends_reach_over_roof() {
        let building = Building::new(GroundPoint::ORIGIN, 4.0, 2.0);
        let drone = drone_at(0.0, 4.2, 0.0);
        assert!(!building.hit(&drone));
        assert!(building.hit(&drone.with_payload(0.3)));
    }

    #[test]
    fn obstacle_dispatches_to_variant() {
        let drone = drone_at(0.0, 0.6, 0.0);
        let tree: Obstacle = Tree::new(GroundPoint::ORIGIN, 0.5, 1.0).into();
        let far: Obstacle = Building::new(GroundPoint::new(30.0, 0.0), 4.0, 2.0).into();
        assert!(tree.hit(&drone));
        assert!(!far.hit(&drone));
    }
}
