//! Rejection-sampling placement of obstacles and delivery targets.
//!
//! Candidates are drawn uniformly over the playfield and rejected if they
//! would block the drone's spawn point or overlap the nearest obstacle
//! already placed. Comparing against the nearest obstacle only keeps each
//! test linear; it can admit rare overlaps with farther neighbours.

use std::ops::Range;

use engine_core::Transform;
use glam::{Mat4, Vec3};
use physics::{Building, DroneBody, GroundPoint, Obstacle, ObstacleKind, ObstacleSet, Tree};
use rand::Rng;
use thiserror::Error;

use crate::heightfield::HeightField;
use crate::target::{Target, MIN_DELIVERY_DISTANCE};

/// Consecutive rejections after which an obstacle slot is abandoned.
pub const MAX_CONSECUTIVE_FAILURES: u32 = 50;

/// Every n-th obstacle (starting with the first) is a building.
pub const BUILDING_EVERY: usize = 6;

/// Global multiplier applied to sampled obstacle scales.
pub const BASE_SCALE: f32 = 2.0;

/// Range of the per-obstacle scale factor before `BASE_SCALE`.
pub const SCALE_RANGE: Range<f32> = 2.0..5.0;

/// Footprint width relative to height, for both trees and buildings.
pub const FOOTPRINT_RATIO: f32 = 3.0 / 5.0;

/// Where the drone appears at the start of a round.
pub const SPAWN_POSITION: Vec3 = Vec3::new(0.0, 5.0, 0.0);

/// Pickup and drop zone are sampled from this fraction of the playfield.
pub const TARGET_AREA_FRACTION: f32 = 0.9;

/// Default-mode placement logs progress every this many failed attempts.
const STALL_REPORT_INTERVAL: u32 = 10_000;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlacementError {
    #[error("terrain too dense: no free spot for the {what} after {attempts} attempts")]
    TerrainTooDense { what: &'static str, attempts: u32 },
}

/// The rectangular play area, `size_x` by `size_z` unit tiles centred on the origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Playfield {
    pub size_x: u32,
    pub size_z: u32,
}

impl Playfield {
    pub fn new(size_x: u32, size_z: u32) -> Self {
        Self { size_x, size_z }
    }

    pub fn half_x(&self) -> f32 {
        self.size_x as f32 / 2.0
    }

    pub fn half_z(&self) -> f32 {
        self.size_z as f32 / 2.0
    }

    /// One model matrix per tile at every integer offset across the field.
    /// The unit tile mesh is 2 x 1, hence the halved x scale.
    pub fn tile_matrices(&self) -> Vec<Mat4> {
        let (x0, z0) = (-self.half_x(), -self.half_z());
        let mut tiles = Vec::with_capacity(((self.size_x + 1) * (self.size_z + 1)) as usize);
        for ix in 0..=self.size_x {
            for iz in 0..=self.size_z {
                let position = Vec3::new(x0 + ix as f32, 0.0, z0 + iz as f32);
                tiles.push(
                    Transform::from_position_scale(position, Vec3::new(0.5, 1.0, 1.0)).to_matrix(),
                );
            }
        }
        tiles
    }
}

/// An accepted obstacle together with the model matrix of its unit mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedObstacle {
    pub obstacle: Obstacle,
    pub transform: Mat4,
}

impl PlacedObstacle {
    /// Pair an obstacle with the matrix that stretches its unit mesh over it.
    pub fn new(obstacle: Obstacle) -> Self {
        let transform = match &obstacle {
            // The unit building mesh is centred, so lift it onto the ground.
            Obstacle::Building(b) => Transform::from_position_scale(
                b.position.at_height(b.height / 2.0),
                Vec3::new(b.half_footprint, b.height, b.half_footprint),
            ),
            Obstacle::Tree(t) => Transform::from_position_scale(
                t.position.at_height(0.0),
                Vec3::new(t.radius * 2.0, t.height, t.radius * 2.0),
            ),
        };
        Self {
            obstacle,
            transform: transform.to_matrix(),
        }
    }

    pub fn kind(&self) -> ObstacleKind {
        self.obstacle.kind()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlacementStats {
    pub placed: usize,
    pub abandoned: usize,
    pub rejected: usize,
}

/// Uniform sample in `[lo, hi)`, collapsing to the midpoint when the range is empty.
fn sample_between(rng: &mut impl Rng, lo: f32, hi: f32) -> f32 {
    if lo < hi {
        rng.gen_range(lo..hi)
    } else {
        (lo + hi) / 2.0
    }
}

/// The drone's collision body at spawn, used to keep the spawn point clear.
pub fn spawn_probe(drone_size: f32) -> DroneBody {
    DroneBody::new(SPAWN_POSITION, drone_size)
}

fn sample_obstacle(rng: &mut impl Rng, field: Playfield, index: usize) -> Obstacle {
    let max_radius_y = 2.75 * BASE_SCALE / 2.0;
    let margin = max_radius_y * FOOTPRINT_RATIO / 2.0;

    let x = sample_between(rng, -field.half_x() + margin, field.half_x() - margin);
    let z = sample_between(rng, -field.half_z() + margin, field.half_z() - margin);
    let position = GroundPoint::new(x, z);

    let scale_y = rng.gen_range(SCALE_RANGE) * BASE_SCALE;
    let scale_xz = scale_y * FOOTPRINT_RATIO;

    if index % BUILDING_EVERY == 0 {
        Building::new(position, scale_y, scale_xz).into()
    } else {
        Tree::new(position, scale_xz * 0.5, scale_y).into()
    }
}

/// Scatter up to `count` obstacles into `set`.
///
/// A slot whose candidates are rejected more than `MAX_CONSECUTIVE_FAILURES`
/// times in a row is skipped, so fewer obstacles than requested may be placed.
pub fn scatter_obstacles(
    rng: &mut impl Rng,
    field: Playfield,
    count: usize,
    spawn: &DroneBody,
    set: &mut ObstacleSet,
) -> (Vec<PlacedObstacle>, PlacementStats) {
    let mut placed = Vec::with_capacity(count);
    let mut stats = PlacementStats::default();

    for index in 0..count {
        let mut failures = 0;
        loop {
            if failures > MAX_CONSECUTIVE_FAILURES {
                stats.abandoned += 1;
                break;
            }

            let obstacle = sample_obstacle(rng, field, index);
            if obstacle.hit(spawn) || !set.is_clear(&obstacle) || !set.insert(obstacle) {
                failures += 1;
                stats.rejected += 1;
                continue;
            }

            placed.push(PlacedObstacle::new(obstacle));
            stats.placed += 1;
            break;
        }
    }

    (placed, stats)
}

/// Draw points until `accept` passes. With a cap, gives up after `cap` draws.
fn sample_clear_point(
    rng: &mut impl Rng,
    field: Playfield,
    attempt_cap: Option<u32>,
    what: &'static str,
    mut accept: impl FnMut(GroundPoint) -> bool,
) -> Result<GroundPoint, PlacementError> {
    let range_x = field.half_x() * TARGET_AREA_FRACTION;
    let range_z = field.half_z() * TARGET_AREA_FRACTION;
    let mut attempts = 0u32;

    loop {
        if attempt_cap.is_some_and(|cap| attempts >= cap) {
            return Err(PlacementError::TerrainTooDense { what, attempts });
        }
        attempts = attempts.saturating_add(1);

        let point = GroundPoint::new(
            sample_between(rng, -range_x, range_x),
            sample_between(rng, -range_z, range_z),
        );
        if accept(point) {
            if attempts > 1 {
                log::debug!("Placed {} after {} attempts", what, attempts);
            }
            return Ok(point);
        }

        if attempts % STALL_REPORT_INTERVAL == 0 {
            log::warn!("Still searching for a free {} spot after {} attempts", what, attempts);
        }
    }
}

/// Place a fresh package and drop zone clear of obstacles, at least
/// `MIN_DELIVERY_DISTANCE` apart on the ground plane.
///
/// Without `attempt_cap` this retries until it succeeds.
pub fn place_target(
    rng: &mut impl Rng,
    field: Playfield,
    obstacles: &ObstacleSet,
    heights: &HeightField,
    size: f32,
    attempt_cap: Option<u32>,
) -> Result<Target, PlacementError> {
    let is_free = |p: GroundPoint| obstacles.is_clear(&Target::clearance_footprint(p, size).into());
    let lift = size / 3.0;

    let pickup = sample_clear_point(rng, field, attempt_cap, "pickup", &is_free)?;
    let drop_zone = sample_clear_point(rng, field, attempt_cap, "drop zone", |p| {
        is_free(p) && p.distance(pickup) >= MIN_DELIVERY_DISTANCE
    })?;

    let pickup = pickup.at_height(heights.height(pickup.x, pickup.z) + lift);
    let drop_zone = drop_zone.at_height(heights.height(drop_zone.x, drop_zone.z) + lift);
    Ok(Target::new(pickup, drop_zone, size))
}
