//! The generated world: playfield tiles, obstacles, the active package and
//! the height field, all owned by one `Terrain`.
//!
//! **Seed-based determinism:** placement draws from a single `StdRng` owned
//! by the terrain, so a fixed seed and creation time reproduce the same world
//! and the same sequence of packages.

use glam::Mat4;
use physics::{DroneBody, Obstacle, ObstacleSet, DRONE_SIZE};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::heightfield::HeightField;
use crate::placement::{
    place_target, scatter_obstacles, spawn_probe, PlacedObstacle, PlacementError, Playfield,
};
use crate::target::{Target, DEFAULT_TARGET_SIZE};

/// Playfield area per obstacle slot in the default density.
pub const DEFAULT_AREA_PER_OBSTACLE: u32 = 40;

/// Obstacle slots for a `size_x` by `size_z` field at one obstacle per
/// `area_per_obstacle` tiles.
pub fn obstacle_slots(size_x: u32, size_z: u32, area_per_obstacle: u32) -> usize {
    let area = size_x as usize * size_z as usize;
    area / area_per_obstacle.max(1) as usize
}

/// Configuration for terrain generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerrainConfig {
    /// Playfield width in tiles (x).
    pub size_x: u32,
    /// Playfield depth in tiles (z).
    pub size_z: u32,
    /// Obstacle slots to fill. Crowded fields may end up with fewer.
    pub obstacle_count: usize,
    /// Package edge length.
    pub target_size: f32,
    /// Size of the drone whose spawn point must stay clear.
    pub drone_size: f32,
    /// Give up placing a package after this many draws. None retries forever.
    pub attempt_cap: Option<u32>,
    /// Seed for placement. None draws one from the OS.
    pub seed: Option<u64>,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        let (size_x, size_z) = (110, 100);
        Self {
            size_x,
            size_z,
            obstacle_count: obstacle_slots(size_x, size_z, DEFAULT_AREA_PER_OBSTACLE),
            target_size: DEFAULT_TARGET_SIZE,
            drone_size: DRONE_SIZE,
            attempt_cap: None,
            seed: None,
        }
    }
}

/// Identifies one generation of the active package.
///
/// A new handle is issued each time the package is regenerated, so a handle
/// held across a delivery no longer resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetHandle(u64);

#[derive(Debug)]
pub struct Terrain {
    config: TerrainConfig,
    field: Playfield,
    heights: HeightField,
    obstacles: ObstacleSet,
    placed: Vec<PlacedObstacle>,
    tiles: Vec<Mat4>,
    target: Target,
    target_generation: u64,
    rng: StdRng,
}

impl Terrain {
    /// Generate a world created at `creation_time` seconds.
    pub fn generate(config: TerrainConfig, creation_time: f32) -> Result<Self, PlacementError> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::generate_with_rng(config, creation_time, rng)
    }

    /// Generate using an explicit random stream.
    pub fn generate_with_rng(
        config: TerrainConfig,
        creation_time: f32,
        mut rng: StdRng,
    ) -> Result<Self, PlacementError> {
        let field = Playfield::new(config.size_x, config.size_z);
        let heights = HeightField::new(creation_time);

        let mut obstacles = ObstacleSet::new();
        let (placed, stats) = scatter_obstacles(
            &mut rng,
            field,
            config.obstacle_count,
            &spawn_probe(config.drone_size),
            &mut obstacles,
        );
        if stats.abandoned > 0 {
            log::warn!(
                "Abandoned {} of {} obstacle slots; playfield is crowded",
                stats.abandoned,
                config.obstacle_count
            );
        }
        log::debug!(
            "Placed {} obstacles ({} rejected candidates)",
            stats.placed,
            stats.rejected
        );

        let target = place_target(
            &mut rng,
            field,
            &obstacles,
            &heights,
            config.target_size,
            config.attempt_cap,
        )?;

        log::info!(
            "Generated {}x{} terrain with {} obstacles, package worth {}",
            config.size_x,
            config.size_z,
            obstacles.len(),
            target.reward()
        );

        Ok(Self {
            config,
            field,
            heights,
            obstacles,
            placed,
            tiles: field.tile_matrices(),
            target,
            target_generation: 0,
            rng,
        })
    }

    /// Throw the world away and generate a new one, continuing the random stream.
    pub fn regenerate(&mut self, creation_time: f32) -> Result<(), PlacementError> {
        let rng = self.rng.clone();
        let generation = self.target_generation + 1;
        *self = Self::generate_with_rng(self.config, creation_time, rng)?;
        self.target_generation = generation;
        Ok(())
    }

    /// Replace the package with a fresh one. Obstacles are kept.
    pub fn generate_target(&mut self) -> Result<TargetHandle, PlacementError> {
        self.target = place_target(
            &mut self.rng,
            self.field,
            &self.obstacles,
            &self.heights,
            self.config.target_size,
            self.config.attempt_cap,
        )?;
        self.target_generation += 1;
        log::debug!("New package worth {}", self.target.reward());
        Ok(self.target_handle())
    }

    /// Add a hand-placed obstacle. Returns false if one already stands at its position.
    pub fn insert_obstacle(&mut self, obstacle: Obstacle) -> bool {
        if !self.obstacles.insert(obstacle) {
            return false;
        }
        self.placed.push(PlacedObstacle::new(obstacle));
        true
    }

    /// Whether the drone touches any obstacle.
    pub fn hit(&self, drone: &DroneBody) -> bool {
        self.obstacles.iter().any(|o| o.hit(drone))
    }

    /// Ground elevation at (x, z).
    pub fn height_at(&self, x: f32, z: f32) -> f32 {
        self.heights.height(x, z)
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn target_handle(&self) -> TargetHandle {
        TargetHandle(self.target_generation)
    }

    /// The package, if `handle` still refers to the current one.
    pub fn resolve(&self, handle: TargetHandle) -> Option<&Target> {
        (handle == self.target_handle()).then_some(&self.target)
    }

    pub fn resolve_mut(&mut self, handle: TargetHandle) -> Option<&mut Target> {
        if handle == self.target_handle() {
            Some(&mut self.target)
        } else {
            None
        }
    }

    pub fn config(&self) -> &TerrainConfig {
        &self.config
    }

    pub fn playfield(&self) -> Playfield {
        self.field
    }

    pub fn height_field(&self) -> &HeightField {
        &self.heights
    }

    pub fn creation_time(&self) -> f32 {
        self.heights.seed_time()
    }

    pub fn obstacles(&self) -> &ObstacleSet {
        &self.obstacles
    }

    /// Obstacles with the model matrices of their unit meshes, in placement order.
    pub fn placed_obstacles(&self) -> &[PlacedObstacle] {
        &self.placed
    }

    pub fn tile_matrices(&self) -> &[Mat4] {
        &self.tiles
    }
}
