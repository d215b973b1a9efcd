//! Obstacle shapes scattered over the playfield and their pairwise overlap rules.
//!
//! Overlap is judged on the ground plane only. Buildings use a shrunken
//! footprint (a third of their half-width) so the generator can pack them
//! closer than their meshes suggest; that factor drives terrain density.

use glam::Vec3;

/// Extra clearance added to every pairwise overlap test.
pub const INTERSECT_MARGIN: f32 = 0.1;

/// Building half-widths are divided by this before overlap tests.
pub const BUILDING_OVERLAP_SHRINK: f32 = 3.0;

/// Width (x and z) of the unit building mesh before scaling.
pub const BUILDING_UNIT_WIDTH: f32 = 0.5;
/// Height of the unit building mesh before scaling.
pub const BUILDING_UNIT_HEIGHT: f32 = 1.0;

/// Height of the unit tree mesh before scaling.
pub const TREE_UNIT_HEIGHT: f32 = 1.0;
/// Canopy radius of the unit tree mesh before scaling.
pub const TREE_UNIT_RADIUS: f32 = 0.5;

/// A point on the ground plane.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GroundPoint {
    pub x: f32,
    pub z: f32,
}

impl GroundPoint {
    pub const ORIGIN: Self = Self { x: 0.0, z: 0.0 };

    pub fn new(x: f32, z: f32) -> Self {
        Self { x, z }
    }

    /// Project a world position onto the ground plane.
    pub fn from_vec3(v: Vec3) -> Self {
        Self { x: v.x, z: v.z }
    }

    /// Lift the point to height `y`.
    pub fn at_height(self, y: f32) -> Vec3 {
        Vec3::new(self.x, y, self.z)
    }

    /// Euclidean distance on the ground plane.
    pub fn distance(self, other: GroundPoint) -> f32 {
        let dx = self.x - other.x;
        let dz = self.z - other.z;
        (dx * dx + dz * dz).sqrt()
    }
}

/// An upright cone or cylinder: circular base at `base`, extending `height` upward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UprightShape {
    pub base: Vec3,
    pub radius: f32,
    pub height: f32,
}

/// A tree: thin trunk cylinder topped by two stacked canopy cones.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tree {
    pub position: GroundPoint,
    /// Canopy footprint radius (radius of the lower lobe).
    pub radius: f32,
    pub height: f32,
}

impl Tree {
    pub fn new(position: GroundPoint, radius: f32, height: f32) -> Self {
        Self {
            position,
            radius,
            height,
        }
    }

    /// The trunk cylinder, rising from the ground to 4/5 of the tree height.
    pub fn trunk(&self) -> UprightShape {
        UprightShape {
            base: self.position.at_height(0.0),
            radius: self.radius / 5.0,
            height: 4.0 * self.height / 5.0,
        }
    }

    /// The wide lower canopy lobe.
    pub fn lower_lobe(&self) -> UprightShape {
        UprightShape {
            base: self.position.at_height(2.0 * self.height / 5.0),
            radius: self.radius,
            height: 3.0 * self.height / 5.0,
        }
    }

    /// The narrow upper canopy lobe.
    pub fn upper_lobe(&self) -> UprightShape {
        UprightShape {
            base: self.position.at_height(4.0 * self.height / 5.0),
            radius: self.radius / 2.0,
            height: 2.0 * self.height / 5.0,
        }
    }
}

/// A building: an axis-aligned square prism standing on the ground.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Building {
    pub position: GroundPoint,
    /// Scale applied to the unit building width; the mesh half-width is
    /// `half_footprint * BUILDING_UNIT_WIDTH / 2`.
    pub half_footprint: f32,
    pub height: f32,
}

impl Building {
    pub fn new(position: GroundPoint, height: f32, half_footprint: f32) -> Self {
        Self {
            position,
            half_footprint,
            height,
        }
    }

    /// Half-width of the rendered footprint, used for hit-testing.
    pub fn hit_half_width(&self) -> f32 {
        self.half_footprint * BUILDING_UNIT_WIDTH / 2.0
    }
}

/// Discriminant of an [`Obstacle`], also used as the render mesh name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObstacleKind {
    Tree,
    Building,
}

impl ObstacleKind {
    pub fn name(self) -> &'static str {
        match self {
            ObstacleKind::Tree => "Tree",
            ObstacleKind::Building => "Building",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Obstacle {
    Tree(Tree),
    Building(Building),
}

impl Obstacle {
    pub fn position(&self) -> GroundPoint {
        match self {
            Obstacle::Tree(t) => t.position,
            Obstacle::Building(b) => b.position,
        }
    }

    pub fn kind(&self) -> ObstacleKind {
        match self {
            Obstacle::Tree(_) => ObstacleKind::Tree,
            Obstacle::Building(_) => ObstacleKind::Building,
        }
    }

    /// Whether two obstacles' footprints overlap. Symmetric in its arguments.
    pub fn intersects(&self, other: &Obstacle) -> bool {
        let d = self.position().distance(other.position());
        let reach = match (self, other) {
            (Obstacle::Tree(a), Obstacle::Tree(b)) => a.radius + b.radius,
            (Obstacle::Tree(t), Obstacle::Building(b))
            | (Obstacle::Building(b), Obstacle::Tree(t)) => {
                t.radius + b.half_footprint / BUILDING_OVERLAP_SHRINK
            }
            (Obstacle::Building(a), Obstacle::Building(b)) => {
                (a.half_footprint + b.half_footprint) / BUILDING_OVERLAP_SHRINK
            }
        };
        d <= reach + INTERSECT_MARGIN
    }
}

impl From<Tree> for Obstacle {
    fn from(tree: Tree) -> Self {
        Obstacle::Tree(tree)
    }
}

impl From<Building> for Obstacle {
    fn from(building: Building) -> Self {
        Obstacle::Building(building)
    }
}

/// Owned obstacles, unique by position. Only ever searched by nearest neighbour.
#[derive(Debug, Clone, Default)]
pub struct ObstacleSet {
    obstacles: Vec<Obstacle>,
}

impl ObstacleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an obstacle. Returns `false` (and drops it) if another obstacle
    /// already occupies the exact same position.
    pub fn insert(&mut self, obstacle: Obstacle) -> bool {
        let pos = obstacle.position();
        if self.obstacles.iter().any(|o| o.position() == pos) {
            log::debug!("Skipping duplicate obstacle at ({}, {})", pos.x, pos.z);
            return false;
        }
        self.obstacles.push(obstacle);
        true
    }

    /// The obstacle whose position is closest to `point`.
    pub fn nearest(&self, point: GroundPoint) -> Option<&Obstacle> {
        self.obstacles.iter().min_by(|a, b| {
            a.position()
                .distance(point)
                .total_cmp(&b.position().distance(point))
        })
    }

    /// Whether `candidate` clears the nearest existing obstacle.
    ///
    /// Only the nearest obstacle is consulted, so a candidate can still
    /// overlap a farther, larger neighbour.
    pub fn is_clear(&self, candidate: &Obstacle) -> bool {
        self.nearest(candidate.position())
            .map_or(true, |nearest| !candidate.intersects(nearest))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Obstacle> {
        self.obstacles.iter()
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    pub fn clear(&mut self) {
        self.obstacles.clear();
    }
}
