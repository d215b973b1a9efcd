//! Terrain elevation as a pure function of ground position.
//!
//! The field is a smoothed value noise over a unit lattice whose corner
//! values come from a sine/cosine scramble. A per-terrain time seed shifts
//! the lattice so each generated world gets its own relief, while every
//! query for the same (x, z, seed) returns the same height. Obstacle
//! placement, drone movement and the terrain shader all read the same field.

use glam::Vec2;

/// Highest elevation the field can produce.
pub const TERRAIN_MAX_Y: f32 = 0.5;

/// World coordinates are multiplied by this before sampling the lattice.
pub const HEIGHT_FIELD_FREQUENCY: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeightField {
    seed_time: f32,
    max_height: f32,
}

impl HeightField {
    /// Create the field for a terrain created at `seed_time` seconds.
    pub fn new(seed_time: f32) -> Self {
        Self {
            seed_time,
            max_height: TERRAIN_MAX_Y,
        }
    }

    pub fn seed_time(&self) -> f32 {
        self.seed_time
    }

    pub fn max_height(&self) -> f32 {
        self.max_height
    }

    /// Elevation at (x, z), always within `[0, max_height]`.
    pub fn height(&self, x: f32, z: f32) -> f32 {
        let noise = value_noise(Vec2::new(x, z) * HEIGHT_FIELD_FREQUENCY, self.seed_time);
        // Peaks where the noise is low.
        (self.max_height * (1.0 - noise)).clamp(0.0, self.max_height)
    }
}

#[inline]
fn fract(v: f32) -> f32 {
    v - v.floor()
}

/// Cheap hash of a lattice corner into `[0, 1)`.
#[inline]
fn scramble(st: Vec2) -> f32 {
    fract(st.x.sin() + st.y.cos())
}

/// Bilinear, smoothstep-weighted value noise in `[0, 1]`.
pub fn value_noise(coord: Vec2, time: f32) -> f32 {
    let cell = coord.floor();
    let f = coord - cell;
    let corner = cell + Vec2::splat(time.sin());

    let a = scramble(corner);
    let b = scramble(corner + Vec2::new(1.0, 0.0));
    let c = scramble(corner + Vec2::new(0.0, 1.0));
    let d = scramble(corner + Vec2::new(1.0, 1.0));

    // Cubic Hermite curve, same as smoothstep.
    let u = f * f * (Vec2::splat(3.0) - 2.0 * f);

    a + (b - a) * u.x + (c - a) * u.y * (1.0 - u.x) + (d - b) * u.x * u.y
}
