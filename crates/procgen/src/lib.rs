//! Procedural generation for the delivery playfield: height field, obstacle
//! placement, packages and the meshes that draw them.

pub mod geometry;
pub mod heightfield;
pub mod placement;
pub mod target;
pub mod terrain;

pub use geometry::*;
pub use heightfield::*;
pub use placement::*;
pub use target::*;
pub use terrain::*;
