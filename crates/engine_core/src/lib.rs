//! Core engine types shared by every crate of the drone delivery game:
//! - Frame timing and the world clock
//! - Transforms and model matrices

pub mod time;
pub mod transform;

pub use time::*;
pub use transform::*;

// Re-export commonly used types
pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
