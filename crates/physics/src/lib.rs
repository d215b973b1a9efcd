//! Obstacle shapes and drone collision for the delivery game.

pub mod collision;
pub mod obstacle;

pub use collision::*;
pub use obstacle::*;
