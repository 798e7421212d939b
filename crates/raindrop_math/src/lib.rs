//! 2D Mathematics Library
//!
//! Small value types shared by the raindrop simulator and renderer.
//!
//! - [`Vec2`] - 2D vector in screen space (y grows downward)
//! - [`Rect`] - Axis-aligned rectangle (viewport bounds, spawn areas)

mod vec2;
mod rect;

pub use vec2::Vec2;
pub use rect::Rect;
