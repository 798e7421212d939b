//! Application systems
//!
//! The window and the effect running in it, kept out of main.rs so they can be tested.

mod effect;
mod window;

pub use effect::{BackgroundCycle, EffectSystem, WindowEffect};
pub use window::{WindowError, WindowSystem};
