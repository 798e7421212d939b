//! Raindrop FX - rain on a window pane
//!
//! Application crate: layered configuration plus the systems the binary
//! wires into the winit event loop.

pub mod config;
pub mod systems;
