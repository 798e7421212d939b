//! Raindrop Rendering Library
//!
//! This crate provides the wgpu renderer that draws the simulated raindrops
//! over a background image or color.
//!
//! ## Key Components
//!
//! - [`context::RenderContext`] - WGPU device, queue, and surface management
//! - [`background`] - Decoding backgrounds into RGBA pixels
//! - [`pipeline::BackgroundPipeline`] - Fullscreen background layer
//! - [`pipeline::DropPipeline`] - Instanced raindrop pass
//! - [`renderer::RaindropRenderer`] - Ties the above to the orchestrator's renderer contract

pub mod background;
pub mod canvas;
pub mod context;
pub mod pipeline;
pub mod renderer;

pub use background::BackgroundPixels;
pub use canvas::WindowCanvas;
pub use context::RenderContext;
pub use renderer::RaindropRenderer;
