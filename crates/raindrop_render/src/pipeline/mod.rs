//! Rendering pipeline components
//!
//! The background pass fills the viewport, then the drop pass draws every
//! raindrop as an instanced quad on top of it.

pub mod bindings;
pub mod types;
pub mod background_pipeline;
pub mod drop_pipeline;

pub use bindings::{BackgroundLayer, FrameBindings, TextureBindings};
pub use types::{DropInstance, FrameUniforms};
pub use background_pipeline::BackgroundPipeline;
pub use drop_pipeline::{DropPipeline, INITIAL_INSTANCE_CAPACITY, QUAD_VERTEX_COUNT};
