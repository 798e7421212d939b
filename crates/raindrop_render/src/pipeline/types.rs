//! GPU-compatible data types for the raindrop pipelines
//!
//! These types are designed to match the shader layouts exactly.
//! All types derive Pod and Zeroable for safe GPU buffer operations.

use bytemuck::{Pod, Zeroable};
use raindrop_core::{FrameClock, RenderOptions};
use raindrop_sim::Raindrop;

/// Per-instance data for one drawn raindrop
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct DropInstance {
    /// Center in pixels
    pub center: [f32; 2],
    /// Pixels per second (used to stretch moving drops)
    pub velocity: [f32; 2],
    pub radius: f32,
    pub age: f32,
    /// Padding to 32 bytes
    pub _padding: [f32; 2],
}

impl From<&Raindrop> for DropInstance {
    fn from(drop: &Raindrop) -> Self {
        Self {
            center: drop.position.to_array(),
            velocity: drop.velocity.to_array(),
            radius: drop.radius,
            age: drop.age,
            _padding: [0.0; 2],
        }
    }
}

/// Uniforms shared by the background and drop passes
/// Layout: 48 bytes total (must match FrameUniforms in common.wgsl)
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct FrameUniforms {
    /// Viewport size in pixels
    pub viewport: [f32; 2],
    /// Seconds of active animation
    pub time: f32,
    pub edge_softness: f32,
    pub drop_color: [f32; 4],
    pub highlight: f32,
    pub background_dim: f32,
    pub _padding: [f32; 2],
}

impl FrameUniforms {
    pub fn new(options: &RenderOptions, width: u32, height: u32, clock: FrameClock) -> Self {
        Self {
            viewport: [width.max(1) as f32, height.max(1) as f32],
            time: clock.total as f32,
            edge_softness: options.edge_softness.clamp(0.0, 1.0),
            drop_color: options.drop_color,
            highlight: options.highlight,
            background_dim: options.background_dim.clamp(0.0, 1.0),
            _padding: [0.0; 2],
        }
    }
}

impl Default for FrameUniforms {
    fn default() -> Self {
        Self::new(&RenderOptions::default(), 1, 1, FrameClock::default())
    }
}
