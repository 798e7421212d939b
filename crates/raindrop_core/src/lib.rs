//! Core types for the raindrop_fx effect
//!
//! This crate owns the part of the effect that is neither physics nor GPU
//! work: the lifecycle of a running effect and the frame loop that drives it.
//!
//! - [`RaindropFx`] - Orchestrator owning configuration, simulator and renderer
//! - [`FrameScheduler`] - Injectable per-frame callback primitive
//! - [`ManualScheduler`] / [`HostScheduler`] - Deterministic and host-driven schedulers
//! - [`FrameClock`] - Per-frame `dt` / `total` timing
//! - [`Simulator`] / [`Renderer`] - Collaborator contracts
//! - [`FxOptions`] / [`FxConfig`] - Construction options and the resolved configuration

mod clock;
mod collaborator;
mod error;
mod options;
mod orchestrator;
pub mod scheduler;

pub use clock::{FrameClock, FrameTimer, DEFAULT_MAX_FRAME_DT};
pub use collaborator::{LoadFuture, Renderer, Simulator};
pub use error::{AssetError, FxError, RenderError};
pub use options::{
    Background, Canvas, FxConfig, FxOptions, RenderOptions, SimulatorOptions, Viewport,
};
pub use orchestrator::{Lifecycle, RaindropFx};
pub use scheduler::{FrameCallback, FrameHandle, FrameScheduler, HostScheduler, ManualScheduler};

// Re-export math types used in the public API
pub use raindrop_math::{Rect, Vec2};
