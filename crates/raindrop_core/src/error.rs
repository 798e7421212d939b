//! Error types for the raindrop effect
//!
//! [`AssetError`] covers anything that goes wrong while a renderer loads
//! textures, shaders or the background. [`RenderError`] covers renderer
//! construction. [`FxError`] is what the orchestrator hands back to callers.

use std::fmt;
use std::io;

/// Errors that can occur while loading renderer assets
#[derive(Debug)]
pub enum AssetError {
    /// IO error (file not found, permission denied, etc.)
    Io(io::Error),
    /// The asset was read but could not be decoded
    Decode(String),
    /// Asset does not exist
    NotFound(String),
    /// GPU resource creation failed
    Gpu(String),
    /// The renderer was torn down before the load finished
    Cancelled,
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetError::Io(err) => write!(f, "Asset IO error: {}", err),
            AssetError::Decode(msg) => write!(f, "Asset decode error: {}", msg),
            AssetError::NotFound(path) => write!(f, "Asset not found: {}", path),
            AssetError::Gpu(msg) => write!(f, "GPU resource error: {}", msg),
            AssetError::Cancelled => write!(f, "Asset load cancelled"),
        }
    }
}

impl std::error::Error for AssetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AssetError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for AssetError {
    fn from(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::NotFound {
            AssetError::NotFound(err.to_string())
        } else {
            AssetError::Io(err)
        }
    }
}

/// Errors raised while constructing a renderer
#[derive(Debug)]
pub enum RenderError {
    /// The target surface could not be created
    SurfaceCreation(String),
    /// No GPU adapter is compatible with the surface
    AdapterUnavailable,
    /// The adapter refused to hand out a device
    DeviceRequest(String),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::SurfaceCreation(msg) => write!(f, "Surface creation failed: {}", msg),
            RenderError::AdapterUnavailable => write!(f, "No compatible GPU adapter"),
            RenderError::DeviceRequest(msg) => write!(f, "Device request failed: {}", msg),
        }
    }
}

impl std::error::Error for RenderError {}

/// Errors surfaced by [`RaindropFx`](crate::RaindropFx) operations
#[derive(Debug)]
pub enum FxError {
    /// Options were given without a canvas to draw on
    MissingCanvas,
    /// Options failed validation
    InvalidOptions(String),
    /// The renderer could not be constructed
    Renderer(RenderError),
    /// `start` failed while loading assets
    AssetLoad(AssetError),
    /// `set_background` failed while reloading the background
    BackgroundReload(AssetError),
}

impl fmt::Display for FxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FxError::MissingCanvas => write!(f, "No canvas given in options"),
            FxError::InvalidOptions(msg) => write!(f, "Invalid options: {}", msg),
            FxError::Renderer(err) => write!(f, "Renderer error: {}", err),
            FxError::AssetLoad(err) => write!(f, "Failed to load assets: {}", err),
            FxError::BackgroundReload(err) => write!(f, "Failed to reload background: {}", err),
        }
    }
}

impl std::error::Error for FxError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FxError::Renderer(err) => Some(err),
            FxError::AssetLoad(err) | FxError::BackgroundReload(err) => Some(err),
            FxError::MissingCanvas | FxError::InvalidOptions(_) => None,
        }
    }
}

impl From<RenderError> for FxError {
    fn from(err: RenderError) -> Self {
        FxError::Renderer(err)
    }
}
