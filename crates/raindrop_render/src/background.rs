//! Background decoding
//!
//! Backgrounds are turned into plain RGBA8 pixels on a worker thread so a
//! large image does not stall the frame loop. Uploading happens on the
//! render side once the pixels arrive.

use std::future::Future;
use std::path::Path;

use futures::channel::oneshot;
use raindrop_core::{AssetError, Background};

/// Decoded background, ready for upload
#[derive(Clone, Debug, PartialEq)]
pub struct BackgroundPixels {
    pub width: u32,
    pub height: u32,
    /// Tightly packed RGBA8 rows
    pub rgba: Vec<u8>,
}

impl BackgroundPixels {
    /// A single pixel of the given color
    pub fn solid(color: [f32; 4]) -> Self {
        let rgba = color
            .iter()
            .map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8)
            .collect();
        Self {
            width: 1,
            height: 1,
            rgba,
        }
    }

    /// Read and decode an image file
    pub fn from_file(path: &Path) -> Result<Self, AssetError> {
        let bytes = std::fs::read(path).map_err(|e| match AssetError::from(e) {
            AssetError::NotFound(_) => AssetError::NotFound(path.display().to_string()),
            other => other,
        })?;
        Self::from_bytes(&bytes)
    }

    /// Decode an encoded image (PNG or JPEG)
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AssetError> {
        let image = image::load_from_memory(bytes).map_err(|e| AssetError::Decode(e.to_string()))?;
        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();
        if width == 0 || height == 0 {
            return Err(AssetError::Decode("image has no pixels".into()));
        }
        Ok(Self {
            width,
            height,
            rgba: rgba.into_raw(),
        })
    }

    /// Produce pixels for a background, decoding images synchronously
    pub fn load(background: &Background) -> Result<Self, AssetError> {
        match background {
            Background::Color(color) => Ok(Self::solid(*color)),
            Background::Image(path) => Self::from_file(path),
        }
    }

    /// Bytes per row of the packed pixel data
    pub fn bytes_per_row(&self) -> u32 {
        4 * self.width
    }
}

/// Decode `background` off the calling thread
///
/// Colors resolve immediately. Images are decoded on a short-lived worker
/// thread and delivered through a oneshot channel.
pub fn load_async(
    background: Background,
) -> impl Future<Output = Result<BackgroundPixels, AssetError>> + 'static {
    let (tx, rx) = oneshot::channel();
    match background {
        Background::Color(color) => {
            let _ = tx.send(Ok(BackgroundPixels::solid(color)));
        }
        Background::Image(path) => {
            let spawned = std::thread::Builder::new()
                .name("background-decode".into())
                .spawn(move || {
                    let _ = tx.send(BackgroundPixels::from_file(&path));
                });
            if let Err(err) = spawned {
                log::error!("Failed to spawn background decoder: {}", err);
            }
        }
    }
    async move { rx.await.unwrap_or(Err(AssetError::Cancelled)) }
}
