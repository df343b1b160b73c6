//! Input capture domain: public API.
//!
//! This module owns the two one-shot input capabilities the screens use:
//! geolocation and image selection. Both are traits so the hosting shell
//! can plug in its own sources; simple implementations live here.
//! External code should only use the items exported here.

mod image_payload;
mod location;

pub use image_payload::{ImagePayload, JPEG_MIME};
#[cfg(test)]
pub(crate) use image_payload::sample_jpeg;
pub use location::{Coordinates, DeniedLocation, FixedLocation, LocationSource};

use crate::error::CaptureError;
use async_trait::async_trait;
use std::path::PathBuf;

/// A one-shot image picker.
///
/// `Ok(None)` means the user dismissed the picker without choosing.
#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn pick(&self) -> Result<Option<Vec<u8>>, CaptureError>;
}

/// Reads the image from a file on disk.
pub struct FileImageSource {
    path: PathBuf,
}

impl FileImageSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ImageSource for FileImageSource {
    async fn pick(&self) -> Result<Option<Vec<u8>>, CaptureError> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            CaptureError::Unavailable(format!("{}: {}", self.path.display(), e))
        })?;
        log::info!(
            "[CAPTURE] Read {} bytes from {}",
            bytes.len(),
            self.path.display()
        );
        Ok(Some(bytes))
    }
}

/// Hands out bytes already in memory (or nothing, as if cancelled).
pub struct MemoryImageSource {
    bytes: Option<Vec<u8>>,
}

impl MemoryImageSource {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes: Some(bytes) }
    }

    pub fn cancelled() -> Self {
        Self { bytes: None }
    }
}

#[async_trait]
impl ImageSource for MemoryImageSource {
    async fn pick(&self) -> Result<Option<Vec<u8>>, CaptureError> {
        Ok(self.bytes.clone())
    }
}
