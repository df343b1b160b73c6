//! Image payloads for the vision tasks.
//!
//! The model receives a single JPEG-compatible image, base64 encoded.
//! Uploads in other formats are decoded and re-encoded to JPEG in memory,
//! no disk I/O.

use crate::error::CaptureError;
use base64::Engine;

pub const JPEG_MIME: &str = "image/jpeg";

/// Quality used when re-encoding non-JPEG uploads.
const JPEG_QUALITY: u8 = 85;

#[derive(Debug, Clone, PartialEq)]
pub struct ImagePayload {
    pub mime_type: &'static str,
    pub data: Vec<u8>,
}

impl ImagePayload {
    /// Build a payload from raw upload bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, CaptureError> {
        if bytes.is_empty() {
            return Err(CaptureError::Unreadable("empty file".to_string()));
        }

        let format = image::guess_format(&bytes)
            .map_err(|e| CaptureError::Unreadable(format!("unknown image format: {}", e)))?;

        if format == image::ImageFormat::Jpeg {
            // Passed through as-is, but the header must parse
            image::codecs::jpeg::JpegDecoder::new(std::io::Cursor::new(&bytes))
                .map_err(|e| CaptureError::Unreadable(format!("corrupt JPEG: {}", e)))?;
            return Ok(Self {
                mime_type: JPEG_MIME,
                data: bytes,
            });
        }

        let start = std::time::Instant::now();
        let decoded = image::load_from_memory_with_format(&bytes, format)
            .map_err(|e| CaptureError::Unreadable(e.to_string()))?;

        // JPEG has no alpha channel
        let rgb = decoded.to_rgb8();
        let mut jpeg = Vec::new();
        let encoder =
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY);
        rgb.write_with_encoder(encoder)
            .map_err(|e| CaptureError::Unreadable(format!("JPEG encode failed: {}", e)))?;

        log::info!(
            "[CAPTURE] Re-encoded {:?} upload to JPEG in {}ms ({} -> {} bytes)",
            format,
            start.elapsed().as_millis(),
            bytes.len(),
            jpeg.len()
        );

        Ok(Self {
            mime_type: JPEG_MIME,
            data: jpeg,
        })
    }

    /// Build a payload from a `data:<mime>;base64,<data>` URL as produced by
    /// browser file readers.
    pub fn from_data_url(url: &str) -> Result<Self, CaptureError> {
        let (header, data) = url
            .split_once(',')
            .ok_or_else(|| CaptureError::Unreadable("not a data URL".to_string()))?;
        if !header.starts_with("data:") || !header.ends_with(";base64") {
            return Err(CaptureError::Unreadable(format!(
                "unsupported data URL header '{}'",
                header
            )));
        }
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(data.trim())
            .map_err(|e| CaptureError::Unreadable(format!("invalid base64: {}", e)))?;
        Self::from_bytes(bytes)
    }

    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.data)
    }
}

/// A small, fully valid JPEG for tests elsewhere in the crate.
#[cfg(test)]
pub(crate) fn sample_jpeg() -> Vec<u8> {
    let img = image::RgbImage::from_pixel(2, 2, image::Rgb([40, 120, 40]));
    let mut jpeg = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut jpeg, image::ImageFormat::Jpeg)
        .unwrap();
    jpeg.into_inner()
}
