//! Data types for captured screenshots handed to export destinations.

use chrono::{DateTime, Local};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::util::png_dimensions;

/// Metadata describing a capture.
#[derive(Debug, Clone)]
pub struct CaptureDetails {
    /// Title used for the exported page, if the capture has one.
    pub title: Option<String>,
    /// When the capture was taken.
    pub captured_at: DateTime<Local>,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
}

/// A captured image ready for export.
///
/// Destinations treat the image as opaque and only pass it on to the
/// service that performs the export.
#[derive(Debug, Clone)]
pub struct Capture {
    /// Raw image data (PNG format).
    pub image_data: Vec<u8>,
    pub details: CaptureDetails,
}

impl Capture {
    /// Wrap PNG bytes, reading the image dimensions from the PNG header.
    pub fn from_png_bytes(image_data: Vec<u8>, title: Option<String>) -> Result<Self, CaptureError> {
        let (width, height) = png_dimensions(&image_data)?;
        Ok(Self {
            image_data,
            details: CaptureDetails {
                title,
                captured_at: Local::now(),
                width,
                height,
            },
        })
    }

    /// Load a PNG file from disk.
    pub fn from_png_file(path: &Path, title: Option<String>) -> Result<Self, CaptureError> {
        let image_data = fs::read(path)?;
        log::debug!(
            "Read capture from {} ({} bytes)",
            path.display(),
            image_data.len()
        );
        Self::from_png_bytes(image_data, title)
    }
}

/// Errors that can occur while preparing a capture for export.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Invalid PNG image: {0}")]
    InvalidImage(String),

    #[error("Invalid filename template: {0:?}")]
    InvalidTemplate(String),

    #[error("Capture I/O error: {0}")]
    Io(#[from] std::io::Error),
}
