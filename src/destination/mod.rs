//! Export destinations as seen by a destination registry.
//!
//! A registry lists every destination, asks each whether it is active and,
//! for dynamic destinations, expands them into child destinations when the
//! user opens them. Exports never fail with an error: the outcome is always
//! reported through [`ExportInformation`].

use std::sync::Arc;

use crate::capture::{Capture, CaptureError};
use crate::util::png_dimensions;

/// Common contract of every export destination.
pub trait Destination: Send + Sync {
    /// Stable identifier shared by all instances of a destination kind.
    fn designation(&self) -> &str;

    /// Human readable label.
    fn description(&self) -> String;

    /// Ordering weight among sibling destinations (lower sorts first).
    fn priority(&self) -> i32;

    /// Whether this destination may expand into child destinations.
    fn is_dynamic(&self) -> bool {
        false
    }

    /// Whether the destination should be offered at all.
    fn is_active(&self) -> bool;

    /// Icon for the destination; `dpi` above 100 asks for the larger variant.
    fn display_icon(&self, dpi: f64) -> Option<Arc<DisplayIcon>>;

    /// Child destinations discovered at the time of the call.
    fn dynamic_destinations(&self) -> Box<dyn Iterator<Item = Box<dyn Destination>>> {
        Box::new(std::iter::empty())
    }

    /// Export the capture.
    fn export_capture(&self, manually_initiated: bool, capture: &Capture) -> ExportInformation;
}

/// Outcome of an export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportInformation {
    pub designation: String,
    pub description: String,
    pub export_made: bool,
    /// Set only when the export failed with an error.
    pub error_message: Option<String>,
}

impl ExportInformation {
    pub fn new(designation: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            designation: designation.into(),
            description: description.into(),
            export_made: false,
            error_message: None,
        }
    }
}

/// A decoded destination icon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayIcon {
    pub width: u32,
    pub height: u32,
    /// PNG encoded pixels.
    pub png: Vec<u8>,
}

impl DisplayIcon {
    pub fn from_png(png: Vec<u8>) -> Result<Self, CaptureError> {
        let (width, height) = png_dimensions(&png)?;
        Ok(Self { width, height, png })
    }
}
