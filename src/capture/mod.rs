//! Captured screenshots as consumed by export destinations.
//!
//! This module provides:
//! - The capture value and its metadata
//! - Staging captures as temporary PNG files for external programs

pub mod file;
pub mod types;

pub use types::{Capture, CaptureDetails, CaptureError};
