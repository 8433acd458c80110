//! Staging captures on disk so they can be handed to external programs.

use super::types::{Capture, CaptureError};
use chrono::Local;
use chrono::format::{Item, StrftimeItems};
use std::fmt::Write as _;
use std::io::Write;
use tempfile::NamedTempFile;

/// Default filename template for staged captures.
pub const DEFAULT_FILENAME_TEMPLATE: &str = "capture_%Y-%m-%d_%H%M%S";

/// Generate a filename based on the template and current time.
///
/// # Arguments
/// * `template` - Template string with chrono format specifiers
/// * `format` - File extension (e.g., "png")
///
/// # Returns
/// Generated filename with extension, or `InvalidTemplate` when `template`
/// is not a valid chrono format string
pub fn generate_filename(template: &str, format: &str) -> Result<String, CaptureError> {
    if !is_valid_template(template) {
        return Err(CaptureError::InvalidTemplate(template.to_string()));
    }
    let mut filename = String::new();
    write!(filename, "{}", Local::now().format(template))
        .map_err(|_| CaptureError::InvalidTemplate(template.to_string()))?;
    Ok(format!("{}.{}", filename, format))
}

/// Returns true when `template` contains only valid chrono format specifiers.
pub fn is_valid_template(template: &str) -> bool {
    !template.is_empty() && !StrftimeItems::new(template).any(|item| matches!(item, Item::Error))
}

/// Write the capture to a temporary PNG file.
///
/// The file name is derived from `template`; the file is deleted when the
/// returned handle is dropped.
pub fn stage_capture(capture: &Capture, template: &str) -> Result<NamedTempFile, CaptureError> {
    let filename = generate_filename(template, "png")?;
    let stem = filename
        .trim_end_matches(".png")
        .replace(['/', '\\'], "_");

    let mut staged = tempfile::Builder::new()
        .prefix(&format!("{stem}_"))
        .suffix(".png")
        .tempfile()?;

    staged.write_all(&capture.image_data)?;
    staged.flush()?;

    log::debug!(
        "Staged capture at {} ({} bytes)",
        staged.path().display(),
        capture.image_data.len()
    );

    Ok(staged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::placeholder_png;

    #[test]
    fn test_generate_filename() {
        let filename = generate_filename("test_%Y%m%d", "png").unwrap();
        assert!(filename.starts_with("test_"));
        assert!(filename.ends_with(".png"));
        assert!(filename.contains("20"));
    }

    #[test]
    fn test_template_validation() {
        assert!(is_valid_template(DEFAULT_FILENAME_TEMPLATE));
        assert!(is_valid_template("plain"));
        assert!(!is_valid_template(""));
        assert!(!is_valid_template("bad_%"));
    }

    #[test]
    fn test_generate_filename_rejects_bad_template() {
        assert!(matches!(
            generate_filename("bad_%", "png"),
            Err(CaptureError::InvalidTemplate(t)) if t == "bad_%"
        ));
    }

    #[test]
    fn test_stage_capture_rejects_bad_template() {
        let capture = Capture::from_png_bytes(placeholder_png(8, 8), None).unwrap();
        assert!(matches!(
            stage_capture(&capture, "bad_%"),
            Err(CaptureError::InvalidTemplate(_))
        ));
    }

    #[test]
    fn test_stage_capture_writes_png() {
        let capture = Capture::from_png_bytes(placeholder_png(8, 8), None).unwrap();
        let staged = stage_capture(&capture, "staged_%Y").unwrap();

        let name = staged.path().file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("staged_"));
        assert!(name.ends_with(".png"));
        assert_eq!(std::fs::read(staged.path()).unwrap(), capture.image_data);

        let path = staged.path().to_path_buf();
        drop(staged);
        assert!(!path.exists());
    }
}
