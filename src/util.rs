//! Small helpers shared by the capture and icon code.

use std::io::Cursor;
use std::path::PathBuf;

use cairo::ImageSurface;

use crate::capture::CaptureError;

/// Decodes PNG data and returns its `(width, height)`.
///
/// The full image is decoded, so truncated or corrupted data is rejected
/// even when the header itself is intact.
pub fn png_dimensions(data: &[u8]) -> Result<(u32, u32), CaptureError> {
    if data.is_empty() {
        return Err(CaptureError::InvalidImage("no image data".to_string()));
    }

    let surface = ImageSurface::create_from_png(&mut Cursor::new(data))
        .map_err(|e| CaptureError::InvalidImage(e.to_string()))?;

    let width = u32::try_from(surface.width())
        .map_err(|_| CaptureError::InvalidImage("negative width".to_string()))?;
    let height = u32::try_from(surface.height())
        .map_err(|_| CaptureError::InvalidImage("negative height".to_string()))?;

    Ok((width, height))
}

/// Expand tilde (~) in path strings.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
pub(crate) fn placeholder_png(width: i32, height: i32) -> Vec<u8> {
    use cairo::{Context, Format};

    let surface = ImageSurface::create(Format::ARgb32, width, height).unwrap();
    let ctx = Context::new(&surface).unwrap();
    ctx.set_source_rgb(0.47, 0.22, 0.62);
    ctx.paint().unwrap();
    drop(ctx);

    let mut buffer = Vec::new();
    surface.write_to_png(&mut buffer).unwrap();
    buffer
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_png_dimensions() {
        let png = placeholder_png(40, 24);
        assert_eq!(&png[0..8], &[137, 80, 78, 71, 13, 10, 26, 10]);
        assert_eq!(png_dimensions(&png).unwrap(), (40, 24));
    }

    #[test]
    fn test_png_dimensions_rejects_garbage() {
        assert!(png_dimensions(&[]).is_err());
        assert!(png_dimensions(b"definitely not a png").is_err());
    }

    #[test]
    fn test_expand_tilde() {
        let expanded = expand_tilde("~/Office");
        assert!(!expanded.to_string_lossy().starts_with("~"));

        let no_tilde = expand_tilde("/opt/office");
        assert_eq!(no_tilde, PathBuf::from("/opt/office"));
    }
}
