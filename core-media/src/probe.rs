//! Dimension probing
//!
//! Reads only the image header; pixel data is never decoded.

use image::ImageReader;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Result, TransformError};
use crate::locator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
    /// File size in bytes
    pub size: u64,
}

/// Probe the image behind a locator.
pub fn probe(source: &str) -> Result<ImageDimensions> {
    let path = locator::local_file(source)?;
    probe_path(&path).map_err(|reason| TransformError::unreadable(source, reason))
}

pub(crate) fn probe_path(path: &Path) -> std::result::Result<ImageDimensions, String> {
    let size = std::fs::metadata(path).map_err(|e| e.to_string())?.len();
    let (width, height) = ImageReader::open(path)
        .map_err(|e| e.to_string())?
        .with_guessed_format()
        .map_err(|e| e.to_string())?
        .into_dimensions()
        .map_err(|e| e.to_string())?;
    Ok(ImageDimensions {
        width,
        height,
        size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_reports_dimensions_and_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wide.png");
        image::RgbImage::new(100, 50).save(&path).unwrap();

        let dims = probe(path.to_str().unwrap()).unwrap();
        assert_eq!((dims.width, dims.height), (100, 50));
        assert_eq!(dims.size, std::fs::metadata(&path).unwrap().len());
    }

    #[test]
    fn test_probe_ignores_misleading_extension() {
        let dir = tempfile::tempdir().unwrap();
        let png = dir.path().join("real.png");
        image::RgbImage::new(7, 9).save(&png).unwrap();
        let renamed = dir.path().join("real.jpg");
        std::fs::rename(&png, &renamed).unwrap();

        let dims = probe(&format!("file://{}", renamed.display())).unwrap();
        assert_eq!((dims.width, dims.height), (7, 9));
    }

    #[test]
    fn test_missing_file_is_unreadable() {
        assert!(matches!(
            probe("/no/such/image.png"),
            Err(TransformError::UnreadableSource { .. })
        ));
    }
}
