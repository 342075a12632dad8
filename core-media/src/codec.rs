//! Image decode/encode helpers shared by the raster transforms.

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, ImageReader};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::error::{Result, TransformError};
use crate::locator;

/// JPEG output is written at maximum quality.
pub const JPEG_QUALITY: u8 = 100;

/// Output encodings offered by resize and combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormatKind {
    /// Lossy
    #[serde(alias = "jpg")]
    Jpeg,
    /// Lossless
    #[default]
    Png,
}

impl ImageFormatKind {
    /// Pick an encoding from an output file's extension, PNG when unknown.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("jpg") | Some("jpeg") => ImageFormatKind::Jpeg,
            _ => ImageFormatKind::Png,
        }
    }
}

/// Decode the image behind a locator.
pub fn load(source: &str) -> Result<DynamicImage> {
    let path = locator::local_file(source)?;
    ImageReader::open(&path)
        .map_err(|e| TransformError::unreadable(source, e))?
        .with_guessed_format()
        .map_err(|e| TransformError::unreadable(source, e))?
        .decode()
        .map_err(|e| TransformError::unreadable(source, e))
}

/// Encode `image` to `path` in the given format.
pub fn encode(image: &DynamicImage, format: ImageFormatKind, path: &Path) -> Result<()> {
    let file = File::create(path).map_err(|e| {
        TransformError::EncodeFailure(format!("cannot create {}: {}", path.display(), e))
    })?;
    let mut writer = BufWriter::new(file);

    let encoded = match format {
        ImageFormatKind::Png => image.write_to(&mut writer, ImageFormat::Png),
        ImageFormatKind::Jpeg => {
            // JPEG has no alpha channel.
            let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
            rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut writer, JPEG_QUALITY))
        }
    };
    encoded.map_err(|e| TransformError::EncodeFailure(e.to_string()))?;

    writer
        .into_inner()
        .map_err(|e| TransformError::EncodeFailure(e.to_string()))?
        .sync_all()
        .map_err(|e| TransformError::EncodeFailure(e.to_string()))
}
