//! Image resize

use image::imageops::FilterType;
use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::codec::ImageFormatKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResizeRequest {
    pub source: String,
    /// `None` keeps the source width (or follows the aspect ratio)
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub format: ImageFormatKind,
    /// Inside the cache root
    pub output: String,
}

/// Output size for a source of `(width, height)`.
///
/// With one side given, the other follows the aspect ratio (at least 1px).
/// With neither, the source size is kept.
pub fn target_dimensions(
    source: (u32, u32),
    width: Option<u32>,
    height: Option<u32>,
) -> (u32, u32) {
    let (src_w, src_h) = source;
    let scaled = |value: u32, num: u32, den: u32| -> u32 {
        if den == 0 {
            return value.max(1);
        }
        let result = (u64::from(value) * u64::from(num) + u64::from(den) / 2) / u64::from(den);
        result.clamp(1, u64::from(u32::MAX)) as u32
    };

    match (width.filter(|w| *w > 0), height.filter(|h| *h > 0)) {
        (Some(w), Some(h)) => (w, h),
        (Some(w), None) => (w, scaled(src_h, w, src_w)),
        (None, Some(h)) => (scaled(src_w, h, src_h), h),
        (None, None) => (src_w, src_h),
    }
}

pub fn resize_image(image: DynamicImage, width: Option<u32>, height: Option<u32>) -> DynamicImage {
    let (w, h) = target_dimensions((image.width(), image.height()), width, height);
    if (w, h) == (image.width(), image.height()) {
        image
    } else {
        image.resize_exact(w, h, FilterType::Lanczos3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_targets_keeps_size() {
        assert_eq!(target_dimensions((640, 480), None, None), (640, 480));
        assert_eq!(target_dimensions((640, 480), Some(0), None), (640, 480));
    }

    #[test]
    fn test_single_target_keeps_aspect() {
        assert_eq!(target_dimensions((640, 480), Some(320), None), (320, 240));
        assert_eq!(target_dimensions((640, 480), None, Some(120)), (160, 120));
        assert_eq!(target_dimensions((1000, 3), Some(10), None), (10, 1));
    }

    #[test]
    fn test_both_targets_are_exact() {
        assert_eq!(target_dimensions((640, 480), Some(10), Some(90)), (10, 90));
    }

    #[test]
    fn test_resize_image() {
        let img = DynamicImage::ImageRgb8(image::RgbImage::new(40, 20));
        let out = resize_image(img, None, Some(10));
        assert_eq!((out.width(), out.height()), (20, 10));
    }
}
