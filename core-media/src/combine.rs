//! Image composition
//!
//! Layout is an overlay: the first image sets the canvas, and every later
//! image is drawn centred on top of what came before, in input order. Images
//! larger than the canvas are scaled down to fit with their aspect ratio
//! kept; smaller ones are never scaled up.

use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbaImage};

use crate::error::{Result, TransformError};

pub fn compose(images: &[DynamicImage]) -> Result<DynamicImage> {
    let (first, rest) = images
        .split_first()
        .ok_or_else(|| TransformError::InvalidRequest("no images to combine".to_string()))?;

    let mut canvas: RgbaImage = first.to_rgba8();
    let (canvas_w, canvas_h) = canvas.dimensions();

    for image in rest {
        let layer = if image.width() > canvas_w || image.height() > canvas_h {
            image.resize(canvas_w, canvas_h, FilterType::Lanczos3)
        } else {
            image.clone()
        };
        let x = (canvas_w - layer.width()) / 2;
        let y = (canvas_h - layer.height()) / 2;
        imageops::overlay(&mut canvas, &layer.to_rgba8(), i64::from(x), i64::from(y));
    }

    Ok(DynamicImage::ImageRgba8(canvas))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn solid(w: u32, h: u32, color: [u8; 4]) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(w, h, Rgba(color)))
    }

    #[test]
    fn test_empty_input_rejected() {
        assert!(matches!(compose(&[]), Err(TransformError::InvalidRequest(_))));
    }

    #[test]
    fn test_first_image_sets_canvas_and_later_images_are_centred() {
        let out = compose(&[
            solid(10, 10, [255, 0, 0, 255]),
            solid(2, 2, [0, 0, 255, 255]),
        ])
        .unwrap()
        .to_rgba8();

        assert_eq!(out.dimensions(), (10, 10));
        assert_eq!(out.get_pixel(0, 0), &Rgba([255, 0, 0, 255]));
        assert_eq!(out.get_pixel(4, 4), &Rgba([0, 0, 255, 255]));
        assert_eq!(out.get_pixel(5, 5), &Rgba([0, 0, 255, 255]));
        assert_eq!(out.get_pixel(6, 6), &Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn test_larger_layers_scaled_to_fit() {
        let out = compose(&[
            solid(10, 10, [255, 0, 0, 255]),
            solid(40, 20, [0, 255, 0, 255]),
        ])
        .unwrap()
        .to_rgba8();

        assert_eq!(out.dimensions(), (10, 10));
        // 40x20 fits as 10x5, centred vertically at rows 2..7
        assert_eq!(out.get_pixel(5, 0), &Rgba([255, 0, 0, 255]));
        assert_eq!(out.get_pixel(5, 4), &Rgba([0, 255, 0, 255]));
    }

    #[test]
    fn test_deterministic() {
        let inputs = [
            solid(8, 6, [1, 2, 3, 255]),
            solid(5, 5, [9, 9, 9, 128]),
            solid(3, 1, [200, 100, 0, 255]),
        ];
        assert_eq!(compose(&inputs).unwrap(), compose(&inputs).unwrap());
    }
}
