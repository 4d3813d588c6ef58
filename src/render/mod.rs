//! # Image Rendering
//!
//! Turns image files into 1-bit rasters the printer can print.
//!
//! ```text
//! file ──► decode ──► flatten on white ──► fit width ──► grayscale ──► dither ──► Raster
//! ```
//!
//! ## Modules
//!
//! - [`dither`]: Bayer 8x8 ordered dithering and bit packing

pub mod dither;

use std::path::Path;

use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgba, RgbImage, RgbaImage};

use crate::error::MissiveError;

/// A packed 1-bit image, ready for `GS v 0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    pub width: u16,
    pub height: u16,
    /// Rows of `ceil(width / 8)` bytes, MSB leftmost, 1 = black.
    pub data: Vec<u8>,
}

impl Raster {
    pub fn width_bytes(&self) -> usize {
        (self.width as usize).div_ceil(8)
    }
}

/// Composite an image over a white background, dropping transparency.
pub fn flatten_on_white(img: &DynamicImage) -> RgbImage {
    let rgba = img.to_rgba8();
    let mut canvas = RgbaImage::from_pixel(rgba.width(), rgba.height(), Rgba([255, 255, 255, 255]));
    imageops::overlay(&mut canvas, &rgba, 0, 0);
    DynamicImage::ImageRgba8(canvas).to_rgb8()
}

/// Shrink to at most `max_width` pixels wide, keeping the aspect ratio.
/// Narrower images are left alone.
pub fn fit_width(img: DynamicImage, max_width: u32) -> DynamicImage {
    if max_width == 0 || img.width() <= max_width {
        return img;
    }
    let height = (img.height() as u64 * max_width as u64 / img.width() as u64).max(1) as u32;
    img.resize_exact(max_width, height, FilterType::Lanczos3)
}

/// Dither an in-memory image, shrinking it to `max_width` first.
pub fn rasterize(img: &DynamicImage, max_width: u32) -> Result<Raster, MissiveError> {
    let flat = DynamicImage::ImageRgb8(flatten_on_white(img));
    let gray = fit_width(flat, max_width).to_luma8();

    let width = u16::try_from(gray.width())
        .map_err(|_| MissiveError::Image(format!("image too wide: {} px", gray.width())))?;
    let height = u16::try_from(gray.height())
        .map_err(|_| MissiveError::Image(format!("image too tall: {} px", gray.height())))?;

    Ok(Raster {
        width,
        height,
        data: dither::dither_gray(&gray),
    })
}

/// Load and rasterize an image file.
pub fn load_raster(path: &Path, max_width: u32) -> Result<Raster, MissiveError> {
    let img = image::open(path)
        .map_err(|e| MissiveError::Image(format!("cannot open {}: {}", path.display(), e)))?;
    rasterize(&img, max_width)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb};

    #[test]
    fn test_transparent_becomes_white() {
        let clear = DynamicImage::ImageRgba8(RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 0])));
        let flat = flatten_on_white(&clear);
        assert!(flat.pixels().all(|p| *p == Rgb([255, 255, 255])));
    }

    #[test]
    fn test_opaque_pixels_survive_flattening() {
        let red = DynamicImage::ImageRgba8(RgbaImage::from_pixel(1, 1, Rgba([255, 0, 0, 255])));
        assert_eq!(*flatten_on_white(&red).get_pixel(0, 0), Rgb([255, 0, 0]));
    }

    #[test]
    fn test_fit_width_shrinks_wide_images() {
        let wide = DynamicImage::new_luma8(1024, 200);
        let fitted = fit_width(wide, 512);
        assert_eq!((fitted.width(), fitted.height()), (512, 100));
    }

    #[test]
    fn test_fit_width_keeps_narrow_images() {
        let narrow = DynamicImage::new_luma8(100, 50);
        let fitted = fit_width(narrow, 512);
        assert_eq!((fitted.width(), fitted.height()), (100, 50));
    }

    #[test]
    fn test_rasterize_black_image() {
        let black = DynamicImage::ImageLuma8(image::GrayImage::from_pixel(16, 3, Luma([0])));
        let raster = rasterize(&black, 512).unwrap();
        assert_eq!((raster.width, raster.height), (16, 3));
        assert_eq!(raster.width_bytes(), 2);
        assert_eq!(raster.data, vec![0xFF; 6]);
    }

    #[test]
    fn test_load_raster_missing_file() {
        let err = load_raster(Path::new("/definitely/not/here.png"), 512).unwrap_err();
        assert!(matches!(err, MissiveError::Image(_)));
    }
}
