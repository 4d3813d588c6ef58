//! Preparation of submitted images.
//!
//! ```text
//! base64 ──► decode ──► flatten on white ──► rotate ──► rotate to fit? ──► resize ──► JPEG
//! ```
//!
//! Rotation angles are counter-clockwise degrees and must be multiples of
//! 90. With `rotate_to_fit`, an image wider than `factor × height` is
//! turned a further 90° so it prints lengthwise along the paper.

use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::MissiveError;
use crate::render::flatten_on_white;

/// How submitted images are normalised before queueing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImageSettings {
    /// Width every image is resized to, in pixels.
    pub max_width: u32,
    /// Counter-clockwise rotation applied to every image.
    pub rotate: i32,
    pub rotate_to_fit: bool,
    pub rotate_to_fit_threshold_factor: f32,
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            max_width: 512,
            rotate: 0,
            rotate_to_fit: false,
            rotate_to_fit_threshold_factor: 1.5,
        }
    }
}

impl ImageSettings {
    pub fn validate(&self) -> Result<(), MissiveError> {
        if self.max_width == 0 {
            return Err(MissiveError::Config("image.max_width must be positive".into()));
        }
        if self.rotate % 90 != 0 {
            return Err(MissiveError::Config(format!(
                "image.rotate must be a multiple of 90, got {}",
                self.rotate
            )));
        }
        Ok(())
    }
}

/// Decode base64 image data. A `data:<mime>;base64,` prefix is accepted.
pub fn decode_base64(encoded: &str) -> Result<Vec<u8>, MissiveError> {
    let encoded = encoded.trim();
    let payload = match encoded.split_once(";base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => encoded,
    };
    STANDARD
        .decode(payload)
        .map_err(|e| MissiveError::Image(format!("invalid base64: {}", e)))
}

/// Rotate counter-clockwise by a multiple of 90 degrees.
fn rotate_ccw(img: DynamicImage, degrees: i32) -> DynamicImage {
    match degrees.rem_euclid(360) {
        90 => img.rotate270(),
        180 => img.rotate180(),
        270 => img.rotate90(),
        _ => img,
    }
}

/// Apply the full preparation pipeline to a decoded image.
pub fn prepare(img: &DynamicImage, settings: &ImageSettings) -> DynamicImage {
    let flat = DynamicImage::ImageRgb8(flatten_on_white(img));
    let mut img = rotate_ccw(flat, settings.rotate);

    if settings.rotate_to_fit
        && img.width() as f32 > settings.rotate_to_fit_threshold_factor * img.height() as f32
    {
        img = rotate_ccw(img, 90);
    }

    let height = (settings.max_width as u64 * img.height() as u64 / img.width().max(1) as u64)
        .max(1) as u32;
    img.resize_exact(settings.max_width, height, FilterType::Lanczos3)
}

/// Decode, prepare and store a submitted image as `<dir>/<id>.jpg`.
pub fn save_submission_image(
    encoded: &str,
    id: &str,
    dir: &Path,
    settings: &ImageSettings,
) -> Result<PathBuf, MissiveError> {
    let bytes = decode_base64(encoded)?;
    let img = image::load_from_memory(&bytes)
        .map_err(|e| MissiveError::Image(format!("cannot decode image: {}", e)))?;
    let prepared = prepare(&img, settings);

    let path = dir.join(format!("{}.jpg", id));
    prepared
        .save_with_format(&path, ImageFormat::Jpeg)
        .map_err(|e| MissiveError::Image(format!("cannot save {}: {}", path.display(), e)))?;

    debug!(
        path = %path.display(),
        width = prepared.width(),
        height = prepared.height(),
        "image prepared"
    );
    Ok(path)
}

// ============================================================================
// TESTS
// ============================================================================
