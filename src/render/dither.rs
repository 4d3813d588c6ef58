//! # Bayer 8x8 Ordered Dithering
//!
//! Receipt printers print black or nothing. Photos and screenshots are
//! turned into dot patterns whose density follows the original brightness:
//!
//! ```text
//! Grayscale:    White    Light    Medium    Dark    Black
//!               ░░░░░░   ░░▒░░░   ░▒░▒░▒   ▒▓▒▓▒▓   ██████
//! ```
//!
//! Each pixel is compared against a threshold taken from the Bayer matrix at
//! `(x mod 8, y mod 8)`:
//!
//! ```text
//!     0   1   2   3   4   5   6   7   (x mod 8)
//!   ┌───┬───┬───┬───┬───┬───┬───┬───┐
//! 0 │ 0 │32 │ 8 │40 │ 2 │34 │10 │42 │
//! 1 │48 │16 │56 │24 │50 │18 │58 │26 │
//! 2 │12 │44 │ 4 │36 │14 │46 │ 6 │38 │
//! 3 │60 │28 │52 │20 │62 │30 │54 │22 │
//! 4 │ 3 │35 │11 │43 │ 1 │33 │ 9 │41 │
//! 5 │51 │19 │59 │27 │49 │17 │57 │25 │
//! 6 │15 │47 │ 7 │39 │13 │45 │ 5 │37 │
//! 7 │63 │31 │55 │23 │61 │29 │53 │21 │
//!   └───┴───┴───┴───┴───┴───┴───┴───┘
//! (y mod 8)
//! ```
//!
//! `threshold = (value + 0.5) / 64`, so pure white never prints and pure
//! black always does. The result is deterministic, which keeps printed
//! output reproducible for the same image.
//!
//! ```
//! use missive::render::dither;
//!
//! let row = vec![true, true, false, false, true, false, true, false];
//! assert_eq!(dither::pack_row(&row), vec![0b11001010]);
//! ```

use image::GrayImage;

/// Bayer 8x8 threshold matrix, values 0-63.
pub const BAYER8: [[u8; 8]; 8] = [
    [0, 32, 8, 40, 2, 34, 10, 42],
    [48, 16, 56, 24, 50, 18, 58, 26],
    [12, 44, 4, 36, 14, 46, 6, 38],
    [60, 28, 52, 20, 62, 30, 54, 22],
    [3, 35, 11, 43, 1, 33, 9, 41],
    [51, 19, 59, 27, 49, 17, 57, 25],
    [15, 47, 7, 39, 13, 45, 5, 37],
    [63, 31, 55, 23, 61, 29, 53, 21],
];

/// Threshold in (0, 1) for a pixel position.
#[inline]
pub fn threshold(x: usize, y: usize) -> f32 {
    let matrix_value = BAYER8[y & 7][x & 7];
    (matrix_value as f32 + 0.5) / 64.0
}

/// Whether to print a dot. `intensity` is 0.0 for white, 1.0 for black.
///
/// ```
/// use missive::render::dither::should_print;
///
/// assert!(should_print(0, 0, 1.0));
/// assert!(!should_print(0, 0, 0.0));
/// ```
#[inline]
pub fn should_print(x: usize, y: usize, intensity: f32) -> bool {
    intensity > threshold(x, y)
}

/// Pack pixels (true = black) into bytes, MSB leftmost, last byte padded
/// with white.
///
/// ```
/// use missive::render::dither::pack_row;
///
/// assert_eq!(pack_row(&[true; 12]), vec![0xFF, 0xF0]);
/// ```
pub fn pack_row(pixels: &[bool]) -> Vec<u8> {
    let mut bytes = vec![0u8; pixels.len().div_ceil(8)];
    for (i, &pixel) in pixels.iter().enumerate() {
        if pixel {
            bytes[i / 8] |= 1 << (7 - (i % 8));
        }
    }
    bytes
}

/// Dither a grayscale image into packed rows, `ceil(width / 8)` bytes each.
///
/// ```
/// use image::{GrayImage, Luma};
/// use missive::render::dither;
///
/// let black = GrayImage::from_pixel(16, 2, Luma([0]));
/// assert_eq!(dither::dither_gray(&black), vec![0xFF; 4]);
/// ```
pub fn dither_gray(img: &GrayImage) -> Vec<u8> {
    let (width, height) = (img.width() as usize, img.height() as usize);
    let mut data = Vec::with_capacity(width.div_ceil(8) * height);
    let mut row = Vec::with_capacity(width);

    for (y, pixels) in img.rows().enumerate() {
        row.clear();
        for (x, pixel) in pixels.enumerate() {
            let intensity = 1.0 - pixel.0[0] as f32 / 255.0;
            row.push(should_print(x, y, intensity));
        }
        data.extend(pack_row(&row));
    }
    data
}

// ============================================================================
// TESTS
// ============================================================================
