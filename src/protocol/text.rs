//! # ESC/POS Text Styling
//!
//! One builder per [`Style`] key, plus [`style`] which emits a complete
//! frame.
//!
//! | Key | Command | Hex |
//! |-----|---------|-----|
//! | align | ESC a n | 1B 61 n |
//! | font | ESC M n | 1B 4D n |
//! | bold | ESC E n | 1B 45 n |
//! | underline | ESC - n | 1B 2D n |
//! | width/height | GS ! n | 1D 21 n |
//! | density | GS \| n | 1D 7C n |
//! | invert | GS B n | 1D 42 n |
//! | smooth | GS b n | 1D 62 n |
//! | flip | ESC { n | 1B 7B n |
//!
//! ## Frames
//!
//! The device keeps every mode until told otherwise. A frame is always sent
//! whole, so restoring a parent frame undoes whatever the child changed.

use super::commands::{ESC, GS};
use crate::style::{Align, Font, Style};

/// Density value that leaves the device setting alone.
pub const DENSITY_UNCHANGED: u8 = 9;

/// # Justification (ESC a n)
///
/// Takes effect at the start of the next line only.
///
/// ```
/// use missive::protocol::text;
/// use missive::style::Align;
///
/// assert_eq!(text::align(Align::Center), vec![0x1B, 0x61, 1]);
/// ```
#[inline]
pub fn align(align: Align) -> Vec<u8> {
    let n = match align {
        Align::Left => 0,
        Align::Center => 1,
        Align::Right => 2,
    };
    vec![ESC, b'a', n]
}

/// # Character Font (ESC M n)
#[inline]
pub fn font(font: Font) -> Vec<u8> {
    let n = match font {
        Font::A => 0,
        Font::B => 1,
    };
    vec![ESC, b'M', n]
}

/// # Emphasized Mode (ESC E n)
#[inline]
pub fn bold(on: bool) -> Vec<u8> {
    vec![ESC, b'E', on as u8]
}

/// # Underline (ESC - n)
///
/// `n` is the thickness in dots, 0 (off) to 2.
#[inline]
pub fn underline(n: u8) -> Vec<u8> {
    vec![ESC, b'-', n.min(2)]
}

/// # Character Size (GS ! n)
///
/// Width multiplier in the high nibble, height in the low one, each stored
/// as `multiplier - 1`:
///
/// ```text
/// n = (width - 1) << 4 | (height - 1)
/// ```
///
/// Multipliers are clamped to 1..=8.
///
/// ```
/// use missive::protocol::text;
///
/// assert_eq!(text::size(1, 1), vec![0x1D, 0x21, 0x00]);
/// assert_eq!(text::size(3, 3), vec![0x1D, 0x21, 0x22]);
/// ```
#[inline]
pub fn size(width: u8, height: u8) -> Vec<u8> {
    let w = width.clamp(1, 8) - 1;
    let h = height.clamp(1, 8) - 1;
    vec![GS, b'!', (w << 4) | h]
}

/// # Print Density (GS | n)
///
/// 0 is the lightest, 8 the darkest. Returns nothing for
/// [`DENSITY_UNCHANGED`] and above.
#[inline]
pub fn density(n: u8) -> Vec<u8> {
    if n >= DENSITY_UNCHANGED {
        return Vec::new();
    }
    vec![GS, b'|', n]
}

/// # White/Black Reverse (GS B n)
#[inline]
pub fn invert(on: bool) -> Vec<u8> {
    vec![GS, b'B', on as u8]
}

/// # Smoothing (GS b n)
#[inline]
pub fn smooth(on: bool) -> Vec<u8> {
    vec![GS, b'b', on as u8]
}

/// # Upside-Down Printing (ESC { n)
///
/// Like alignment, only honoured at the start of a line.
#[inline]
pub fn upside_down(on: bool) -> Vec<u8> {
    vec![ESC, b'{', on as u8]
}

/// Every command needed to put the device into `style`.
///
/// Without `custom_size` the width and height multipliers are ignored and
/// normal size is selected.
pub fn style(style: &Style) -> Vec<u8> {
    let (width, height) = if style.custom_size {
        (style.width, style.height)
    } else {
        (1, 1)
    };

    let mut out = Vec::with_capacity(32);
    out.extend(align(style.align));
    out.extend(font(style.font));
    out.extend(bold(style.bold));
    out.extend(underline(style.underline));
    out.extend(size(width, height));
    out.extend(density(style.density));
    out.extend(invert(style.invert));
    out.extend(smooth(style.smooth));
    out.extend(upside_down(style.flip));
    out
}

// ============================================================================
// TESTS
// ============================================================================
