//! # ESC/POS Basic Commands
//!
//! Initialisation, paper feed, cutting and code page selection for Epson
//! compatible receipt printers (TM-T88 family and clones).
//!
//! ## Escape Sequence Structure
//!
//! - Single byte: `LF`
//! - Prefixed with parameters: `ESC a n`, `GS V m n`
//! - Function blocks with a little-endian length: `GS ( k pL pH cn fn ...`
//!
//! ## Byte Order
//!
//! Multi-byte integers are **little-endian**: `0x1234` is sent as
//! `[0x34, 0x12]`.

// ============================================================================
// ESCAPE SEQUENCE CONSTANTS
// ============================================================================

/// ESC (0x1B), prefix of most text and mode commands.
pub const ESC: u8 = 0x1B;

/// GS (0x1D), prefix of size, graphics, barcode and cutter commands.
pub const GS: u8 = 0x1D;

/// LF (0x0A), print the line buffer and advance one line.
pub const LF: u8 = 0x0A;

// ============================================================================
// INITIALIZATION
// ============================================================================

/// # Initialize Printer (ESC @)
///
/// | Format | Bytes |
/// |--------|-------|
/// | ASCII  | ESC @ |
/// | Hex    | 1B 40 |
///
/// Clears the print buffer and resets every text mode to its power-on
/// value. Code page selection is reset too, so select it again afterwards.
///
/// ```
/// use missive::protocol::commands;
///
/// assert_eq!(commands::init(), vec![0x1B, 0x40]);
/// ```
#[inline]
pub fn init() -> Vec<u8> {
    vec![ESC, b'@']
}

/// Character code tables selectable with `ESC t n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CodePage {
    /// USA, standard Europe
    Pc437 = 0,
    /// Multilingual Latin-1
    Pc850 = 2,
    /// PC850 with the euro sign at 0xD5
    Pc858 = 19,
}

/// # Select Character Code Table (ESC t n)
///
/// | Format | Bytes |
/// |--------|-------|
/// | ASCII  | ESC t n |
/// | Hex    | 1B 74 n |
///
/// ```
/// use missive::protocol::commands::{self, CodePage};
///
/// assert_eq!(commands::code_page(CodePage::Pc858), vec![0x1B, 0x74, 19]);
/// ```
#[inline]
pub fn code_page(page: CodePage) -> Vec<u8> {
    vec![ESC, b't', page as u8]
}

// ============================================================================
// PAPER FEED
// ============================================================================

/// # Print and Feed n Lines (ESC d n)
///
/// | Format | Bytes |
/// |--------|-------|
/// | ASCII  | ESC d n |
/// | Hex    | 1B 64 n |
#[inline]
pub fn feed_lines(n: u8) -> Vec<u8> {
    vec![ESC, b'd', n]
}

// ============================================================================
// CUTTER
// ============================================================================

/// # Full Cut (GS V 0)
///
/// Cuts at the current position. The head sits some way above the blade,
/// so the last printed lines are still inside the printer. Prefer
/// [`cut_full_feed`].
#[inline]
pub fn cut_full() -> Vec<u8> {
    vec![GS, b'V', 0]
}

/// # Partial Cut (GS V 1)
#[inline]
pub fn cut_partial() -> Vec<u8> {
    vec![GS, b'V', 1]
}

/// # Feed to Cut Position, Then Full Cut (GS V A n)
///
/// | Format | Bytes |
/// |--------|-------|
/// | ASCII  | GS V A n |
/// | Hex    | 1D 56 41 n |
///
/// Feeds to the cutter plus `n` motion units, then cuts, so nothing printed
/// is left behind the blade.
///
/// ```
/// use missive::protocol::commands;
///
/// assert_eq!(commands::cut_full_feed(3), vec![0x1D, 0x56, 0x41, 3]);
/// ```
#[inline]
pub fn cut_full_feed(n: u8) -> Vec<u8> {
    vec![GS, b'V', b'A', n]
}

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Encode a u16 value as little-endian bytes [low, high]
///
/// ```
/// use missive::protocol::commands::u16_le;
///
/// assert_eq!(u16_le(0x1234), [0x34, 0x12]);
/// assert_eq!(u16_le(512), [0x00, 0x02]);
/// ```
#[inline]
pub const fn u16_le(value: u16) -> [u8; 2] {
    [value as u8, (value >> 8) as u8]
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init() {
        assert_eq!(init(), vec![0x1B, 0x40]);
    }

    #[test]
    fn test_code_pages() {
        assert_eq!(code_page(CodePage::Pc437), vec![0x1B, 0x74, 0]);
        assert_eq!(code_page(CodePage::Pc850), vec![0x1B, 0x74, 2]);
        assert_eq!(code_page(CodePage::Pc858), vec![0x1B, 0x74, 19]);
    }

    #[test]
    fn test_feed_lines() {
        assert_eq!(feed_lines(4), vec![0x1B, 0x64, 4]);
    }

    #[test]
    fn test_cuts() {
        assert_eq!(cut_full(), vec![0x1D, 0x56, 0x00]);
        assert_eq!(cut_partial(), vec![0x1D, 0x56, 0x01]);
        assert_eq!(cut_full_feed(0), vec![0x1D, 0x56, 0x41, 0x00]);
    }

    #[test]
    fn test_u16_le() {
        assert_eq!(u16_le(0x0000), [0x00, 0x00]);
        assert_eq!(u16_le(0x00FF), [0xFF, 0x00]);
        assert_eq!(u16_le(0xFF00), [0x00, 0xFF]);
        assert_eq!(u16_le(64), [0x40, 0x00]); // 512 dots = 64 bytes
    }
}
