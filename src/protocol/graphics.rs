//! # ESC/POS Raster Graphics (GS v 0)
//!
//! ## Bit Packing
//!
//! Each byte holds eight horizontal dots:
//! - Bit 7 (MSB) = leftmost dot
//! - Bit 0 (LSB) = rightmost dot
//! - 1 = black (print), 0 = white (no print)
//!
//! ```text
//! Byte value 0xF0 = 11110000 = ████░░░░
//! Byte value 0x0F = 00001111 = ░░░░████
//! ```
//!
//! Rows are packed top to bottom, `ceil(width / 8)` bytes per row.
//!
//! ## Chunking
//!
//! Small printers have a limited receive buffer, so tall images go out as
//! several raster commands of at most [`DEFAULT_CHUNK_ROWS`] rows each. The
//! printer stitches them without a gap.

use super::commands::{GS, u16_le};

/// Rows per raster command in [`raster_chunked`].
pub const DEFAULT_CHUNK_ROWS: u16 = 256;

/// # Print Raster Bit Image (GS v 0 m xL xH yL yH d1...dk)
///
/// | Format | Bytes |
/// |--------|-------|
/// | ASCII  | GS v 0 m xL xH yL yH d1...dk |
/// | Hex    | 1D 76 30 m xL xH yL yH d1...dk |
///
/// - `m = 0`: normal density (no doubling)
/// - `xL xH`: row width in **bytes**
/// - `yL yH`: height in dots
///
/// ```
/// use missive::protocol::graphics;
///
/// let cmd = graphics::raster(16, 1, &[0xFF, 0x00]);
/// assert_eq!(cmd, vec![0x1D, 0x76, 0x30, 0, 2, 0, 1, 0, 0xFF, 0x00]);
/// ```
pub fn raster(width_dots: u16, height: u16, data: &[u8]) -> Vec<u8> {
    let width_bytes = width_dots.div_ceil(8);

    debug_assert!(
        data.len() == width_bytes as usize * height as usize,
        "Raster data length mismatch. Expected {} bytes × {} rows, got {}",
        width_bytes,
        height,
        data.len()
    );

    let [xl, xh] = u16_le(width_bytes);
    let [yl, yh] = u16_le(height);

    let mut cmd = Vec::with_capacity(8 + data.len());
    cmd.extend([GS, b'v', b'0', 0, xl, xh, yl, yh]);
    cmd.extend_from_slice(data);
    cmd
}

/// Raster commands for a tall image, `chunk_rows` rows at a time.
///
/// ```
/// use missive::protocol::graphics;
///
/// let data = vec![0xAA; 2 * 5];
/// let cmd = graphics::raster_chunked(16, 5, &data, 2);
/// // chunks of 2 + 2 + 1 rows, 8 header bytes each
/// assert_eq!(cmd.len(), 3 * 8 + data.len());
/// ```
pub fn raster_chunked(width_dots: u16, height: u16, data: &[u8], chunk_rows: u16) -> Vec<u8> {
    let width_bytes = width_dots.div_ceil(8) as usize;
    let chunk_rows = chunk_rows.max(1);

    let mut out = Vec::with_capacity(data.len() + 8 * (height / chunk_rows + 1) as usize);
    let mut row = 0u16;
    while row < height {
        let rows = chunk_rows.min(height - row);
        let start = row as usize * width_bytes;
        let end = start + rows as usize * width_bytes;
        out.extend(raster(width_dots, rows, &data[start..end]));
        row += rows;
    }
    out
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raster_header() {
        let data = vec![0x00; 64 * 10];
        let cmd = raster(512, 10, &data);

        assert_eq!(&cmd[..4], &[0x1D, 0x76, 0x30, 0x00]);
        assert_eq!(&cmd[4..6], &[64, 0]); // width_bytes
        assert_eq!(&cmd[6..8], &[10, 0]); // height
        assert_eq!(cmd.len(), 8 + 64 * 10);
    }

    #[test]
    fn test_raster_width_rounding() {
        // 9 dots still needs 2 bytes per row
        let cmd = raster(9, 1, &[0x80, 0x80]);
        assert_eq!(cmd[4], 2);
    }

    #[test]
    fn test_raster_large_height() {
        let data = vec![0x00; 300];
        let cmd = raster(8, 300, &data);
        assert_eq!(&cmd[6..8], &[0x2C, 0x01]); // 300 = 0x012C
    }

    #[test]
    fn test_raster_preserves_data() {
        let data = vec![0xAA, 0x55, 0xF0, 0x0F];
        let cmd = raster(16, 2, &data);
        assert_eq!(&cmd[8..], &data[..]);
    }

    #[test]
    fn test_chunked_splits_rows() {
        let data: Vec<u8> = (0..10).collect();
        let cmd = raster_chunked(8, 10, &data, 4);

        // 4 + 4 + 2 rows
        assert_eq!(cmd.len(), 3 * 8 + 10);
        assert_eq!(&cmd[6..8], &[4, 0]);
        assert_eq!(&cmd[8..12], &[0, 1, 2, 3]);
        assert_eq!(&cmd[12 + 6..12 + 8], &[4, 0]);
        assert_eq!(&cmd[24 + 6..24 + 8], &[2, 0]);
        assert_eq!(&cmd[24 + 8..], &[8, 9]);
    }

    #[test]
    fn test_chunked_single_chunk_equals_raster() {
        let data = vec![0x11; 4];
        assert_eq!(raster_chunked(16, 2, &data, 256), raster(16, 2, &data));
    }

    #[test]
    fn test_chunked_empty_image() {
        assert!(raster_chunked(16, 0, &[], 256).is_empty());
    }
}
