//! # ESC/POS Native QR Codes (GS ( k)
//!
//! The printer builds the symbol itself from the stored data. A QR print is
//! five function blocks sent back to back:
//!
//! | Function | cn fn | Purpose |
//! |----------|-------|---------|
//! | 165 | 31 41 | Select model 2 |
//! | 167 | 31 43 | Module size in dots |
//! | 169 | 31 45 | Error correction level |
//! | 180 | 31 50 | Store data |
//! | 181 | 31 51 | Print stored symbol |
//!
//! Every block has the form `GS ( k pL pH cn fn params...` where
//! `pL pH` is the little-endian length of everything from `cn` onwards.

use super::commands::{GS, u16_le};
use crate::error::MissiveError;

/// Largest payload a version 40 symbol holds (numeric mode).
pub const MAX_DATA_LEN: usize = 7089;

/// QR error correction level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorCorrection {
    /// ~7% recovery
    #[default]
    L,
    /// ~15% recovery
    M,
    /// ~25% recovery
    Q,
    /// ~30% recovery
    H,
}

impl ErrorCorrection {
    fn code(self) -> u8 {
        match self {
            Self::L => 0x30,
            Self::M => 0x31,
            Self::Q => 0x32,
            Self::H => 0x33,
        }
    }
}

fn function(cn_fn: [u8; 2], params: &[u8]) -> Vec<u8> {
    // len <= MAX_DATA_LEN + 3, checked by the caller
    let len = u16_le((params.len() + 2) as u16);
    let mut out = Vec::with_capacity(7 + params.len());
    out.extend([GS, b'(', b'k', len[0], len[1], cn_fn[0], cn_fn[1]]);
    out.extend_from_slice(params);
    out
}

/// Full command sequence printing `data` as a model 2 QR code.
///
/// `module_size` is clamped to 1..=16 dots.
///
/// ```
/// use missive::protocol::qr::{self, ErrorCorrection};
///
/// let bytes = qr::qr_code("hi", 6, ErrorCorrection::L).unwrap();
/// assert_eq!(&bytes[..9], &[0x1D, 0x28, 0x6B, 0x04, 0x00, 0x31, 0x41, 0x32, 0x00]);
/// ```
pub fn qr_code(
    data: &str,
    module_size: u8,
    level: ErrorCorrection,
) -> Result<Vec<u8>, MissiveError> {
    if data.is_empty() {
        return Err(MissiveError::Protocol("QR data is empty".into()));
    }
    if data.len() > MAX_DATA_LEN {
        return Err(MissiveError::Protocol(format!(
            "QR data is {} bytes, at most {} fit",
            data.len(),
            MAX_DATA_LEN
        )));
    }

    let mut store = Vec::with_capacity(data.len() + 1);
    store.push(0x30);
    store.extend_from_slice(data.as_bytes());

    let mut out = Vec::new();
    out.extend(function([0x31, 0x41], &[0x32, 0x00]));
    out.extend(function([0x31, 0x43], &[module_size.clamp(1, 16)]));
    out.extend(function([0x31, 0x45], &[level.code()]));
    out.extend(function([0x31, 0x50], &store));
    out.extend(function([0x31, 0x51], &[0x30]));
    Ok(out)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_full_sequence() {
        let bytes = qr_code("AB", 6, ErrorCorrection::M).unwrap();
        assert_eq!(
            bytes,
            vec![
                0x1D, 0x28, 0x6B, 0x04, 0x00, 0x31, 0x41, 0x32, 0x00, // model 2
                0x1D, 0x28, 0x6B, 0x03, 0x00, 0x31, 0x43, 0x06, // size 6
                0x1D, 0x28, 0x6B, 0x03, 0x00, 0x31, 0x45, 0x31, // level M
                0x1D, 0x28, 0x6B, 0x05, 0x00, 0x31, 0x50, 0x30, b'A', b'B', // store
                0x1D, 0x28, 0x6B, 0x03, 0x00, 0x31, 0x51, 0x30, // print
            ]
        );
    }

    #[test]
    fn test_store_length_is_little_endian() {
        let data = "x".repeat(300);
        let bytes = qr_code(&data, 3, ErrorCorrection::L).unwrap();
        // 300 + 3 = 303 = 0x012F
        let store = bytes
            .windows(7)
            .position(|w| w[5] == 0x31 && w[6] == 0x50)
            .unwrap();
        assert_eq!(&bytes[store + 3..store + 5], &[0x2F, 0x01]);
    }

    #[test]
    fn test_module_size_clamped() {
        let bytes = qr_code("x", 40, ErrorCorrection::L).unwrap();
        assert_eq!(bytes[16], 16);
    }

    #[test]
    fn test_empty_data_rejected() {
        assert!(matches!(
            qr_code("", 6, ErrorCorrection::L),
            Err(MissiveError::Protocol(_))
        ));
    }

    #[test]
    fn test_oversize_data_rejected() {
        let data = "9".repeat(MAX_DATA_LEN + 1);
        assert!(qr_code(&data, 6, ErrorCorrection::L).is_err());
    }
}
