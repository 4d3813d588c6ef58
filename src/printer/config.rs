//! # Printer Configuration
//!
//! Hardware specifications for supported receipt printers.
//!
//! ## Supported Printers
//!
//! | Model | Key | Width (dots) | Resolution |
//! |-------|-----|--------------|------------|
//! | Epson TM-T88III | `tm-t88iii` | 512 | 180 DPI |
//! | Epson TM-T20 | `tm-t20` | 576 | 203 DPI |
//! | Generic 58mm | `58mm` | 384 | 203 DPI |
//!
//! ## Usage
//!
//! ```
//! use missive::printer::PrinterConfig;
//!
//! let config = PrinterConfig::by_name("tm-t88iii").unwrap();
//! assert_eq!(config.width_dots, 512);
//! ```

use crate::error::MissiveError;

/// # Printer Configuration
///
/// ```text
/// dots_per_mm = dpi / 25.4
/// width_mm = width_dots / dots_per_mm
///
/// For TM-T88III:
///   dots_per_mm = 180 / 25.4 ≈ 7.09
///   width_mm = 512 / 7.09 ≈ 72mm
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrinterConfig {
    /// Printer model name
    pub name: &'static str,

    /// Maximum print width in dots (pixels)
    pub width_dots: u16,

    /// Resolution in dots per inch
    pub dpi: u16,

    /// Maximum rows per raster command
    pub max_chunk_rows: u16,

    /// Extra feed before cutting, in motion units
    pub cut_feed: u8,
}

impl PrinterConfig {
    /// # Epson TM-T88III
    ///
    /// 80mm paper, 72mm (512 dot) print area, serial interface.
    ///
    /// ```text
    /// ├── 4mm ──┼────── 72mm printable ──────┼── 4mm ──┤
    /// │ margin  │         512 dots           │ margin  │
    /// ```
    pub const TM_T88III: Self = Self {
        name: "Epson TM-T88III",
        width_dots: 512,
        dpi: 180,
        max_chunk_rows: 256,
        cut_feed: 3,
    };

    /// # Epson TM-T20
    ///
    /// 80mm paper, 576 dot print area.
    pub const TM_T20: Self = Self {
        name: "Epson TM-T20",
        width_dots: 576,
        dpi: 203,
        max_chunk_rows: 256,
        cut_feed: 3,
    };

    /// # Generic 58mm
    pub const GENERIC_58MM: Self = Self {
        name: "Generic 58mm",
        width_dots: 384,
        dpi: 203,
        max_chunk_rows: 128,
        cut_feed: 3,
    };

    /// Look up a profile by key (case-insensitive, `_` and `-` are
    /// interchangeable).
    pub fn by_name(name: &str) -> Result<Self, MissiveError> {
        match name.to_lowercase().replace('_', "-").as_str() {
            "tm-t88iii" => Ok(Self::TM_T88III),
            "tm-t20" => Ok(Self::TM_T20),
            "58mm" => Ok(Self::GENERIC_58MM),
            other => Err(MissiveError::Config(format!(
                "unknown printer profile '{}' (known: {})",
                other,
                list_profiles().join(", ")
            ))),
        }
    }

    /// Print width in bytes
    #[inline]
    pub fn width_bytes(&self) -> u16 {
        self.width_dots.div_ceil(8)
    }

    #[inline]
    pub fn dots_per_mm(&self) -> f32 {
        self.dpi as f32 / 25.4
    }

    #[inline]
    pub fn width_mm(&self) -> f32 {
        self.width_dots as f32 / self.dots_per_mm()
    }
}

impl Default for PrinterConfig {
    fn default() -> Self {
        Self::TM_T88III
    }
}

/// Keys accepted by [`PrinterConfig::by_name`].
pub fn list_profiles() -> &'static [&'static str] {
    &["tm-t88iii", "tm-t20", "58mm"]
}

// ============================================================================
// TESTS
// ============================================================================
