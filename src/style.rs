//! # Style Model
//!
//! A [`Style`] is the full set of text attributes in effect at one point of a
//! rendered message. Markup tags never carry a full style; they carry a sparse
//! [`StyleOverrides`] bundle that is laid over the enclosing frame.
//!
//! ## Style Keys
//!
//! | Key | Type | Default | Effect |
//! |-----|------|---------|--------|
//! | `align` | left/center/right | left | Line justification |
//! | `font` | a/b | a | Character font |
//! | `bold` | bool | false | Emphasized printing |
//! | `underline` | 0-2 | 0 | Underline thickness in dots |
//! | `custom_size` | bool | true | Use `width`/`height` multipliers |
//! | `width` | 1-8 | 1 | Horizontal character multiplier |
//! | `height` | 1-8 | 1 | Vertical character multiplier |
//! | `density` | 0-9 | 9 | Print density (9 leaves the device setting alone) |
//! | `invert` | bool | false | White on black |
//! | `smooth` | bool | false | Character smoothing |
//! | `flip` | bool | false | Upside-down printing |

use serde::{Deserialize, Serialize};

/// Text alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// Character font
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Font {
    /// Font A: 12×24 dots
    #[default]
    A,
    /// Font B: 9×17 dots
    B,
}

/// A fully resolved style frame.
///
/// Frames are values: rendering derives a child frame with [`Style::overlay`]
/// and never mutates the parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Style {
    pub align: Align,
    pub font: Font,
    pub bold: bool,
    pub underline: u8,
    pub custom_size: bool,
    pub width: u8,
    pub height: u8,
    pub density: u8,
    pub invert: bool,
    pub smooth: bool,
    pub flip: bool,
}

impl Style {
    /// The canonical default record.
    pub const DEFAULT: Self = Self {
        align: Align::Left,
        font: Font::A,
        bold: false,
        underline: 0,
        custom_size: true,
        width: 1,
        height: 1,
        density: 9,
        invert: false,
        smooth: false,
        flip: false,
    };

    /// Derive a child frame: every key the overrides set wins, the rest is
    /// inherited from `self`.
    pub fn overlay(&self, overrides: &StyleOverrides) -> Self {
        Self {
            align: overrides.align.unwrap_or(self.align),
            font: overrides.font.unwrap_or(self.font),
            bold: overrides.bold.unwrap_or(self.bold),
            underline: overrides.underline.unwrap_or(self.underline),
            custom_size: overrides.custom_size.unwrap_or(self.custom_size),
            width: overrides.width.unwrap_or(self.width),
            height: overrides.height.unwrap_or(self.height),
            density: overrides.density.unwrap_or(self.density),
            invert: overrides.invert.unwrap_or(self.invert),
            smooth: overrides.smooth.unwrap_or(self.smooth),
            flip: overrides.flip.unwrap_or(self.flip),
        }
    }
}

impl Default for Style {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Sparse style changes carried by a markup tag.
///
/// Only the attributes a tag changes are `Some`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StyleOverrides {
    pub align: Option<Align>,
    pub font: Option<Font>,
    pub bold: Option<bool>,
    pub underline: Option<u8>,
    pub custom_size: Option<bool>,
    pub width: Option<u8>,
    pub height: Option<u8>,
    pub density: Option<u8>,
    pub invert: Option<bool>,
    pub smooth: Option<bool>,
    pub flip: Option<bool>,
}

impl StyleOverrides {
    /// No overrides at all. Used as the base for `const` tag bundles.
    pub const NONE: Self = Self {
        align: None,
        font: None,
        bold: None,
        underline: None,
        custom_size: None,
        width: None,
        height: None,
        density: None,
        invert: None,
        smooth: None,
        flip: None,
    };

    /// Whether this bundle changes alignment.
    ///
    /// Alignment only takes effect at the start of a line, so the renderer
    /// forces a line break after any node that sets it.
    #[inline]
    pub fn sets_align(&self) -> bool {
        self.align.is_some()
    }

    /// Whether this bundle changes nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::NONE
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_canonical_record() {
        let style = Style::default();
        assert_eq!(style.align, Align::Left);
        assert_eq!(style.font, Font::A);
        assert_eq!(style.underline, 0);
        assert!(style.custom_size);
        assert_eq!((style.width, style.height), (1, 1));
        assert_eq!(style.density, 9);
        assert!(!style.bold && !style.invert && !style.smooth && !style.flip);
    }

    #[test]
    fn test_overlay_only_touches_set_keys() {
        let base = Style {
            bold: true,
            ..Style::DEFAULT
        };
        let overrides = StyleOverrides {
            align: Some(Align::Center),
            ..StyleOverrides::NONE
        };
        let child = base.overlay(&overrides);
        assert_eq!(child.align, Align::Center);
        assert!(child.bold, "inherited key must survive the overlay");
        assert_eq!(base.align, Align::Left, "parent frame is untouched");
    }

    #[test]
    fn test_overlay_empty_is_identity() {
        let base = Style {
            width: 3,
            flip: true,
            ..Style::DEFAULT
        };
        assert_eq!(base.overlay(&StyleOverrides::NONE), base);
        assert!(StyleOverrides::NONE.is_empty());
    }

    #[test]
    fn test_style_deserializes_partial_table() {
        let style: Style = serde_json::from_str(r#"{"align":"right","font":"b"}"#).unwrap();
        assert_eq!(style.align, Align::Right);
        assert_eq!(style.font, Font::B);
        assert_eq!(style.density, 9);
    }
}
