//! # Code Page 858 Encoding
//!
//! Converts Unicode strings to the single-byte PC858 code page, which is
//! PC850 (Multilingual Latin-1) with the euro sign at 0xD5.
//!
//! The printer must be switched to PC858 (`ESC t 19`) for these bytes to
//! render correctly. ASCII (U+0000–U+007F) passes through unchanged.
//! Characters not in the code page are replaced with `?`.

use tracing::warn;

/// Upper half of the code page: `UPPER[i]` is the character at byte
/// `0x80 + i`.
#[rustfmt::skip]
const UPPER: [char; 128] = [
    // 0x80
    'Ç', 'ü', 'é', 'â', 'ä', 'à', 'å', 'ç', 'ê', 'ë', 'è', 'ï', 'î', 'ì', 'Ä', 'Å',
    // 0x90
    'É', 'æ', 'Æ', 'ô', 'ö', 'ò', 'û', 'ù', 'ÿ', 'Ö', 'Ü', 'ø', '£', 'Ø', '×', 'ƒ',
    // 0xA0
    'á', 'í', 'ó', 'ú', 'ñ', 'Ñ', 'ª', 'º', '¿', '®', '¬', '½', '¼', '¡', '«', '»',
    // 0xB0
    '░', '▒', '▓', '│', '┤', 'Á', 'Â', 'À', '©', '╣', '║', '╗', '╝', '¢', '¥', '┐',
    // 0xC0
    '└', '┴', '┬', '├', '─', '┼', 'ã', 'Ã', '╚', '╔', '╩', '╦', '╠', '═', '╬', '¤',
    // 0xD0
    'ð', 'Ð', 'Ê', 'Ë', 'È', '€', 'Í', 'Î', 'Ï', '┘', '┌', '█', '▄', '¦', 'Ì', '▀',
    // 0xE0
    'Ó', 'ß', 'Ô', 'Ò', 'õ', 'Õ', 'µ', 'þ', 'Þ', 'Ú', 'Û', 'Ù', 'ý', 'Ý', '¯', '´',
    // 0xF0
    '\u{AD}', '±', '‗', '¾', '¶', '§', '÷', '¸', '°', '¨', '·', '¹', '³', '²', '■', '\u{A0}',
];

/// Encode a Unicode string as PC858 bytes.
///
/// ```
/// use missive::protocol::cp858;
///
/// assert_eq!(cp858::encode("5€"), vec![b'5', 0xD5]);
/// assert_eq!(cp858::encode("☃"), vec![b'?']);
/// ```
pub fn encode(s: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(s.len());
    for ch in s.chars() {
        if (ch as u32) < 0x80 {
            out.push(ch as u8);
        } else if let Some(byte) = to_byte(ch) {
            out.push(byte);
        } else {
            warn!(
                character = %ch,
                code_point = format_args!("U+{:04X}", ch as u32),
                "unmapped character, replacing with '?'"
            );
            out.push(b'?');
        }
    }
    out
}

/// Map a non-ASCII character to its byte (0x80–0xFF).
fn to_byte(ch: char) -> Option<u8> {
    UPPER
        .iter()
        .position(|&c| c == ch)
        .map(|i| 0x80 + i as u8)
}

// ============================================================================
// TESTS
// ============================================================================
