//! Multibyte Interchange Format (MIF) decoding.
//!
//! `\M+XXXX` and `\m+XXXXX` escapes carry hex-encoded characters from the
//! legacy CJK big-font encodings. Four-digit codes are two bytes decoded
//! as GBK, with Big5 as a fallback when GBK has no mapping. Five-digit
//! codes select the encoding from the leading digit (`1` Shift-JIS, `2`
//! Big5, anything else GBK); the remaining digits are not resolved
//! against the big-font tables and produce the placeholder glyph.

use encoding_rs::{Encoding, BIG5, GBK, SHIFT_JIS};

/// The glyph substituted for characters that cannot be decoded.
pub const PLACEHOLDER_GLYPH: char = '▯';

/// How many hex digits a `\M+` code carries.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MifCodeLength {
    /// Match five contiguous hex digits if present, otherwise four.
    #[default]
    Auto,
    Four,
    Five,
}

impl MifCodeLength {
    /// Digit counts to try, in order of preference.
    pub(crate) fn candidates(&self) -> &'static [usize] {
        match self {
            MifCodeLength::Auto => &[5, 4],
            MifCodeLength::Four => &[4],
            MifCodeLength::Five => &[5],
        }
    }
}

/// The built-in MIF decoder.
///
/// `code` is the hex digit string following `\M+`. Anything that cannot
/// be decoded comes back as [`PLACEHOLDER_GLYPH`].
pub fn decode(code: &str) -> char {
    match code.len() {
        5 => {
            // The leading digit selects the big-font encoding; the code
            // itself is not resolved against it.
            let _encoding: &'static Encoding = match code.as_bytes()[0] {
                b'1' => SHIFT_JIS,
                b'2' => BIG5,
                _ => GBK,
            };
            PLACEHOLDER_GLYPH
        }
        4 => match u16::from_str_radix(code, 16) {
            Ok(value) => decode_big_font(value.to_be_bytes()),
            Err(_) => PLACEHOLDER_GLYPH,
        },
        _ => PLACEHOLDER_GLYPH,
    }
}

fn decode_big_font(bytes: [u8; 2]) -> char {
    for encoding in [GBK, BIG5] {
        let (text, had_errors) = encoding.decode_without_bom_handling(&bytes);
        if had_errors || text.contains('\u{FFFD}') {
            continue;
        }
        if let Some(c) = text.chars().next() {
            return c;
        }
    }
    PLACEHOLDER_GLYPH
}
