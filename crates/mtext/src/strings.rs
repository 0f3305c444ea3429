//! Helpers for working with raw MTEXT content strings.
//!
//! These functions operate on the content string directly, without going
//! through the tokenizer; [`plain_text`] is the exception and drives a
//! full tokenize to strip the formatting.

use std::collections::BTreeSet;

use crate::token::Value;
use crate::tokenizer::Tokenizer;

/// Replace line endings (`\r\n`, `\r` or `\n`) with the two-character
/// paragraph escape `\P`, as required for storing content in DXF.
pub fn escape_line_endings(text: &str) -> String {
    let text = text.replace("\r\n", "\\P");
    let text = text.replace('\r', "\\P");
    text.replace('\n', "\\P")
}

/// True if the text contains inline formatting codes.
///
/// `\P` (paragraph) and `\~` (non-breaking space) do not count as
/// formatting: if any backslash remains after removing them, the text has
/// codes that change the formatting state.
pub fn has_inline_formatting_codes(text: &str) -> bool {
    text.replace("\\P", "").replace("\\~", "").contains('\\')
}

/// Collect the font family names referenced by inline `\f`/`\F` codes,
/// lowercased.
///
/// With `remove_extension` a trailing `.ttf`, `.otf`, `.woff` or `.shx`
/// suffix is stripped from each name.
pub fn extract_font_names(text: &str, remove_extension: bool) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    let chars: Vec<char> = text.chars().collect();
    let mut index = 0;
    while index + 1 < chars.len() {
        if chars[index] != '\\' || !matches!(chars[index + 1], 'f' | 'F') {
            index += 1;
            continue;
        }
        index += 2;
        let mut name = String::new();
        while index < chars.len() && !matches!(chars[index], ';' | '|') {
            name.push(chars[index]);
            index += 1;
        }
        let mut name = name.to_lowercase();
        if remove_extension {
            for suffix in [".ttf", ".otf", ".woff", ".shx"] {
                if let Some(stripped) = name.strip_suffix(suffix) {
                    name = stripped.to_string();
                    break;
                }
            }
        }
        names.insert(name);
    }
    names
}

/// The content with all formatting stripped.
///
/// Words and stacked fractions keep their text; spaces, tabs and
/// paragraph/column breaks become `' '`, `'\t'` and `'\n'`.
pub fn plain_text(content: &str) -> String {
    let mut text = String::new();
    for token in Tokenizer::new(content) {
        match token.value {
            Value::Word(w) => text.push_str(&w),
            Value::Space | Value::NonBreakingSpace => text.push(' '),
            Value::Tab => text.push('\t'),
            Value::NewParagraph | Value::NewColumn => text.push('\n'),
            Value::Stack(s) => {
                text.push_str(&s.numerator);
                if let Some(divider) = s.divider {
                    text.push(divider);
                }
                text.push_str(&s.denominator);
            }
            Value::WrapAtDimLine | Value::PropertiesChanged(_) => {}
        }
    }
    text
}
