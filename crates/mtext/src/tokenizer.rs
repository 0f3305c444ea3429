//! The MTEXT tokenizer, which reads content strings and produces tokens.
//!
//! The tokenizer is pull-based: it implements [`Iterator`] and does all of
//! its work inside [`next`](Iterator::next), one token per call. This
//! matters because formatting commands mutate the active state as they are
//! encountered, and every emitted token freezes a copy of that state —
//! tokens cannot be produced in a batch ahead of the state changes that
//! precede them. A tokenizer makes a single forward pass; tokenizing the
//! same content twice requires a second instance.
//!
//! Content is never rejected. Everything that is not a well-formed escape
//! degrades to literal word text (with the cursor rewound where the parse
//! consumed characters speculatively), so the token sequence always runs
//! to the end of the input.

use crate::cursor::Cursor;
use crate::mif;
use crate::mif::MifCodeLength;
use crate::scope::ScopeStack;
use crate::state::{
    FactorValue, FontFace, FormattingState, LineAlignment, ParagraphAlignment,
    ParagraphProperties, Strokes, TabStop,
};
use crate::token::{ChangedProperties, ParagraphChanges, Stacking, StateChanges, Token, Value};

/// Tokenizer configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct Options {
    /// Emit a [`Value::PropertiesChanged`] token whenever a command or a
    /// scope exit changes the formatting state.
    pub yield_property_commands: bool,
    /// Reset the paragraph properties to their defaults after every
    /// [`Value::NewParagraph`] token.
    pub reset_paragraph_parameters: bool,
    /// Number of hex digits expected after `\M+`.
    pub mif_code_length: MifCodeLength,
    /// Replacement for the built-in MIF decoder. The argument is the hex
    /// digit string following `\M+`.
    pub mif_decoder: Option<fn(&str) -> char>,
}

/// The tokenizer: a single-pass iterator over the tokens of one MTEXT
/// content string.
///
/// ```
/// use mtext::tokenizer::Tokenizer;
/// use mtext::token::Value;
///
/// let values: Vec<Value> = Tokenizer::new(r"\C1;Hello").map(|t| t.value).collect();
/// assert_eq!(values, vec![Value::Word("Hello".into())]);
/// ```
pub struct Tokenizer {
    cursor: Cursor,
    scopes: ScopeStack,
    options: Options,
    word: String,
    pending: Option<Value>,
}

impl Tokenizer {
    /// Create a tokenizer with the default initial state and options.
    pub fn new(content: &str) -> Tokenizer {
        Tokenizer::with_options(content, FormattingState::default(), Options::default())
    }

    /// Create a tokenizer that starts from `initial_state`.
    pub fn with_options(
        content: &str,
        initial_state: FormattingState,
        options: Options,
    ) -> Tokenizer {
        Tokenizer {
            cursor: Cursor::new(content),
            scopes: ScopeStack::new(initial_state),
            options,
            word: String::new(),
            pending: None,
        }
    }

    fn flush_word(&mut self) -> Value {
        Value::Word(std::mem::take(&mut self.word))
    }

    /// Produce the next token value, or [`None`] at the end of input.
    fn scan(&mut self) -> Option<Value> {
        if let Some(value) = self.pending.take() {
            return Some(value);
        }
        loop {
            let Some(c) = self.cursor.peek(0) else {
                if self.word.is_empty() {
                    return None;
                }
                return Some(self.flush_word());
            };
            match c {
                '\t' => return self.emit_escaped(1, Value::Tab),
                '\n' => return self.emit_escaped(1, Value::NewParagraph),
                // Remaining control characters count as a literal space.
                c if (c as u32) < 32 => return self.emit_escaped(1, Value::Space),
                '\\' => {
                    if let Some(value) = self.backslash() {
                        return Some(value);
                    }
                }
                '%' if self.cursor.peek(1) == Some('%') => self.percent_code(),
                '^' => {
                    if let Some(value) = self.caret_code() {
                        return Some(value);
                    }
                }
                ' ' => return self.emit_escaped(1, Value::Space),
                '{' => {
                    if !self.word.is_empty() {
                        return Some(self.flush_word());
                    }
                    self.cursor.consume(1);
                    self.scopes.push();
                }
                '}' => {
                    if !self.word.is_empty() {
                        return Some(self.flush_word());
                    }
                    self.cursor.consume(1);
                    if let Some(value) = self.pop_scope() {
                        return Some(value);
                    }
                }
                _ => {
                    self.cursor.consume(1);
                    self.word.push(c);
                }
            }
        }
    }

    /// Emit `value` for an escape of `len` characters, flushing a pending
    /// word first.
    ///
    /// When a word is pending the escape is left unconsumed; the next call
    /// re-reads it with an empty word buffer.
    fn emit_escaped(&mut self, len: isize, value: Value) -> Option<Value> {
        if !self.word.is_empty() {
            return Some(self.flush_word());
        }
        self.cursor.consume(len);
        Some(value)
    }

    /// Handle a `\` escape. Returns a value to emit now, or [`None`] to
    /// keep scanning.
    fn backslash(&mut self) -> Option<Value> {
        match self.cursor.peek(1) {
            // A trailing backslash is literal text.
            None => {
                self.cursor.consume(1);
                self.word.push('\\');
                None
            }
            Some(c @ ('\\' | '{' | '}')) => {
                self.cursor.consume(2);
                self.word.push(c);
                None
            }
            Some('~') => self.emit_escaped(2, Value::NonBreakingSpace),
            Some('P') => self.emit_escaped(2, Value::NewParagraph),
            Some('N') => self.emit_escaped(2, Value::NewColumn),
            Some('X') => self.emit_escaped(2, Value::WrapAtDimLine),
            Some('S') => {
                if !self.word.is_empty() {
                    return Some(self.flush_word());
                }
                self.cursor.consume(2);
                let stacking = self.scan_stacking();
                Some(Value::Stack(stacking))
            }
            Some(c @ ('M' | 'm')) => {
                self.cursor.consume(2);
                self.mif_code(c)
            }
            Some('U') => {
                self.unicode_code();
                None
            }
            Some(c) => {
                self.cursor.consume(2);
                self.property_command(c)
            }
        }
    }

    /// Decode a `\M+`/`\m+` code. The cursor is positioned after the
    /// command letter.
    fn mif_code(&mut self, letter: char) -> Option<Value> {
        match self.scan_mif() {
            Some(decoded) => {
                // The decoded character starts a fresh word if one was
                // already accumulating.
                if !self.word.is_empty() {
                    let flushed = self.flush_word();
                    self.word.push(decoded);
                    return Some(flushed);
                }
                self.word.push(decoded);
                None
            }
            None => {
                self.word.push('\\');
                self.word.push(letter);
                None
            }
        }
    }

    fn scan_mif(&mut self) -> Option<char> {
        if self.cursor.peek(0) != Some('+') {
            return None;
        }
        for &len in self.options.mif_code_length.candidates() {
            let mut code = String::with_capacity(len);
            for offset in 1..=len {
                match self.cursor.peek(offset) {
                    Some(d) if d.is_ascii_hexdigit() => code.push(d),
                    _ => break,
                }
            }
            if code.len() == len {
                self.cursor.consume(1 + len as isize);
                return Some(match self.options.mif_decoder {
                    Some(decoder) => decoder(&code),
                    None => mif::decode(&code),
                });
            }
        }
        None
    }

    /// Decode a `\U+XXXX` code. The cursor is positioned at the `\`.
    fn unicode_code(&mut self) {
        if self.cursor.peek(2) != Some('+') {
            self.cursor.consume(2);
            self.word.push_str("\\U");
            return;
        }
        let mut digits = String::new();
        while digits.len() < 8 {
            match self.cursor.peek(3 + digits.len()) {
                Some(d) if d.is_ascii_hexdigit() => digits.push(d),
                _ => break,
            }
        }
        if digits.len() < 4 {
            self.cursor.consume(3);
            self.word.push_str("\\U+");
            return;
        }
        self.cursor.consume(3 + digits.len() as isize);
        let decoded = u32::from_str_radix(&digits, 16)
            .ok()
            .and_then(char::from_u32)
            .unwrap_or(mif::PLACEHOLDER_GLYPH);
        self.word.push(decoded);
    }

    /// Decode a `%%` code. The cursor is positioned at the first `%`.
    fn percent_code(&mut self) {
        match self.cursor.peek(2) {
            Some('c' | 'C') => {
                self.cursor.consume(3);
                self.word.push('Ø');
            }
            Some('d' | 'D') => {
                self.cursor.consume(3);
                self.word.push('°');
            }
            Some('p' | 'P') => {
                self.cursor.consume(3);
                self.word.push('±');
            }
            Some(d) if d.is_ascii_digit() => match (self.cursor.peek(3), self.cursor.peek(4)) {
                (Some(e), Some(f)) if e.is_ascii_digit() && f.is_ascii_digit() => {
                    let code = [d, e, f].iter().fold(0, |code, digit| {
                        code * 10 + digit.to_digit(10).unwrap_or(0)
                    });
                    self.cursor.consume(5);
                    self.word
                        .push(char::from_u32(code).unwrap_or(mif::PLACEHOLDER_GLYPH));
                }
                _ => self.cursor.consume(3),
            },
            // Unrecognized codes are dropped; the seek clamps at the end
            // of input.
            _ => self.cursor.consume(3),
        }
    }

    /// Handle a `^X` caret code. Returns a value to emit now, or [`None`]
    /// to keep scanning.
    fn caret_code(&mut self) -> Option<Value> {
        match self.cursor.peek(1) {
            Some('I') => self.emit_escaped(2, Value::Tab),
            Some('J') => self.emit_escaped(2, Value::NewParagraph),
            Some('M') => {
                self.cursor.consume(2);
                None
            }
            Some(' ') => {
                self.cursor.consume(2);
                self.word.push('^');
                None
            }
            Some(_) => {
                self.cursor.consume(2);
                self.word.push(mif::PLACEHOLDER_GLYPH);
                None
            }
            None => {
                self.cursor.consume(1);
                self.word.push('^');
                None
            }
        }
    }

    /// Pop a scope for `}`, reporting the state difference if property
    /// reporting is on.
    fn pop_scope(&mut self) -> Option<Value> {
        if !self.options.yield_property_commands {
            self.scopes.pop();
            return None;
        }
        let before = self.scopes.current().clone();
        self.scopes.pop();
        let changes = StateChanges::between(&before, self.scopes.current());
        if changes.is_empty() {
            return None;
        }
        Some(Value::PropertiesChanged(ChangedProperties {
            command: None,
            changes,
            depth: self.scopes.depth(),
        }))
    }

    /// Apply a property command. The cursor is positioned after the
    /// command letter; the command's arguments are consumed here.
    ///
    /// Unknown commands never abort the parse: the consumed `\X` text is
    /// appended to the current word instead.
    fn property_command(&mut self, letter: char) -> Option<Value> {
        let before = match self.options.yield_property_commands {
            true => Some(self.scopes.current().clone()),
            false => None,
        };
        if !self.apply_command(letter) {
            self.word.push('\\');
            self.word.push(letter);
            return None;
        }
        let before = before?;
        let changes = StateChanges::between(&before, self.scopes.current());
        if changes.is_empty() {
            return None;
        }
        Some(Value::PropertiesChanged(ChangedProperties {
            command: Some(letter.to_string()),
            changes,
            depth: self.scopes.depth(),
        }))
    }

    /// The command dispatch table. Returns false for unknown letters.
    fn apply_command(&mut self, letter: char) -> bool {
        match letter {
            'L' => self.stroke_command(Strokes::UNDERLINE, true),
            'l' => self.stroke_command(Strokes::UNDERLINE, false),
            'O' => self.stroke_command(Strokes::OVERLINE, true),
            'o' => self.stroke_command(Strokes::OVERLINE, false),
            'K' => self.stroke_command(Strokes::STRIKE_THROUGH, true),
            'k' => self.stroke_command(Strokes::STRIKE_THROUGH, false),
            'A' => self.alignment_command(),
            'C' => self.aci_command(),
            'c' => self.rgb_command(),
            'H' => self.factor_command(|state| &mut state.cap_height),
            'W' => self.factor_command(|state| &mut state.width_factor),
            'T' => self.factor_command(|state| &mut state.char_tracking_factor),
            'Q' => self.oblique_command(),
            'p' => self.paragraph_command(),
            'f' | 'F' => self.font_command(),
            _ => return false,
        }
        true
    }

    /// Consume the optional `;` terminating a command.
    fn consume_terminator(&mut self) {
        if self.cursor.peek(0) == Some(';') {
            self.cursor.consume(1);
        }
    }

    fn stroke_command(&mut self, stroke: Strokes, on: bool) {
        let state = self.scopes.current_mut();
        state.strokes.set(stroke, on);
        state.continue_stroke = state.has_any_stroke();
        self.consume_terminator();
    }

    fn alignment_command(&mut self) {
        let alignment = match self.cursor.peek(0) {
            Some(d) if d.is_ascii_digit() => {
                self.cursor.consume(1);
                match d {
                    '0' => LineAlignment::Bottom,
                    '1' => LineAlignment::Middle,
                    '2' => LineAlignment::Top,
                    _ => LineAlignment::Bottom,
                }
            }
            _ => LineAlignment::Bottom,
        };
        self.scopes.current_mut().line_alignment = alignment;
        self.consume_terminator();
    }

    fn aci_command(&mut self) {
        if let Some(value) = scan_unsigned(&mut self.cursor) {
            // Out-of-range values are ignored, not errors.
            if value < 257 {
                let _ = self.scopes.current_mut().color.set_aci(value as u16);
            }
        }
        self.consume_terminator();
    }

    fn rgb_command(&mut self) {
        if let Some(value) = scan_unsigned(&mut self.cursor) {
            self.scopes
                .current_mut()
                .color
                .set_rgb_value((value & 0xFF_FFFF) as u32);
        }
        self.consume_terminator();
    }

    fn factor_command(&mut self, select: fn(&mut FormattingState) -> &mut FactorValue) {
        let Some(value) = scan_float(&mut self.cursor) else {
            self.consume_terminator();
            return;
        };
        let relative = match self.cursor.peek(0) {
            Some('x') => {
                self.cursor.consume(1);
                true
            }
            _ => false,
        };
        let factor = select(self.scopes.current_mut());
        factor.set_value(value);
        factor.set_relative(relative);
        self.consume_terminator();
    }

    fn oblique_command(&mut self) {
        if let Some(value) = scan_float(&mut self.cursor) {
            self.scopes.current_mut().oblique_angle = value;
        }
        self.consume_terminator();
    }

    fn paragraph_command(&mut self) {
        let stop = self.cursor.find(';', false);
        let spec = self.cursor.take_through(stop);
        apply_paragraph_spec(&mut self.scopes.current_mut().paragraph, &spec);
    }

    fn font_command(&mut self) {
        let stop = self.cursor.find(';', false);
        let spec = self.cursor.take_through(stop);
        self.scopes.current_mut().font = parse_font_spec(&spec);
    }

    /// Parse the body of a `\S` expression, up to the terminating `;`.
    fn scan_stacking(&mut self) -> Stacking {
        let stop = self.cursor.find(';', true);
        let text = self.cursor.take_through(stop);
        stack_expression(&text)
    }
}

impl Iterator for Tokenizer {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        let value = self.scan()?;
        let state = self.scopes.current().clone();
        // The paragraph reset applies after the token's snapshot is taken:
        // the NewParagraph token itself carries the pre-reset properties.
        if value == Value::NewParagraph && self.options.reset_paragraph_parameters {
            let current = self.scopes.current_mut();
            let before = std::mem::take(&mut current.paragraph);
            if self.options.yield_property_commands {
                if let Some(paragraph) =
                    ParagraphChanges::between(&before, &ParagraphProperties::default())
                {
                    self.pending = Some(Value::PropertiesChanged(ChangedProperties {
                        command: None,
                        changes: StateChanges {
                            paragraph: Some(paragraph),
                            ..StateChanges::default()
                        },
                        depth: self.scopes.depth(),
                    }));
                }
            }
        }
        Some(Token::new(value, state))
    }
}

fn control_to_space(c: char) -> char {
    match (c as u32) < 32 {
        true => ' ',
        false => c,
    }
}

/// Parse the body of a stacking expression into its parts.
fn stack_expression(text: &str) -> Stacking {
    let chars: Vec<char> = text.chars().collect();
    let mut numerator = String::new();
    let mut denominator = String::new();
    let mut divider = None;
    let mut index = 0;

    // The numerator runs to the first unescaped divider. Escaped
    // characters are literal and never recognized as operators, carets
    // included.
    while index < chars.len() {
        let c = chars[index];
        if c == '\\' {
            index += 1;
            if index < chars.len() {
                numerator.push(control_to_space(chars[index]));
                index += 1;
            }
            continue;
        }
        if matches!(c, '/' | '#' | '^') {
            divider = Some(c);
            index += 1;
            break;
        }
        numerator.push(control_to_space(c));
        index += 1;
    }

    // The caret divider swallows leading spaces of the denominator.
    if divider == Some('^') {
        while index < chars.len() && chars[index] == ' ' {
            index += 1;
        }
    }
    while index < chars.len() {
        let c = chars[index];
        if c == '\\' {
            index += 1;
            if index < chars.len() {
                denominator.push(control_to_space(chars[index]));
                index += 1;
            }
            continue;
        }
        denominator.push(control_to_space(c));
        index += 1;
    }

    // The escape pattern "^I/^J" stacks two control codes; AutoCAD
    // renders it as a plain slash between blanks.
    if numerator.is_empty() && denominator.contains("I/") {
        return Stacking {
            numerator: " ".into(),
            denominator: " ".into(),
            divider: Some('/'),
        };
    }
    Stacking {
        numerator,
        denominator,
        divider,
    }
}

/// Apply the body of a `\p` expression.
fn apply_paragraph_spec(paragraph: &mut ParagraphProperties, spec: &str) {
    let mut cursor = Cursor::new(spec);
    while let Some(c) = cursor.get() {
        match c {
            'i' => {
                if let Some(value) = scan_float(&mut cursor) {
                    paragraph.indent = value;
                }
            }
            'l' => {
                if let Some(value) = scan_float(&mut cursor) {
                    paragraph.left = value;
                }
            }
            'r' => {
                if let Some(value) = scan_float(&mut cursor) {
                    paragraph.right = value;
                }
            }
            'x' => {}
            'q' => {
                paragraph.align = match cursor.get() {
                    Some('l') => ParagraphAlignment::Left,
                    Some('r') => ParagraphAlignment::Right,
                    Some('c') => ParagraphAlignment::Center,
                    Some('j') => ParagraphAlignment::Justified,
                    Some('d') => ParagraphAlignment::Distributed,
                    _ => ParagraphAlignment::Default,
                };
            }
            't' => {
                // A t section always replaces the tab stops wholesale.
                paragraph.tabs = scan_tab_stops(&mut cursor);
            }
            // Commas between numeric sub-fields, and anything
            // unrecognized, are skipped.
            _ => {}
        }
    }
}

fn scan_tab_stops(cursor: &mut Cursor) -> Vec<TabStop> {
    let mut tabs = Vec::new();
    loop {
        while cursor.peek(0) == Some(',') {
            cursor.consume(1);
        }
        let prefix = match cursor.peek(0) {
            Some(c @ ('r' | 'c')) => {
                cursor.consume(1);
                Some(c)
            }
            _ => None,
        };
        let Some(position) = scan_float(cursor) else {
            break;
        };
        tabs.push(match prefix {
            Some('r') => TabStop::Right(position),
            Some('c') => TabStop::Center(position),
            _ => TabStop::Plain(position),
        });
    }
    tabs
}

/// Parse the body of a `\f` expression: `name|opt|opt|...`.
///
/// Unspecified style and weight fall back to the constructed defaults,
/// not to the previous state.
fn parse_font_spec(spec: &str) -> FontFace {
    let mut parts = spec.split('|');
    let mut font = FontFace {
        family: parts.next().unwrap_or("").to_string(),
        ..FontFace::default()
    };
    for part in parts {
        if part.starts_with("b1") {
            font.set_bold(true);
        } else if part == "i" || part.starts_with("i1") {
            font.set_italic(true);
        } else if part.starts_with("i0") {
            font.set_italic(false);
        }
    }
    font
}

fn scan_digits(cursor: &mut Cursor, buffer: &mut String) -> usize {
    let mut count = 0;
    while let Some(d) = cursor.peek(0) {
        if !d.is_ascii_digit() {
            break;
        }
        buffer.push(d);
        cursor.consume(1);
        count += 1;
    }
    count
}

/// Scan a float literal: `[sign] (digits[.digits] | .digits) [exponent]`.
///
/// The exponent is only consumed when it is complete, matching the
/// regular expression `([eE][+-]?\d+)?` — `1ex` scans as `1` and leaves
/// `ex` on the cursor. When no number matches at all, everything that was
/// consumed (at most a sign) is rewound and [`None`] is returned.
fn scan_float(cursor: &mut Cursor) -> Option<f64> {
    let start = cursor.position();
    let mut buffer = String::new();
    if let Some(sign @ ('+' | '-')) = cursor.peek(0) {
        buffer.push(sign);
        cursor.consume(1);
    }
    let integer_digits = scan_digits(cursor, &mut buffer);
    let mut fraction_digits = 0;
    if integer_digits > 0 {
        // A bare trailing dot is fine: "1." scans as 1.0.
        if cursor.peek(0) == Some('.') {
            buffer.push('.');
            cursor.consume(1);
            fraction_digits = scan_digits(cursor, &mut buffer);
        }
    } else if cursor.peek(0) == Some('.') && cursor.peek(1).is_some_and(|c| c.is_ascii_digit()) {
        buffer.push('.');
        cursor.consume(1);
        fraction_digits = scan_digits(cursor, &mut buffer);
    }
    if integer_digits == 0 && fraction_digits == 0 {
        cursor.consume(-((cursor.position() - start) as isize));
        return None;
    }
    if let Some(e @ ('e' | 'E')) = cursor.peek(0) {
        let digit_offset = match cursor.peek(1) {
            Some('+' | '-') => 2,
            _ => 1,
        };
        if cursor
            .peek(digit_offset)
            .is_some_and(|c| c.is_ascii_digit())
        {
            buffer.push(e);
            cursor.consume(1);
            if let Some(sign @ ('+' | '-')) = cursor.peek(0) {
                buffer.push(sign);
                cursor.consume(1);
            }
            scan_digits(cursor, &mut buffer);
        }
    }
    match buffer.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            cursor.consume(-((cursor.position() - start) as isize));
            None
        }
    }
}

/// Scan an unsigned decimal integer, saturating instead of overflowing.
fn scan_unsigned(cursor: &mut Cursor) -> Option<u64> {
    let mut value: u64 = 0;
    let mut any = false;
    while let Some(d) = cursor.peek(0) {
        let Some(digit) = d.to_digit(10) else {
            break;
        };
        cursor.consume(1);
        value = value.saturating_mul(10).saturating_add(digit as u64);
        any = true;
    }
    any.then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mif::PLACEHOLDER_GLYPH;

    fn values(input: &str) -> Vec<Value> {
        Tokenizer::new(input).map(|t| t.value).collect()
    }

    fn word(text: &str) -> Value {
        Value::Word(text.into())
    }

    fn stack(numerator: &str, denominator: &str, divider: Option<char>) -> Value {
        Value::Stack(Stacking {
            numerator: numerator.into(),
            denominator: denominator.into(),
            divider,
        })
    }

    macro_rules! tokenizer_tests {
        ($( ( $name: ident, $input: expr, $( $value: expr, )* ), )+) => {
            $(
            #[test]
            fn $name() {
                let want: Vec<Value> = vec![ $( $value ),* ];
                assert_eq!(values($input), want);
            }
            )+
        };
    }

    tokenizer_tests![
        (empty, "", ),
        (single_word, "Hello", word("Hello"), ),
        (words_and_spaces, "Hello World", word("Hello"), Value::Space, word("World"), ),
        (leading_space, " a", Value::Space, word("a"), ),
        (trailing_space, "a ", word("a"), Value::Space, ),
        (double_space, "a  b", word("a"), Value::Space, Value::Space, word("b"), ),
        (tab_and_newline, "a\tb\nc", word("a"), Value::Tab, word("b"), Value::NewParagraph, word("c"), ),
        (other_control_chars_act_as_spaces, "a\rb", word("a"), Value::Space, word("b"), ),
        (escaped_braces_and_backslash, r"\{\\\}", word(r"{\}"), ),
        (trailing_backslash, r"a\", word(r"a\"), ),
        (non_breaking_space, r"a\~b", word("a"), Value::NonBreakingSpace, word("b"), ),
        (new_paragraph, r"Line 1\PLine 2",
            word("Line"), Value::Space, word("1"), Value::NewParagraph,
            word("Line"), Value::Space, word("2"), ),
        (new_column, r"a\Nb", word("a"), Value::NewColumn, word("b"), ),
        (wrap_at_dim_line, r"a\Xb", word("a"), Value::WrapAtDimLine, word("b"), ),
        (braces_are_not_words, "{a}", word("a"), ),
        (unmatched_close_brace, "}a", word("a"), ),
        (unknown_command_is_literal, r"a\zb", word(r"a\zb"), ),
        (known_commands_do_not_split_words, r"ab\C1;cd", word("abcd"), ),
        (percent_diameter, "%%c", word("Ø"), ),
        (percent_degree_uppercase, "a%%Db", word("a°b"), ),
        (percent_plus_minus, "%%p5", word("±5"), ),
        (percent_decimal_code, "%%065", word("A"), ),
        (percent_unknown_code_dropped, "a%%xb", word("ab"), ),
        (percent_short_decimal_dropped, "a%%6", word("a"), ),
        (caret_tab, "a^Ib", word("a"), Value::Tab, word("b"), ),
        (caret_newline, "a^Jb", word("a"), Value::NewParagraph, word("b"), ),
        (caret_m_dropped, "a^Mb", word("ab"), ),
        (caret_space_is_literal_caret, "a^ b", word("a^b"), ),
        (caret_unknown_is_placeholder, "a^Gb", word(&format!("a{PLACEHOLDER_GLYPH}b")), ),
        (stack_simple, r"\S1/2;", stack("1", "2", Some('/')), ),
        (stack_hash, r"\S12#34;", stack("12", "34", Some('#')), ),
        (stack_caret_skips_leading_spaces, r"\S+0.5^ 0.3;", stack("+0.5", "0.3", Some('^')), ),
        (stack_without_divider, r"\Sabc;", stack("abc", "", None), ),
        (stack_without_terminator, r"\S1/2", stack("1", "2", Some('/')), ),
        (stack_escaped_divider_is_literal, r"\S1\/2/3;", stack("1/2", "3", Some('/')), ),
        (stack_escaped_caret_is_literal, r"\Sa\^b;", stack("a^b", "", None), ),
        (stack_tab_and_newline_quirk, r"\S^I/^J;", stack(" ", " ", Some('/')), ),
        (stack_flushes_pending_word, r"x\S1/2;y", word("x"), stack("1", "2", Some('/')), word("y"), ),
        (stack_text_after_terminator, r"\S1/2;up", stack("1", "2", Some('/')), word("up"), ),
        (unicode_escape, r"\U+0041bc", word("Abc"), ),
        (unicode_escape_eight_digits, r"\U+0001F600", word("\u{1F600}"), ),
        (unicode_escape_invalid_code_point, r"\U+DC00x", word(&format!("{PLACEHOLDER_GLYPH}x")), ),
        (unicode_escape_too_few_digits, r"\U+07b", word(r"\U+07b"), ),
        (unicode_escape_without_plus, r"\Uab", word(r"\Uab"), ),
        (mif_four_digit, r"\M+4142", word("A"), ),
        (mif_flushes_pending_word, r"ab\M+4142cd", word("ab"), word("Acd"), ),
        (mif_five_digit_placeholder, r"\m+18C40", word(&PLACEHOLDER_GLYPH.to_string()), ),
        (mif_without_plus, r"\M4142", word(r"\M4142"), ),
        (mif_without_digits, r"a\m+zz", word(r"a\m+zz"), ),
        (height_malformed_float, r"\H1..5;Text", word(".5;Text"), ),
        (height_with_no_number_consumes_terminator, r"\H;Text", word("Text"), ),
        (height_rewinds_lone_sign, r"\H-x", word("-x"), ),
        (oblique_command_consumed, r"\Q15;x", word("x"), ),
        (aci_command_consumed, r"\C1Red Text", word("Red"), Value::Space, word("Text"), ),
        (font_command_consumed, r"\fArial|b1|i0;abc", word("abc"), ),
        (font_command_without_terminator, r"\fArial|b1", ),
        (paragraph_command_consumed, r"\pi2,l4;x", word("x"), ),
    ];

    #[test]
    fn word_state_reflects_aci_command() {
        let tokens: Vec<Token> = Tokenizer::new(r"\C1Red Text").collect();
        assert_eq!(tokens[0].value, word("Red"));
        assert_eq!(tokens[0].state.color.aci(), Some(1));
        assert_eq!(tokens[1].state.color.aci(), Some(1));
        assert_eq!(tokens[2].state.color.aci(), Some(1));
    }

    #[test]
    fn aci_out_of_range_is_ignored() {
        let tokens: Vec<Token> = Tokenizer::new(r"\C257;x").collect();
        assert_eq!(tokens[0].value, word("x"));
        assert_eq!(tokens[0].state.color.aci(), Some(256));
    }

    #[test]
    fn rgb_command_masks_to_24_bits() {
        let tokens: Vec<Token> = Tokenizer::new(r"\c16843011;x").collect();
        // 16843011 = 0x01010203; the high byte is masked away.
        assert_eq!(tokens[0].state.color.rgb_value(), Some(0x010203));
        assert_eq!(tokens[0].state.color.aci(), None);
    }

    #[test]
    fn scope_exit_restores_color() {
        let tokens: Vec<Token> = Tokenizer::new(r"{\C1;Red} Normal").collect();
        assert_eq!(tokens[0].value, word("Red"));
        assert_eq!(tokens[0].state.color.aci(), Some(1));
        assert_eq!(tokens[1].value, Value::Space);
        assert_eq!(tokens[1].state.color.aci(), Some(256));
        assert_eq!(tokens[2].value, word("Normal"));
        assert_eq!(tokens[2].state.color.aci(), Some(256));
    }

    #[test]
    fn paragraph_alignment_survives_scope_exit() {
        let tokens: Vec<Token> = Tokenizer::new(r"{\pql;X} Y").collect();
        assert_eq!(tokens[0].state.paragraph.align, ParagraphAlignment::Left);
        let last = tokens.last().unwrap();
        assert_eq!(last.value, word("Y"));
        assert_eq!(last.state.paragraph.align, ParagraphAlignment::Left);
    }

    #[test]
    fn stroke_commands_track_continue_stroke() {
        let tokens: Vec<Token> = Tokenizer::new(r"\L\Oa\lb\oc").collect();
        assert_eq!(
            tokens[0].state.strokes,
            Strokes::UNDERLINE | Strokes::OVERLINE
        );
        assert!(tokens[0].state.continue_stroke);
        // Overline is still active after \l.
        assert_eq!(tokens[1].state.strokes, Strokes::OVERLINE);
        assert!(tokens[1].state.continue_stroke);
        assert!(tokens[2].state.strokes.is_empty());
        assert!(!tokens[2].state.continue_stroke);
    }

    #[test]
    fn alignment_command() {
        let tokens: Vec<Token> = Tokenizer::new(r"\A1;a\A9;b\A;c").collect();
        assert_eq!(tokens[0].state.line_alignment, LineAlignment::Middle);
        // A digit outside 0..=2 and a missing digit both reset to Bottom.
        assert_eq!(tokens[1].state.line_alignment, LineAlignment::Bottom);
        assert_eq!(tokens[2].state.line_alignment, LineAlignment::Bottom);
    }

    #[test]
    fn height_relative_suffix() {
        let tokens: Vec<Token> = Tokenizer::new(r"\H2.5x;a").collect();
        assert_eq!(tokens[0].state.cap_height, FactorValue::new(2.5, true));

        let tokens: Vec<Token> = Tokenizer::new(r"\W0.8;a").collect();
        assert_eq!(tokens[0].state.width_factor, FactorValue::new(0.8, false));
    }

    #[test]
    fn tracking_discards_sign() {
        let tokens: Vec<Token> = Tokenizer::new(r"\T-1.5;a").collect();
        assert_eq!(
            tokens[0].state.char_tracking_factor,
            FactorValue::new(1.5, false)
        );
    }

    #[test]
    fn oblique_keeps_sign() {
        let tokens: Vec<Token> = Tokenizer::new(r"\Q-15;a").collect();
        assert_eq!(tokens[0].state.oblique_angle, -15.0);
    }

    #[test]
    fn height_malformed_float_preserves_value() {
        let tokens: Vec<Token> = Tokenizer::new(r"\H1..5;Text").collect();
        assert_eq!(tokens[0].value, word(".5;Text"));
        assert_eq!(tokens[0].state.cap_height, FactorValue::new(1.0, false));
    }

    #[test]
    fn font_command_parses_options() {
        let tokens: Vec<Token> = Tokenizer::new(r"\fArial|b1|i1|c0|p34;x").collect();
        let font = &tokens[0].state.font;
        assert_eq!(font.family, "Arial");
        assert!(font.bold());
        assert!(font.italic());
    }

    #[test]
    fn font_command_resets_unspecified_fields() {
        let tokens: Vec<Token> = Tokenizer::new(r"\fArial|b1|i1;a\fSimplex;b").collect();
        let font = &tokens[1].state.font;
        assert_eq!(font.family, "Simplex");
        assert!(!font.bold());
        assert!(!font.italic());
    }

    #[test]
    fn paragraph_command_fields() {
        let tokens: Vec<Token> = Tokenizer::new(r"\pxi-2,l4,r1,qj,t1,c2,r3;x").collect();
        let paragraph = &tokens[0].state.paragraph;
        assert_eq!(paragraph.indent, -2.0);
        assert_eq!(paragraph.left, 4.0);
        assert_eq!(paragraph.right, 1.0);
        assert_eq!(paragraph.align, ParagraphAlignment::Justified);
        assert_eq!(
            paragraph.tabs,
            vec![TabStop::Plain(1.0), TabStop::Center(2.0), TabStop::Right(3.0)]
        );
    }

    #[test]
    fn paragraph_tabs_replaced_wholesale() {
        let tokens: Vec<Token> = Tokenizer::new(r"\pt1,2;a\pt;b").collect();
        assert_eq!(
            tokens[0].state.paragraph.tabs,
            vec![TabStop::Plain(1.0), TabStop::Plain(2.0)]
        );
        assert_eq!(tokens[1].state.paragraph.tabs, vec![]);
    }

    #[test]
    fn initial_state_is_used() {
        let mut initial = FormattingState::default();
        initial.font.family = "isocp".into();
        let tokens: Vec<Token> =
            Tokenizer::with_options("x", initial, Options::default()).collect();
        assert_eq!(tokens[0].state.font.family, "isocp");
    }

    #[test]
    fn yield_property_commands_reports_command_letter() {
        let options = Options {
            yield_property_commands: true,
            ..Options::default()
        };
        let tokens: Vec<Token> =
            Tokenizer::with_options(r"\C1;x", FormattingState::default(), options).collect();
        let Value::PropertiesChanged(report) = &tokens[0].value else {
            panic!("expected a PropertiesChanged token, got {:?}", tokens[0].value);
        };
        assert_eq!(report.command.as_deref(), Some("C"));
        assert_eq!(report.depth, 0);
        assert_eq!(report.changes.aci, Some(Some(1)));
        assert_eq!(tokens[1].value, word("x"));
    }

    #[test]
    fn commands_without_effect_are_silent() {
        let options = Options {
            yield_property_commands: true,
            ..Options::default()
        };
        // ACI 256 is already the default.
        let tokens: Vec<Token> =
            Tokenizer::with_options(r"\C256;x", FormattingState::default(), options).collect();
        assert_eq!(tokens[0].value, word("x"));
        assert_eq!(tokens.len(), 1);
    }

    #[test]
    fn scope_exit_reports_the_restore() {
        let options = Options {
            yield_property_commands: true,
            ..Options::default()
        };
        let tokens: Vec<Token> =
            Tokenizer::with_options(r"{\C1;a}b", FormattingState::default(), options).collect();
        let Value::PropertiesChanged(report) = &tokens[2].value else {
            panic!("expected a PropertiesChanged token, got {:?}", tokens[2].value);
        };
        assert_eq!(report.command, None);
        assert_eq!(report.depth, 0);
        assert_eq!(report.changes.aci, Some(Some(256)));
        assert_eq!(tokens[3].value, word("b"));
    }

    #[test]
    fn scope_exit_without_changes_is_silent() {
        let options = Options {
            yield_property_commands: true,
            ..Options::default()
        };
        let tokens: Vec<Token> =
            Tokenizer::with_options("{a}b", FormattingState::default(), options).collect();
        assert_eq!(
            tokens.iter().map(|t| t.value.clone()).collect::<Vec<_>>(),
            vec![word("a"), word("b")]
        );
    }

    #[test]
    fn paragraph_reset_after_new_paragraph() {
        let options = Options {
            reset_paragraph_parameters: true,
            ..Options::default()
        };
        let tokens: Vec<Token> =
            Tokenizer::with_options(r"\pqc;a\Pb", FormattingState::default(), options).collect();
        assert_eq!(tokens[0].state.paragraph.align, ParagraphAlignment::Center);
        // The NewParagraph token still carries the pre-reset properties.
        assert_eq!(tokens[1].value, Value::NewParagraph);
        assert_eq!(tokens[1].state.paragraph.align, ParagraphAlignment::Center);
        assert_eq!(tokens[2].value, word("b"));
        assert_eq!(tokens[2].state.paragraph.align, ParagraphAlignment::Default);
    }

    #[test]
    fn paragraph_reset_reports_the_diff() {
        let options = Options {
            yield_property_commands: true,
            reset_paragraph_parameters: true,
            ..Options::default()
        };
        let tokens: Vec<Token> =
            Tokenizer::with_options(r"\pqc;a\Pb", FormattingState::default(), options).collect();
        // PropertiesChanged (\p), Word, NewParagraph, PropertiesChanged (reset), Word.
        assert_eq!(tokens[2].value, Value::NewParagraph);
        let Value::PropertiesChanged(report) = &tokens[3].value else {
            panic!("expected a PropertiesChanged token, got {:?}", tokens[3].value);
        };
        assert_eq!(report.command, None);
        let paragraph = report.changes.paragraph.as_ref().unwrap();
        assert_eq!(paragraph.align, Some(ParagraphAlignment::Default));
        assert_eq!(tokens[4].value, word("b"));
    }

    #[test]
    fn custom_mif_decoder() {
        fn decoder(code: &str) -> char {
            match code {
                "4142" => '!',
                _ => '?',
            }
        }
        let options = Options {
            mif_decoder: Some(decoder),
            ..Options::default()
        };
        let tokens: Vec<Token> =
            Tokenizer::with_options(r"\M+4142", FormattingState::default(), options).collect();
        assert_eq!(tokens[0].value, word("!"));
    }

    #[test]
    fn fixed_mif_code_length() {
        let options = Options {
            mif_code_length: MifCodeLength::Four,
            ..Options::default()
        };
        // Five hex digits: four are the code, the fifth is literal text.
        let tokens: Vec<Token> =
            Tokenizer::with_options(r"\M+41421", FormattingState::default(), options).collect();
        assert_eq!(tokens[0].value, word("A1"));
    }

    macro_rules! scan_float_tests {
        ($( ( $name: ident, $input: expr, $want: expr, $tail: expr ), )+) => {
            $(
            #[test]
            fn $name() {
                let mut cursor = Cursor::new($input);
                assert_eq!(scan_float(&mut cursor), $want);
                assert_eq!(cursor.tail(), $tail);
            }
            )+
        };
    }

    scan_float_tests![
        (float_integer, "15;", Some(15.0), ";"),
        (float_fraction, "0.25x", Some(0.25), "x"),
        (float_leading_dot, ".5", Some(0.5), ""),
        (float_trailing_dot, "1.", Some(1.0), ""),
        (float_double_dot, "1..5", Some(1.0), ".5"),
        (float_signed, "-2.5", Some(-2.5), ""),
        (float_plus_sign, "+.5", Some(0.5), ""),
        (float_exponent, "2e3", Some(2000.0), ""),
        (float_signed_exponent, "1.5E-2", Some(0.015), ""),
        (float_incomplete_exponent, "1ex", Some(1.0), "ex"),
        (float_bare_dot, ".x", None, ".x"),
        (float_sign_only_rewinds, "-x", None, "-x"),
        (float_empty, "", None, ""),
        (float_letters, "abc", None, "abc"),
    ];

    #[test]
    fn scan_unsigned_saturates() {
        let mut cursor = Cursor::new("99999999999999999999999999;");
        assert_eq!(scan_unsigned(&mut cursor), Some(u64::MAX));
        assert_eq!(cursor.tail(), ";");
    }
}
