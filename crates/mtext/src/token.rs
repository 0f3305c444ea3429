//! The token types produced by the tokenizer.

use crate::state::{
    FactorValue, FontFace, FormattingState, LineAlignment, ParagraphAlignment,
    ParagraphProperties, Strokes, TabStop,
};

/// A stacked (fraction) expression from the `\S` command.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stacking {
    pub numerator: String,
    pub denominator: String,
    /// The divider character (`/`, `#` or `^`), or [`None`] if the
    /// expression had no divider.
    pub divider: Option<char>,
}

/// Paragraph fields that differ between two states.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParagraphChanges {
    pub indent: Option<f64>,
    pub left: Option<f64>,
    pub right: Option<f64>,
    pub align: Option<ParagraphAlignment>,
    pub tabs: Option<Vec<TabStop>>,
}

impl ParagraphChanges {
    /// The fields of `after` that differ from `before`, or [`None`] if
    /// the paragraph properties are equal.
    pub fn between(
        before: &ParagraphProperties,
        after: &ParagraphProperties,
    ) -> Option<ParagraphChanges> {
        let changes = ParagraphChanges {
            indent: (before.indent != after.indent).then_some(after.indent),
            left: (before.left != after.left).then_some(after.left),
            right: (before.right != after.right).then_some(after.right),
            align: (before.align != after.align).then_some(after.align),
            tabs: (before.tabs != after.tabs).then(|| after.tabs.clone()),
        };
        (changes != ParagraphChanges::default()).then_some(changes)
    }
}

/// Formatting fields that differ between two states.
///
/// Each set field holds the new value. The ACI and RGB entries are
/// doubly optional because "became unset" is itself a change.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StateChanges {
    pub strokes: Option<Strokes>,
    pub aci: Option<Option<u16>>,
    pub rgb: Option<Option<u32>>,
    pub line_alignment: Option<LineAlignment>,
    pub font: Option<FontFace>,
    pub cap_height: Option<FactorValue>,
    pub width_factor: Option<FactorValue>,
    pub char_tracking_factor: Option<FactorValue>,
    pub oblique_angle: Option<f64>,
    pub paragraph: Option<ParagraphChanges>,
}

impl StateChanges {
    /// Field-by-field diff of `after` against `before`.
    pub fn between(before: &FormattingState, after: &FormattingState) -> StateChanges {
        StateChanges {
            strokes: (before.strokes != after.strokes).then_some(after.strokes),
            aci: (before.color.aci() != after.color.aci()).then(|| after.color.aci()),
            rgb: (before.color.rgb_value() != after.color.rgb_value())
                .then(|| after.color.rgb_value()),
            line_alignment: (before.line_alignment != after.line_alignment)
                .then_some(after.line_alignment),
            font: (before.font != after.font).then(|| after.font.clone()),
            cap_height: (before.cap_height != after.cap_height).then_some(after.cap_height),
            width_factor: (before.width_factor != after.width_factor)
                .then_some(after.width_factor),
            char_tracking_factor: (before.char_tracking_factor != after.char_tracking_factor)
                .then_some(after.char_tracking_factor),
            oblique_angle: (before.oblique_angle != after.oblique_angle)
                .then_some(after.oblique_angle),
            paragraph: ParagraphChanges::between(&before.paragraph, &after.paragraph),
        }
    }

    /// True if no field differs.
    pub fn is_empty(&self) -> bool {
        *self == StateChanges::default()
    }
}

/// Payload of a [`Value::PropertiesChanged`] token.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ChangedProperties {
    /// The letter of the command that caused the change, or [`None`] for
    /// a scope exit or a paragraph reset.
    pub command: Option<String>,
    pub changes: StateChanges,
    /// Scope depth at the point the change took effect.
    pub depth: usize,
}

/// The value of a token.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A run of visible characters without spaces.
    Word(String),
    /// A stacked fraction from `\S`.
    Stack(Stacking),
    Space,
    /// `\~`
    NonBreakingSpace,
    Tab,
    /// `\P`, a literal newline, or the caret code `^J`.
    NewParagraph,
    /// `\N`
    NewColumn,
    /// `\X`
    WrapAtDimLine,
    /// State change report; only produced when
    /// [`Options::yield_property_commands`](crate::tokenizer::Options::yield_property_commands)
    /// is enabled.
    PropertiesChanged(ChangedProperties),
}

/// A token: a value plus the formatting state frozen at the point the
/// token was produced.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct Token {
    pub value: Value,
    pub state: FormattingState,
}

impl Token {
    pub fn new(value: Value, state: FormattingState) -> Token {
        Token { value, state }
    }
}

// Equality ignores the state snapshot so that token sequences can be
// compared by value; inspect `state` directly where it matters.
impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_changes_between_equal_states() {
        let state = FormattingState::default();
        assert!(StateChanges::between(&state, &state).is_empty());
    }

    #[test]
    fn color_change_reports_both_fields() {
        let before = FormattingState::default();
        let mut after = before.clone();
        after.color.set_rgb(Some((1, 2, 3)));

        let changes = StateChanges::between(&before, &after);
        assert_eq!(changes.aci, Some(None));
        assert_eq!(changes.rgb, Some(Some(0x010203)));
        assert_eq!(changes.strokes, None);
        assert!(!changes.is_empty());
    }

    #[test]
    fn paragraph_sub_diff() {
        let before = FormattingState::default();
        let mut after = before.clone();
        after.paragraph.align = ParagraphAlignment::Justified;
        after.paragraph.tabs = vec![TabStop::Center(2.0)];

        let changes = StateChanges::between(&before, &after);
        let paragraph = changes.paragraph.unwrap();
        assert_eq!(paragraph.align, Some(ParagraphAlignment::Justified));
        assert_eq!(paragraph.tabs, Some(vec![TabStop::Center(2.0)]));
        assert_eq!(paragraph.indent, None);
    }

    #[test]
    fn token_equality_ignores_state() {
        let mut state = FormattingState::default();
        let a = Token::new(Value::Space, state.clone());
        state.oblique_angle = 30.0;
        let b = Token::new(Value::Space, state);
        assert_eq!(a, b);
        assert_ne!(a, Token::new(Value::Tab, FormattingState::default()));
    }
}
