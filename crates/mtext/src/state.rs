//! The formatting state carried by every token.
//!
//! [`FormattingState`] aggregates everything the inline formatting codes
//! can change: stroke decorations, color, font face, the three scaling
//! factors, the oblique angle, line alignment and paragraph properties.
//! The tokenizer keeps a stack of these (one per `{` scope) and freezes a
//! copy into each emitted token, so all the types here are owned values
//! and a [`Clone`] is always a deep, independent copy.

use crate::color::Color;

bitflags::bitflags! {
    /// Stroke decorations as a bitfield.
    ///
    /// Combine with bitwise OR: `Strokes::UNDERLINE | Strokes::OVERLINE`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Strokes: u8 {
        const UNDERLINE = 1 << 0;
        const OVERLINE = 1 << 1;
        const STRIKE_THROUGH = 1 << 2;
    }
}

// Strokes serialize as their raw bits.
#[cfg(feature = "serde")]
impl serde::Serialize for Strokes {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.bits())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Strokes {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Strokes, D::Error> {
        let bits = serde::Deserialize::deserialize(deserializer)?;
        Ok(Strokes::from_bits_truncate(bits))
    }
}

/// Vertical alignment of characters relative to the text line.
///
/// Set by the `\A` command; the default is [`LineAlignment::Bottom`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineAlignment {
    #[default]
    Bottom,
    Middle,
    Top,
}

/// A scaling factor that is either absolute or relative to the current
/// value.
///
/// The relative form comes from the `x` suffix of the `\H`, `\W` and `\T`
/// commands (`\H2x` means "twice the current height"). The stored value
/// is always non-negative: assigning discards the sign, it never fails.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FactorValue {
    value: f64,
    relative: bool,
}

impl Default for FactorValue {
    fn default() -> Self {
        FactorValue {
            value: 1.0,
            relative: false,
        }
    }
}

impl FactorValue {
    /// Create a factor; the sign of `value` is discarded.
    pub fn new(value: f64, relative: bool) -> FactorValue {
        FactorValue {
            value: value.abs(),
            relative,
        }
    }

    /// The (non-negative) factor value.
    #[inline]
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Assign a new value; the sign is discarded.
    pub fn set_value(&mut self, value: f64) {
        self.value = value.abs();
    }

    /// True if the factor is relative to the current value rather than
    /// absolute.
    #[inline]
    pub fn is_relative(&self) -> bool {
        self.relative
    }

    pub fn set_relative(&mut self, relative: bool) {
        self.relative = relative;
    }
}

/// Regular or italic.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontStyle {
    #[default]
    Regular,
    Italic,
}

/// The normal font weight.
pub const NORMAL_WEIGHT: u16 = 400;
/// The weight at and above which a font face counts as bold.
pub const BOLD_WEIGHT: u16 = 700;

/// A font face reference: family name, style and weight.
///
/// `bold` and `italic` are views derived from the weight and style
/// fields; mutating a view mutates the underlying field.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontFace {
    pub family: String,
    pub style: FontStyle,
    pub weight: u16,
}

impl Default for FontFace {
    fn default() -> Self {
        FontFace {
            family: String::new(),
            style: FontStyle::Regular,
            weight: NORMAL_WEIGHT,
        }
    }
}

impl FontFace {
    #[inline]
    pub fn italic(&self) -> bool {
        self.style == FontStyle::Italic
    }

    pub fn set_italic(&mut self, italic: bool) {
        self.style = match italic {
            true => FontStyle::Italic,
            false => FontStyle::Regular,
        };
    }

    #[inline]
    pub fn bold(&self) -> bool {
        self.weight >= BOLD_WEIGHT
    }

    pub fn set_bold(&mut self, bold: bool) {
        self.weight = match bold {
            true => BOLD_WEIGHT,
            false => NORMAL_WEIGHT,
        };
    }
}

/// Horizontal alignment of a paragraph, from the `\pq<char>` code.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParagraphAlignment {
    #[default]
    Default,
    Left,
    Right,
    Center,
    Justified,
    Distributed,
}

/// A single tab stop from the `\pt` code.
///
/// A bare number is a plain (left) tab; an `r` or `c` prefix makes it a
/// right or center tab.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TabStop {
    Plain(f64),
    Right(f64),
    Center(f64),
}

/// Paragraph-level formatting from the `\p` command.
///
/// Unlike every other attribute, paragraph properties are not scoped by
/// braces: when a scope is popped they propagate to the parent (see
/// [`ScopeStack::pop`](crate::scope::ScopeStack::pop)).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParagraphProperties {
    /// First-line indent.
    pub indent: f64,
    /// Left margin.
    pub left: f64,
    /// Right margin.
    pub right: f64,
    pub align: ParagraphAlignment,
    /// Tab stops, in the order given. Replaced wholesale whenever a `\p`
    /// expression carries a `t` section.
    pub tabs: Vec<TabStop>,
}

/// The complete formatting state at one point of the content.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FormattingState {
    pub strokes: Strokes,
    /// Whether stroke decorations continue across token boundaries.
    /// Recomputed from `strokes` by every stroke command.
    pub continue_stroke: bool,
    pub color: Color,
    pub line_alignment: LineAlignment,
    pub font: FontFace,
    pub cap_height: FactorValue,
    pub width_factor: FactorValue,
    pub char_tracking_factor: FactorValue,
    /// Oblique angle in degrees. The sign is preserved.
    pub oblique_angle: f64,
    pub paragraph: ParagraphProperties,
}

impl FormattingState {
    /// True if any stroke decoration is active.
    #[inline]
    pub fn has_any_stroke(&self) -> bool {
        !self.strokes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factor_discards_sign() {
        let factor = FactorValue::new(-2.5, true);
        assert_eq!(factor.value(), 2.5);
        assert!(factor.is_relative());

        let mut factor = FactorValue::default();
        factor.set_value(-0.25);
        assert_eq!(factor.value(), 0.25);
        assert!(!factor.is_relative());
    }

    #[test]
    fn font_face_views_mutate_fields() {
        let mut font = FontFace::default();
        assert!(!font.bold());
        assert!(!font.italic());

        font.set_bold(true);
        assert_eq!(font.weight, BOLD_WEIGHT);
        font.set_italic(true);
        assert_eq!(font.style, FontStyle::Italic);

        font.weight = 900;
        assert!(font.bold());
        font.set_bold(false);
        assert_eq!(font.weight, NORMAL_WEIGHT);
    }

    #[test]
    fn default_state() {
        let state = FormattingState::default();
        assert!(state.strokes.is_empty());
        assert!(!state.continue_stroke);
        assert_eq!(state.color.aci(), Some(crate::color::BY_LAYER));
        assert_eq!(state.line_alignment, LineAlignment::Bottom);
        assert_eq!(state.cap_height, FactorValue::new(1.0, false));
        assert_eq!(state.width_factor, FactorValue::new(1.0, false));
        assert_eq!(state.char_tracking_factor, FactorValue::new(1.0, false));
        assert_eq!(state.oblique_angle, 0.0);
        assert_eq!(state.paragraph, ParagraphProperties::default());
    }

    #[test]
    fn clones_are_independent() {
        let mut original = FormattingState::default();
        original.font.family = "isocp".into();
        original.paragraph.tabs = vec![TabStop::Plain(4.0)];

        let mut copy = original.clone();
        copy.font.family = "txt".into();
        copy.paragraph.tabs.push(TabStop::Right(8.0));
        copy.color.set_rgb(Some((1, 2, 3)));

        assert_eq!(original.font.family, "isocp");
        assert_eq!(original.paragraph.tabs, vec![TabStop::Plain(4.0)]);
        assert_eq!(original.color.aci(), Some(crate::color::BY_LAYER));
    }

    #[test]
    fn has_any_stroke() {
        let mut state = FormattingState::default();
        assert!(!state.has_any_stroke());
        state.strokes |= Strokes::OVERLINE;
        assert!(state.has_any_stroke());
    }
}
