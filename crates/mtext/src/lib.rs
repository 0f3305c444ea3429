//! # mtext: a tokenizer for AutoCAD MTEXT content.
//!
//! MTEXT content strings embed inline formatting codes — color, font,
//! height, stacked fractions, paragraph alignment, legacy multi-byte and
//! Unicode escapes — inside plain text. This crate tokenizes such a
//! string into a flat, ordered sequence of typed tokens, each carrying a
//! complete snapshot of the formatting state active at that point.
//!
//! ```
//! use mtext::{Tokenizer, Value};
//!
//! let mut tokens = Tokenizer::new(r"{\C1;Red} Normal");
//!
//! let red = tokens.next().unwrap();
//! assert_eq!(red.value, Value::Word("Red".into()));
//! assert_eq!(red.state.color.aci(), Some(1));
//!
//! let space = tokens.next().unwrap();
//! assert_eq!(space.value, Value::Space);
//! // The color is restored when the `{...}` scope ends.
//! assert_eq!(space.state.color.aci(), Some(256));
//! ```
//!
//! Tokenization never fails: malformed escapes degrade to literal text
//! and the sequence always runs to the end of the input. The only
//! fallible operation in the crate is assigning an out-of-range AutoCAD
//! Color Index directly on a [`Color`].

pub mod color;
pub mod cursor;
pub mod mif;
pub mod scope;
pub mod state;
pub mod strings;
pub mod token;
pub mod tokenizer;

pub use color::Color;
pub use state::FormattingState;
pub use token::{Token, Value};
pub use tokenizer::{Options, Tokenizer};
