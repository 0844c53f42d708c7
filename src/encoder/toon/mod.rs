//! TOON: a line-oriented, indentation-based rendering of JSON values.
//!
//! ```text
//! project:
//!   id: "12"
//!   name: Website
//! tags[2]: web,design
//! tasks[2]{id,title,closed}:
//!   "1",Fix login,false
//!   "2",Ship beta,true
//! comments[1]:
//!   - id: "7"
//!     author:
//!       name: Ana
//! ```
//!
//! Objects nest by two-space indentation. Arrays declare their length in brackets;
//! arrays of objects that share one flat key set declare the keys once and list one
//! row per element. Other arrays of objects are written as `- ` items whose first
//! field shares the marker line.
//!
//! Strings that could be read back as something else (numbers, booleans, `null`),
//! that carry delimiters or structure characters, or that are empty or padded are
//! written as JSON string literals.

mod decode;
mod encode;

pub use decode::{DecodeError, decode};
pub use encode::ToonEncoder;

pub(crate) const INDENT: &str = "  ";
