//! Resource projection: from raw JSON:API resources to cleaned, LLM-friendly ones.
//!
//! - [`rules`] - per-type denylists, rich-text fields and lightweight field sets
//! - [`markup`] - markup stripping for rich text and search highlights
//! - [`urls`] - web-app URL templates
//! - [`project`] - the [`Projector`] itself plus empty-value and meta cleaning
//!
//! Everything here is a pure function of its inputs.

pub mod markup;
pub mod project;
pub mod rules;
pub mod urls;

pub use markup::strip_markup;
pub use project::{Projector, View, clean_meta, prune_empty, sanitize_attributes};
pub use urls::WebappUrls;
