//! Quick-search result normalization
//!
//! Search hits arrive with highlight markup and a loose, per-type attribute set; they
//! leave as [`SearchHit`](crate::models::SearchHit)s with a uniform shape and a web
//! app link.

pub mod normalize;

pub use normalize::{normalize, normalize_all};
