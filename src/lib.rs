//! Productive Digest - compact, LLM-ready views of Productive.io data
//!
//! This library turns JSON:API payloads from the Productive project-management
//! service into small, predictable structures and encodes them for language-model
//! consumers. It provides:
//!
//! - A resource projector that strips bookkeeping fields, empties and markup, and
//!   embeds side-loaded relationships
//! - An activity classifier and aggregator producing task histories and windowed
//!   activity feeds
//! - A search normalizer that gives every quick-search hit the same shape
//! - TOON and JSON encoders, with JSON as the fallback for shapes TOON cannot express
//! - Read tools composing a [`Fetcher`] with the pipeline
//!
//! # Example
//!
//! ```
//! use productive_digest::{Projector, View, WebappUrls, encode, OutputFormat, parse_payload};
//!
//! let payload = parse_payload(r#"{
//!     "data": {"id": "7", "type": "tasks",
//!              "attributes": {"title": "Fix login", "email_key": "x", "due_date": null}}
//! }"#)?;
//! let projector = Projector::new(WebappUrls::new("https://app.productive.io", "acme"));
//! let envelope = projector.project_payload(&payload, View::Full);
//!
//! let text = encode(&envelope, OutputFormat::Toon)?;
//! assert!(text.contains("title: Fix login"));
//! assert!(!text.contains("email_key"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod aggregator;
pub mod cli;
pub mod client;
pub mod encoder;
pub mod filters;
pub mod models;
pub mod parsers;
pub mod projector;
pub mod search;
pub mod tools;
pub mod utils;

// Re-export commonly used types
pub use aggregator::{Aggregator, KeywordMilestones, MilestonePredicate};
pub use client::{FetchError, FetchRequest, Fetcher, FixtureFetcher};
pub use encoder::{EncodeError, Encoder, JsonEncoder, OutputFormat, ToonEncoder, encode};
pub use filters::{FilterExpr, FilterField, TimeWindow};
pub use models::{ActivityRecord, Envelope, Payload, RawResource, SearchHit, TaskHistory};
pub use parsers::{parse_payload, parse_payload_value};
pub use projector::{Projector, View, WebappUrls};
pub use tools::{ToolError, Tools};
pub use utils::Config;
