//! Parsers for Productive JSON:API responses and activity records
//!
//! # Error Handling Strategy
//!
//! Payload parsing is all-or-nothing: a response whose primary data does not have the
//! JSON:API shape is rejected, so the caller never sees half a response.
//!
//! Activity parsing follows a **graceful degradation** approach:
//!
//! - **Individual record failures**: an activity without a usable timestamp cannot be
//!   placed on a timeline. It is logged, skipped and counted as malformed; the rest of
//!   the batch is still aggregated.
//!
//! - **No failure threshold**: a batch where every record is malformed yields an empty
//!   history with a non-zero `malformed` count, never an error.

pub mod activity;
pub mod deserializers;
pub mod payload;

pub use activity::{MalformedActivity, ParsedActivities, parse_activities, parse_activity};
pub use payload::{parse_payload, parse_payload_value};
