//! Data models for Productive responses and the structures derived from them.
//!
//! - [`RawResource`] / [`Payload`] - JSON:API resources as delivered by the service
//! - [`IncludedIndex`] - call-scoped lookup of side-loaded resources
//! - [`ActivityRecord`] - parsed activity with a kind-specific [`ActivityPayload`]
//! - [`TaskHistory`] / [`RecentActivityFeed`] - aggregation results
//! - [`SearchHit`] - normalized quick-search result
//! - [`Envelope`] - the `{data, meta, included, webapp_url}` wrapper returned to callers
//!
//! Raw models use serde with custom deserializers (ids, timestamps, ordered
//! relationships) from the `parsers::deserializers` module.

pub mod activity;
pub mod resource;
pub mod search;

pub use activity::{
    ActivityKind, ActivityPayload, ActivityRecord, ActivitySummary, AssignmentChange, Category,
    FeedEntry, FeedSummary, FieldChange, Milestone, RecentActivityFeed, StatusChange, TaskHistory,
    WindowInfo,
};
pub use resource::{
    CleanResource, Envelope, IncludedIndex, Payload, PrimaryData, RawResource, Relationship,
    RelationshipData, ResourceRef,
};
pub use search::SearchHit;
