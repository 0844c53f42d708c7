//! Activity classification and aggregation
//!
//! Raw activities are parsed, windowed, filtered and classified into task histories
//! (oldest first, read as a timeline) or recent-activity feeds (newest first).
//!
//! # Error Handling Strategy
//!
//! Aggregation never fails. Malformed activities are skipped and reported through the
//! `malformed` counter of the summary; an empty or fully filtered input yields an
//! empty history or feed.

pub mod classify;
pub mod feed;
pub mod history;

pub use classify::{
    ClassifiedActivity, Facets, KeywordMilestones, MilestonePredicate, classify, facets,
};
pub use feed::{DEFAULT_FEED_RESULTS, MAX_FEED_RESULTS, build_feed, feed_limit};
pub use history::build_task_history;

use crate::filters::{FilterExpr, TimeWindow};
use crate::models::{RawResource, RecentActivityFeed, TaskHistory};

/// Aggregation entry point carrying the milestone predicate
#[derive(Debug, Clone, Default)]
pub struct Aggregator<P = KeywordMilestones> {
    milestones: P,
}

impl<P: MilestonePredicate> Aggregator<P> {
    pub fn new(milestones: P) -> Self {
        Self { milestones }
    }

    pub fn task_history(
        &self,
        task_id: &str,
        activities: &[RawResource],
        window: &TimeWindow,
        filter: &FilterExpr,
    ) -> TaskHistory {
        build_task_history(task_id, activities, window, filter, &self.milestones)
    }

    pub fn recent_feed(
        &self,
        activities: &[RawResource],
        window: &TimeWindow,
        filter: &FilterExpr,
        max_results: usize,
    ) -> RecentActivityFeed {
        build_feed(activities, window, filter, max_results, &self.milestones)
    }
}
