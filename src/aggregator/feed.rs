use tracing::{debug, warn};

use super::classify::{MilestonePredicate, facets};
use crate::filters::{FilterExpr, TimeWindow, apply_filters};
use crate::models::{FeedEntry, FeedSummary, RawResource, RecentActivityFeed};
use crate::parsers::parse_activities;

/// Feed length when the caller does not ask for one
pub const DEFAULT_FEED_RESULTS: usize = 100;

/// Page-size ceiling of the activities endpoint
pub const MAX_FEED_RESULTS: usize = 200;

/// Resolve the requested feed length, clamping to [`MAX_FEED_RESULTS`]
pub fn feed_limit(requested: Option<usize>) -> usize {
    match requested {
        None => DEFAULT_FEED_RESULTS,
        Some(n) if n > MAX_FEED_RESULTS => {
            warn!(requested = n, max = MAX_FEED_RESULTS, "max_results exceeds limit, clamping");
            MAX_FEED_RESULTS
        }
        Some(n) => n,
    }
}

/// Build a cross-task activity feed, newest first
///
/// The summary counts every record that passed the window and filter; the entries are
/// then truncated to `max_results`.
pub fn build_feed<P>(
    activities: &[RawResource],
    window: &TimeWindow,
    filter: &FilterExpr,
    max_results: usize,
    milestones: &P,
) -> RecentActivityFeed
where
    P: MilestonePredicate + ?Sized,
{
    let parsed = parse_activities(activities);
    let mut records = apply_filters(parsed.records, window, filter);
    records.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));

    let mut summary = FeedSummary {
        total: records.len(),
        malformed: parsed.malformed.len(),
        ..FeedSummary::default()
    };
    for record in &records {
        *summary.by_type.entry(record.kind().to_string()).or_default() += 1;
        if let Some(event) = &record.event_type {
            *summary.by_event.entry(event.clone()).or_default() += 1;
        }
        if let Some(item_type) = &record.item_type {
            *summary.by_item_type.entry(item_type.clone()).or_default() += 1;
        }
    }

    records.truncate(max_results);
    summary.returned = records.len();

    let activities: Vec<FeedEntry> = records
        .into_iter()
        .map(|record| {
            let categories = facets(&record, milestones).categories();
            FeedEntry { record, categories }
        })
        .collect();

    debug!(total = summary.total, returned = summary.returned, "Built activity feed");

    RecentActivityFeed { activities, summary, window: window.info() }
}
