use chrono::{DateTime, Duration, SecondsFormat, Utc};
use tracing::warn;

use crate::models::WindowInfo;

/// Largest look-back accepted, one year
pub const DEFAULT_MAX_HOURS: u32 = 8760;

/// Half-open time range `[since, until)` ending at the moment of the request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub since: DateTime<Utc>,
    pub until: DateTime<Utc>,
    pub hours: u32,
}

impl TimeWindow {
    /// Window covering the `hours` before `until`; `hours` above `max_hours` is clamped
    pub fn ending_at(until: DateTime<Utc>, hours: u32, max_hours: u32) -> Self {
        let clamped = hours.min(max_hours);
        if clamped != hours {
            warn!(requested = hours, max = max_hours, "Look-back window clamped");
        }
        Self { since: until - Duration::hours(i64::from(clamped)), until, hours: clamped }
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.since <= at && at < self.until
    }

    /// Start of the window as an RFC3339 UTC string
    pub fn cutoff(&self) -> String {
        self.since.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    pub fn info(&self) -> WindowInfo {
        WindowInfo { since: self.since, until: self.until, hours: self.hours }
    }
}
