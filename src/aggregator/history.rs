use tracing::debug;

use super::classify::{MilestonePredicate, facets};
use crate::filters::{FilterExpr, TimeWindow, apply_filters};
use crate::models::{
    ActivityKind, ActivitySummary, AssignmentChange, Milestone, RawResource, StatusChange,
    TaskHistory,
};
use crate::parsers::parse_activities;

/// Build the timeline of one task from its raw activities
///
/// Only records inside `window` that satisfy `filter` are used, and the summary counts
/// that filtered set. Histories are ascending by time; records sharing a timestamp keep
/// their input order. A record with both a status and an assignment delta lands in both
/// histories and bumps both counters.
pub fn build_task_history<P>(
    task_id: &str,
    activities: &[RawResource],
    window: &TimeWindow,
    filter: &FilterExpr,
    milestones: &P,
) -> TaskHistory
where
    P: MilestonePredicate + ?Sized,
{
    let parsed = parse_activities(activities);
    let mut records = apply_filters(parsed.records, window, filter);
    records.sort_by_key(|record| record.occurred_at);

    let mut history = TaskHistory::empty(task_id);
    let summary = &mut history.activity_summary;
    summary.total = records.len();
    summary.malformed = parsed.malformed.len();

    for record in &records {
        match record.kind() {
            ActivityKind::Comment => summary.comments += 1,
            ActivityKind::Changeset => summary.changes += 1,
            ActivityKind::Email => {}
        }

        let facets = facets(record, milestones);
        if let Some(change) = facets.status {
            summary.status_updates += 1;
            history.status_history.push(StatusChange {
                from: change.from,
                to: change.to,
                changed_at: record.occurred_at,
            });
        }
        if let Some(change) = facets.assignment {
            summary.assignments += 1;
            history
                .assignment_history
                .push(AssignmentChange { assigned_to: change.to, changed_at: record.occurred_at });
        }
        if let Some(description) = facets.milestone {
            summary.milestones += 1;
            history.milestones.push(Milestone {
                description,
                occurred_at: record.occurred_at,
                completed_by: record.actor_name.clone(),
            });
        }
    }

    debug!(
        task_id,
        activities = records.len(),
        status_changes = history.status_history.len(),
        assignments = history.assignment_history.len(),
        milestones = history.milestones.len(),
        "Built task history"
    );

    history
}
