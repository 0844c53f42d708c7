use super::ast::{FieldFilter, FilterExpr, FilterField};
use super::window::TimeWindow;
use crate::models::{ActivityKind, ActivityRecord};

/// Keep the records inside `window` that satisfy every filter in `filter`
///
/// Filter logic is conjunctive: each given field must match. Id fields compare
/// exactly, item type and event compare case-insensitively.
pub fn apply_filters(
    records: Vec<ActivityRecord>,
    window: &TimeWindow,
    filter: &FilterExpr,
) -> Vec<ActivityRecord> {
    records
        .into_iter()
        .filter(|record| window.contains(record.occurred_at) && evaluate_filter(record, filter))
        .collect()
}

/// Evaluate filter expression against a single record
fn evaluate_filter(record: &ActivityRecord, filter: &FilterExpr) -> bool {
    filter.filters.iter().all(|f| evaluate_field_filter(record, f))
}

/// Evaluate single field filter against record
fn evaluate_field_filter(record: &ActivityRecord, filter: &FieldFilter) -> bool {
    let value = filter.value.as_str();
    match filter.field {
        FilterField::Task => record.task_id.as_deref() == Some(value),
        FilterField::Project => record.project_id.as_deref() == Some(value),
        FilterField::User => record.actor_id.as_deref() == Some(value),
        FilterField::ActivityType => match_kind(record, value),
        FilterField::ItemType => eq_ignore_case(record.item_type.as_deref(), value),
        FilterField::Event => eq_ignore_case(record.event_type.as_deref(), value),
    }
}

/// Unknown activity types match nothing
fn match_kind(record: &ActivityRecord, value: &str) -> bool {
    value.parse::<ActivityKind>().map(|kind| kind == record.kind()).unwrap_or(false)
}

fn eq_ignore_case(field: Option<&str>, value: &str) -> bool {
    field.is_some_and(|f| f.eq_ignore_ascii_case(value))
}
