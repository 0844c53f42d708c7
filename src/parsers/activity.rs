use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::deserializers::parse_timestamp;
use crate::models::{ActivityKind, ActivityPayload, ActivityRecord, FieldChange, RawResource};
use crate::projector::markup::strip_markup;

/// An activity that cannot be placed on a timeline
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed activity {id}: {reason}")]
pub struct MalformedActivity {
    pub id: String,
    pub reason: String,
}

/// Result of parsing a batch of activities: good records plus the ones skipped
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedActivities {
    pub records: Vec<ActivityRecord>,
    pub malformed: Vec<MalformedActivity>,
}

const TIMESTAMP_FIELDS: &[&str] = &["occurred_at", "created_at"];
const BODY_FIELDS: &[&str] = &["body", "comment_body"];

/// Parse one raw activity resource into an [`ActivityRecord`]
///
/// The activity kind comes from the `type` attribute (1/2/3 or a name). When it is
/// missing the kind is inferred: any change means a changeset, a body alone means a
/// comment.
pub fn parse_activity(raw: &RawResource) -> Result<ActivityRecord, MalformedActivity> {
    let attributes = &raw.attributes;

    let occurred_at = TIMESTAMP_FIELDS
        .iter()
        .find_map(|field| attributes.get(*field))
        .ok_or_else(|| malformed(raw, "missing timestamp"))
        .and_then(|value| {
            parse_timestamp(value).ok_or_else(|| malformed(raw, "unparseable timestamp"))
        })?;

    let changes = parse_changes(attributes);
    let body = BODY_FIELDS
        .iter()
        .find_map(|field| attributes.get(*field).and_then(Value::as_str))
        .map(strip_markup)
        .filter(|body| !body.is_empty());

    let declared_kind = attributes.get("type").and_then(|value| match value {
        Value::Number(n) => n.to_string().parse::<ActivityKind>().ok(),
        Value::String(s) => s.parse::<ActivityKind>().ok(),
        _ => None,
    });
    let kind = declared_kind.unwrap_or(if !changes.is_empty() {
        ActivityKind::Changeset
    } else if body.is_some() {
        ActivityKind::Comment
    } else {
        ActivityKind::Changeset
    });

    let payload = match kind {
        ActivityKind::Comment => ActivityPayload::Comment { body: body.unwrap_or_default() },
        ActivityKind::Changeset => ActivityPayload::Changeset { changes },
        ActivityKind::Email => ActivityPayload::Email { subject: raw.attribute_str("subject"), body },
    };

    let item_type = raw.attribute_str("item_type");
    let item_id = raw.attribute_str("item_id");
    let task_id = raw
        .attribute_str("task_id")
        .or_else(|| related_id(raw, "task"))
        .or_else(|| match (&item_type, &item_id) {
            (Some(t), Some(id)) if t.eq_ignore_ascii_case("task") => Some(id.clone()),
            _ => None,
        });

    Ok(ActivityRecord {
        id: raw.id.clone(),
        occurred_at,
        event_type: raw.attribute_str("event").or_else(|| raw.attribute_str("event_type")),
        item_type,
        item_id,
        item_name: raw.attribute_str("item_name"),
        actor_id: raw
            .attribute_str("person_id")
            .or_else(|| related_id(raw, "creator"))
            .or_else(|| related_id(raw, "person")),
        actor_name: raw.attribute_str("person_name").or_else(|| raw.attribute_str("actor_name")),
        project_id: raw.attribute_str("project_id").or_else(|| related_id(raw, "project")),
        task_id,
        payload,
    })
}

/// Parse a batch of activities, skipping malformed ones instead of failing
pub fn parse_activities(raw: &[RawResource]) -> ParsedActivities {
    let mut parsed = ParsedActivities::default();

    for resource in raw {
        match parse_activity(resource) {
            Ok(record) => parsed.records.push(record),
            Err(e) => {
                warn!(activity_id = %e.id, reason = %e.reason, "Skipping malformed activity");
                parsed.malformed.push(e);
            }
        }
    }

    if !parsed.malformed.is_empty() {
        debug!(
            parsed = parsed.records.len(),
            skipped = parsed.malformed.len(),
            "Parsed activities with skips"
        );
    }

    parsed
}

fn malformed(raw: &RawResource, reason: &str) -> MalformedActivity {
    MalformedActivity { id: raw.id.clone(), reason: reason.to_string() }
}

fn related_id(raw: &RawResource, relationship: &str) -> Option<String> {
    raw.relationship(relationship)?.first().map(|target| target.id.clone())
}

/// Collect field deltas from either a `changes` map (`field -> {from, to}`) or the
/// service's `changeset` list (`[{field: [{value: from}, {value: to}]}]`)
fn parse_changes(attributes: &Map<String, Value>) -> Vec<FieldChange> {
    let mut changes = Vec::new();

    if let Some(Value::Object(map)) = attributes.get("changes") {
        changes.extend(map.iter().map(|(field, delta)| parse_delta(field, delta)));
    }

    if let Some(Value::Array(entries)) = attributes.get("changeset") {
        for entry in entries {
            if let Value::Object(map) = entry {
                changes.extend(map.iter().map(|(field, delta)| parse_delta(field, delta)));
            }
        }
    }

    changes
}

fn parse_delta(field: &str, delta: &Value) -> FieldChange {
    match delta {
        Value::Object(map) if map.contains_key("from") || map.contains_key("to") => {
            FieldChange::new(field, present(map.get("from")), present(map.get("to")))
        }
        // A single side carries the new value only
        Value::Array(sides) => match sides.as_slice() {
            [] => FieldChange::new(field, None, None),
            [to] => FieldChange::new(field, None, side_value(to)),
            [from, to, ..] => FieldChange::new(field, side_value(from), side_value(to)),
        },
        other => FieldChange::new(field, None, present(Some(other))),
    }
}

fn side_value(side: &Value) -> Option<Value> {
    match side {
        Value::Object(map) if map.contains_key("value") => present(map.get("value")),
        other => present(Some(other)),
    }
}

fn present(value: Option<&Value>) -> Option<Value> {
    value.filter(|v| !v.is_null()).cloned()
}
