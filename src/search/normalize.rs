use serde_json::Value;
use tracing::warn;

use crate::models::{RawResource, SearchHit};
use crate::projector::{WebappUrls, strip_markup};

/// Normalize one quick-search result into a [`SearchHit`]
///
/// Returns `None` (and logs a warning) when the hit lacks `record_id` or `record_type`.
pub fn normalize(raw: &RawResource, urls: &WebappUrls) -> Option<SearchHit> {
    let (Some(record_id), Some(record_type)) =
        (raw.attribute_str("record_id"), raw.attribute_str("record_type"))
    else {
        warn!(id = %raw.id, "Skipping search hit without record_id/record_type");
        return None;
    };

    let stripped = |name: &str| {
        raw.attribute_str(name).map(|text| strip_markup(&text)).filter(|text| !text.is_empty())
    };

    let project_name = raw
        .attribute("meta")
        .and_then(|meta| meta.get("project_name"))
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())
        .map(str::to_string);

    let status = raw.attribute("status").filter(|status| !is_blank(status)).cloned();

    Some(SearchHit {
        webapp_url: urls.for_record(&record_type, &record_id),
        title: stripped("title"),
        subtitle: stripped("subtitle"),
        icon_url: raw.attribute_str("icon_url"),
        status,
        project_name,
        updated_at: raw.attribute_str("updated_at"),
        workflow_status_name: None,
        record_id,
        record_type,
    })
}

/// Normalize a page of hits, keeping relevance order
pub fn normalize_all(hits: &[RawResource], urls: &WebappUrls) -> Vec<SearchHit> {
    hits.iter().filter_map(|hit| normalize(hit, urls)).collect()
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}
