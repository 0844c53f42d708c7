use std::collections::HashSet;

use serde_json::{Map, Value};
use tracing::debug;

use super::markup::strip_markup;
use super::rules::{
    DROPPED_RELATIONSHIPS, LONG_FORM_FIELDS, TASK_LIST_FIELDS, denylist, rich_text_fields,
};
use super::urls::WebappUrls;
use crate::models::{
    CleanResource, Envelope, IncludedIndex, Payload, PrimaryData, RawResource, RelationshipData,
    ResourceRef,
};

/// How much of a resource to keep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    /// Single-resource lookups: long-form fields and resolved relationships
    #[default]
    Full,
    /// Collections: essential fields only, relationships as references
    Lightweight,
}

/// Turns raw JSON:API resources into cleaned, denormalized, link-free structures
#[derive(Debug, Clone)]
pub struct Projector {
    urls: WebappUrls,
}

impl Projector {
    pub fn new(urls: WebappUrls) -> Self {
        Self { urls }
    }

    pub fn urls(&self) -> &WebappUrls {
        &self.urls
    }

    /// Project one resource
    ///
    /// Related resources found in `included` are embedded as lightweight projections
    /// without relationships of their own; missing ones stay `{type, id}` references.
    pub fn project(
        &self,
        raw: &RawResource,
        included: &IncludedIndex<'_>,
        view: View,
    ) -> CleanResource {
        self.project_resource(raw, included, view, true)
    }

    /// Project a whole response into an [`Envelope`]
    ///
    /// In the full view, side-loaded resources that no primary resource points at are
    /// kept under `included` so nothing the service returned is silently lost.
    pub fn project_payload(&self, payload: &Payload, view: View) -> Envelope {
        let index = IncludedIndex::build(&payload.included);

        let mut webapp_url = None;
        let data = match &payload.data {
            Some(PrimaryData::One(raw)) => {
                let clean = self.project(raw, &index, view);
                webapp_url = clean.get("webapp_url").and_then(Value::as_str).map(str::to_string);
                Value::Object(clean)
            }
            Some(PrimaryData::Many(resources)) => Value::Array(
                resources.iter().map(|raw| Value::Object(self.project(raw, &index, view))).collect(),
            ),
            None => Value::Array(Vec::new()),
        };

        let included = match view {
            View::Full => self.unreferenced_included(payload, &index),
            View::Lightweight => Vec::new(),
        };

        Envelope { data, meta: clean_meta(&payload.meta), included, webapp_url }
    }

    fn project_resource(
        &self,
        raw: &RawResource,
        included: &IncludedIndex<'_>,
        view: View,
        expand: bool,
    ) -> CleanResource {
        let mut attributes = sanitize_attributes(&raw.resource_type, &raw.attributes, view);
        if raw.resource_type == "tasks" {
            if let Some(name) = workflow_status_name(raw, included) {
                attributes.insert("workflow_status_name".to_string(), Value::String(name));
            }
        }

        let mut clean = Map::new();
        clean.insert("id".to_string(), Value::String(raw.id.clone()));
        clean.insert("type".to_string(), Value::String(raw.resource_type.clone()));
        if !attributes.is_empty() {
            clean.insert("attributes".to_string(), Value::Object(attributes));
        }

        // Embedded resources are never expanded further
        if expand {
            let relationships = self.project_relationships(raw, included, view);
            if !relationships.is_empty() {
                clean.insert("relationships".to_string(), Value::Object(relationships));
            }
        }

        if let Some(url) = self.urls.for_resource(&raw.resource_type, &raw.id) {
            clean.insert("webapp_url".to_string(), Value::String(url));
        }

        clean
    }

    fn project_relationships(
        &self,
        raw: &RawResource,
        included: &IncludedIndex<'_>,
        view: View,
    ) -> Map<String, Value> {
        let mut relationships = Map::new();

        for (name, relationship) in &raw.relationships {
            if DROPPED_RELATIONSHIPS.contains(&name.as_str()) {
                continue;
            }
            let value = match &relationship.data {
                Some(RelationshipData::One(target)) => self.resolve(target, included, view),
                Some(RelationshipData::Many(targets)) if !targets.is_empty() => Value::Array(
                    targets.iter().map(|target| self.resolve(target, included, view)).collect(),
                ),
                _ => continue,
            };
            relationships.insert(name.clone(), value);
        }

        relationships
    }

    fn resolve(&self, target: &ResourceRef, included: &IncludedIndex<'_>, view: View) -> Value {
        if view == View::Full {
            if let Some(found) = included.get(target) {
                return Value::Object(self.project_resource(
                    found,
                    included,
                    View::Lightweight,
                    false,
                ));
            }
            debug!(
                resource_type = %target.resource_type,
                id = %target.id,
                "Relationship target not included, keeping reference"
            );
        }
        reference(target)
    }

    fn unreferenced_included(&self, payload: &Payload, index: &IncludedIndex<'_>) -> Vec<Value> {
        let referenced: HashSet<&ResourceRef> = payload
            .primary()
            .iter()
            .flat_map(|raw| raw.relationships.iter())
            .flat_map(|(_, relationship)| relationship.targets())
            .collect();

        payload
            .included
            .iter()
            .filter(|raw| !referenced.contains(&raw.key()))
            .map(|raw| Value::Object(self.project_resource(raw, index, View::Lightweight, false)))
            .collect()
    }
}

/// Apply the per-type attribute rules: denylist, view filter, markup stripping and
/// empty-value removal
pub fn sanitize_attributes(
    resource_type: &str,
    attributes: &Map<String, Value>,
    view: View,
) -> Map<String, Value> {
    let denied = denylist(resource_type);
    let rich_text = rich_text_fields(resource_type);
    let mut sanitized = Map::new();

    for (key, value) in attributes {
        let key_str = key.as_str();
        if denied.contains(&key_str) {
            continue;
        }
        if view == View::Lightweight {
            let keep = if resource_type == "tasks" {
                TASK_LIST_FIELDS.contains(&key_str)
            } else {
                !LONG_FORM_FIELDS.contains(&key_str)
            };
            if !keep {
                continue;
            }
        }

        let value = match value {
            Value::String(text) if rich_text.contains(&key_str) => Value::String(strip_markup(text)),
            other => other.clone(),
        };
        if let Some(value) = prune_empty(value) {
            sanitized.insert(key.clone(), value);
        }
    }

    sanitized
}

/// Recursively drop nulls, empty strings and empty containers
pub fn prune_empty(value: Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::Array(items) => {
            let items: Vec<Value> = items.into_iter().filter_map(prune_empty).collect();
            (!items.is_empty()).then_some(Value::Array(items))
        }
        Value::Object(map) => {
            let map: Map<String, Value> = map
                .into_iter()
                .filter_map(|(key, value)| prune_empty(value).map(|value| (key, value)))
                .collect();
            (!map.is_empty()).then_some(Value::Object(map))
        }
        other => Some(other),
    }
}

/// Clean response meta: drop `settings`, drop `included: false`, drop empties
pub fn clean_meta(meta: &Map<String, Value>) -> Map<String, Value> {
    let cleaned: Map<String, Value> = meta
        .iter()
        .filter(|(key, value)| match key.as_str() {
            "settings" => false,
            "included" => **value != Value::Bool(false),
            _ => true,
        })
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    match prune_empty(Value::Object(cleaned)) {
        Some(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

/// Name of the task's custom workflow status, when the status was side-loaded
fn workflow_status_name(raw: &RawResource, included: &IncludedIndex<'_>) -> Option<String> {
    let target = raw.relationship("workflow_status")?.first()?;
    let status = included.get(target)?;
    if status.resource_type != "workflow_statuses" {
        return None;
    }
    status.attribute_str("name")
}

fn reference(target: &ResourceRef) -> Value {
    let mut reference = Map::new();
    reference.insert("type".to_string(), Value::String(target.resource_type.clone()));
    reference.insert("id".to_string(), Value::String(target.id.clone()));
    Value::Object(reference)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn projector() -> Projector {
        Projector::new(WebappUrls::new("https://app.productive.io", "org-1"))
    }

    fn resource(value: Value) -> RawResource {
        serde_json::from_value(value).unwrap()
    }

    fn task() -> RawResource {
        resource(json!({
            "id": "100",
            "type": "tasks",
            "attributes": {
                "title": "Fix login",
                "description": "<p>Users <b>cannot</b> log in</p>",
                "placement": 12000,
                "email_key": "abc",
                "creation_method_id": 1,
                "due_date": null,
                "tag_list": [],
                "custom_fields": {},
                "closed": false,
                "task_number": 7
            },
            "relationships": {
                "project": {"data": {"type": "projects", "id": "5"}},
                "assignee": {"data": {"type": "people", "id": "9"}},
                "workflow_status": {"data": {"type": "workflow_statuses", "id": "3"}},
                "organization": {"data": {"type": "organizations", "id": "1"}},
                "subscribers": {"data": []},
                "parent_task": {"data": null}
            }
        }))
    }

    fn included() -> Vec<RawResource> {
        vec![
            resource(json!({
                "id": "5",
                "type": "projects",
                "attributes": {"name": "Website", "number": "12", "sample_data": false},
                "relationships": {"company": {"data": {"type": "companies", "id": "2"}}}
            })),
            resource(json!({"id": "3", "type": "workflow_statuses", "attributes": {"name": "In review"}})),
        ]
    }

    #[test]
    fn test_full_projection() {
        let included = included();
        let index = IncludedIndex::build(&included);
        let clean = projector().project(&task(), &index, View::Full);

        assert_eq!(
            Value::Object(clean),
            json!({
                "id": "100",
                "type": "tasks",
                "attributes": {
                    "title": "Fix login",
                    "description": "Users cannot log in",
                    "closed": false,
                    "task_number": 7,
                    "workflow_status_name": "In review"
                },
                "relationships": {
                    "project": {
                        "id": "5",
                        "type": "projects",
                        "attributes": {"name": "Website"},
                        "webapp_url": "https://app.productive.io/org-1/projects/5"
                    },
                    "assignee": {"type": "people", "id": "9"},
                    "workflow_status": {
                        "id": "3",
                        "type": "workflow_statuses",
                        "attributes": {"name": "In review"}
                    }
                },
                "webapp_url": "https://app.productive.io/org-1/tasks/100"
            })
        );
    }

    #[test]
    fn test_lightweight_projection() {
        let included = included();
        let index = IncludedIndex::build(&included);
        let clean = projector().project(&task(), &index, View::Lightweight);

        let attributes = clean["attributes"].as_object().unwrap();
        assert!(!attributes.contains_key("description"));
        assert_eq!(attributes["workflow_status_name"], "In review");
        assert_eq!(clean["relationships"]["project"], json!({"type": "projects", "id": "5"}));
    }

    #[test]
    fn test_lightweight_non_task_drops_long_form_only() {
        let page = resource(json!({
            "id": "8",
            "type": "pages",
            "attributes": {"title": "Roadmap", "body": "<p>long</p>", "position": 2, "edited_at": "2025-01-01"}
        }));
        let clean = projector().project(&page, &IncludedIndex::default(), View::Lightweight);
        assert_eq!(clean["attributes"], json!({"title": "Roadmap", "edited_at": "2025-01-01"}));
    }

    #[test]
    fn test_type_without_web_view_has_no_url() {
        let comment = resource(json!({"id": "1", "type": "comments", "attributes": {"body": "<p>hi</p>"}}));
        let clean = projector().project(&comment, &IncludedIndex::default(), View::Full);
        assert!(!clean.contains_key("webapp_url"));
        assert_eq!(clean["attributes"]["body"], "hi");
    }

    #[test]
    fn test_rich_text_that_strips_to_nothing_is_removed() {
        let todo = resource(json!({"id": "1", "type": "todos", "attributes": {"description": "<p> </p>", "closed": true}}));
        let clean = projector().project(&todo, &IncludedIndex::default(), View::Full);
        assert_eq!(clean["attributes"], json!({"closed": true}));
    }

    #[test]
    fn test_reprojection_is_stable() {
        let raw = resource(json!({
            "id": "5",
            "type": "projects",
            "attributes": {"name": "Website", "template": false, "archived_at": null, "tags": ["a", ""]}
        }));
        let once = projector().project(&raw, &IncludedIndex::default(), View::Full);
        let again_raw: RawResource = serde_json::from_value(Value::Object(once.clone())).unwrap();
        let twice = projector().project(&again_raw, &IncludedIndex::default(), View::Full);
        assert_eq!(once, twice);

        let raw = resource(json!({
            "id": "6",
            "type": "tasks",
            "attributes": {"title": "T", "description": "&lt;br&gt;"}
        }));
        let once = projector().project(&raw, &IncludedIndex::default(), View::Full);
        let again_raw: RawResource = serde_json::from_value(Value::Object(once.clone())).unwrap();
        let twice = projector().project(&again_raw, &IncludedIndex::default(), View::Full);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let attributes = task().attributes;
        let once = sanitize_attributes("tasks", &attributes, View::Full);
        let twice = sanitize_attributes("tasks", &once, View::Full);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_prune_empty_nested() {
        let value = json!({"a": {"b": {"c": null}}, "d": [[], {}, ""], "e": 0, "f": false});
        assert_eq!(prune_empty(value), Some(json!({"e": 0, "f": false})));
        assert_eq!(prune_empty(json!({"a": null})), None);
    }

    #[test]
    fn test_clean_meta() {
        let meta = json!({"total_count": 3, "settings": {"x": 1}, "included": false, "page": {}})
            .as_object()
            .cloned()
            .unwrap();
        assert_eq!(Value::Object(clean_meta(&meta)), json!({"total_count": 3}));
    }

    #[test]
    fn test_project_payload_single_keeps_unreferenced_included() {
        let mut extra = included();
        extra.push(resource(json!({"id": "77", "type": "people", "attributes": {"first_name": "Ana"}})));
        let payload = Payload {
            data: Some(PrimaryData::One(Box::new(task()))),
            included: extra,
            meta: Map::new(),
        };

        let envelope = projector().project_payload(&payload, View::Full);
        assert_eq!(envelope.webapp_url.as_deref(), Some("https://app.productive.io/org-1/tasks/100"));
        assert_eq!(envelope.included.len(), 1);
        assert_eq!(envelope.included[0]["id"], "77");
        assert_eq!(envelope.included[0]["webapp_url"], "https://app.productive.io/org-1/people/77");
    }

    #[test]
    fn test_project_payload_collection() {
        let payload = Payload {
            data: Some(PrimaryData::Many(vec![task(), task()])),
            included: included(),
            meta: json!({"total_count": 2}).as_object().cloned().unwrap(),
        };

        let envelope = projector().project_payload(&payload, View::Lightweight);
        assert_eq!(envelope.data.as_array().unwrap().len(), 2);
        assert!(envelope.included.is_empty());
        assert!(envelope.webapp_url.is_none());
        assert_eq!(envelope.meta["total_count"], 2);
    }
}
