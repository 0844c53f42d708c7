//! Shared test utilities for integration tests
#![allow(dead_code)]

use std::fs;
use std::path::Path;

use chrono::{DateTime, Duration, TimeZone, Utc};
use productive_digest::models::{Payload, RawResource};
use serde_json::{Map, Value, json};
use tempfile::TempDir;

/// Fixed "now" shared by time-window tests
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
}

pub fn hours_ago(hours: i64) -> DateTime<Utc> {
    now() - Duration::hours(hours)
}

/// Builder for raw activity resources
pub struct ActivityBuilder {
    id: String,
    attributes: Map<String, Value>,
    changes: Map<String, Value>,
}

impl ActivityBuilder {
    /// Activity created at `at`, with no payload yet
    pub fn new(id: &str, at: DateTime<Utc>) -> Self {
        let mut attributes = Map::new();
        attributes.insert("created_at".to_string(), json!(at.to_rfc3339()));
        Self { id: id.to_string(), attributes, changes: Map::new() }
    }

    /// Activity without any timestamp
    pub fn untimed(id: &str) -> Self {
        Self { id: id.to_string(), attributes: Map::new(), changes: Map::new() }
    }

    pub fn change(mut self, field: &str, from: Value, to: Value) -> Self {
        self.changes.insert(field.to_string(), json!({"from": from, "to": to}));
        self
    }

    pub fn status(self, from: i64, to: i64) -> Self {
        self.change("status_id", json!(from), json!(to))
    }

    pub fn assignee(self, to: &str) -> Self {
        self.change("assignee_id", Value::Null, json!(to))
    }

    pub fn attr(mut self, name: &str, value: Value) -> Self {
        self.attributes.insert(name.to_string(), value);
        self
    }

    pub fn body(self, body: &str) -> Self {
        self.attr("body", json!(body))
    }

    pub fn event(self, event: &str) -> Self {
        self.attr("event", json!(event))
    }

    pub fn item_type(self, item_type: &str) -> Self {
        self.attr("item_type", json!(item_type))
    }

    pub fn task(self, task_id: &str) -> Self {
        self.attr("task_id", json!(task_id))
    }

    pub fn person(self, name: &str) -> Self {
        self.attr("person_name", json!(name))
    }

    pub fn to_json(&self) -> Value {
        let mut attributes = self.attributes.clone();
        if !self.changes.is_empty() {
            attributes.insert("changes".to_string(), Value::Object(self.changes.clone()));
        }
        json!({"id": self.id, "type": "activities", "attributes": attributes})
    }

    pub fn build(&self) -> RawResource {
        serde_json::from_value(self.to_json()).expect("Failed to build activity")
    }
}

pub fn raw_activities(builders: &[ActivityBuilder]) -> Vec<RawResource> {
    builders.iter().map(ActivityBuilder::build).collect()
}

/// Builder for JSON:API payloads
#[derive(Default)]
pub struct PayloadBuilder {
    data: Vec<Value>,
    single: bool,
    included: Vec<Value>,
    meta: Map<String, Value>,
}

impl PayloadBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resource(mut self, resource: Value) -> Self {
        self.data.push(resource);
        self
    }

    /// Emit `data` as one object instead of an array
    pub fn single(mut self) -> Self {
        self.single = true;
        self
    }

    pub fn included(mut self, resource: Value) -> Self {
        self.included.push(resource);
        self
    }

    pub fn meta(mut self, key: &str, value: Value) -> Self {
        self.meta.insert(key.to_string(), value);
        self
    }

    pub fn to_json(&self) -> Value {
        let data = if self.single {
            self.data.first().cloned().unwrap_or(Value::Null)
        } else {
            Value::Array(self.data.clone())
        };
        json!({"data": data, "included": self.included, "meta": self.meta})
    }

    pub fn build(&self) -> Payload {
        serde_json::from_value(self.to_json()).expect("Failed to build payload")
    }
}

/// Builder for captured-payload directories
pub struct FixtureDirBuilder {
    temp_dir: TempDir,
}

impl FixtureDirBuilder {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        Self { temp_dir }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Payload answering collection requests for `resource_type`
    pub fn collection(self, resource_type: &str, payload: Value) -> Self {
        self.write(&format!("{}.json", resource_type), &payload)
    }

    /// Payload answering `<resource_type>/<id>`
    pub fn single(self, resource_type: &str, id: &str, payload: Value) -> Self {
        self.write(&format!("{}/{}.json", resource_type, id), &payload)
    }

    /// Replay an upstream failure for collection requests on `resource_type`
    pub fn failure(self, resource_type: &str, status: u16, message: &str) -> Self {
        let payload = json!({"error": {"status": status, "message": message}});
        self.write(&format!("{}.json", resource_type), &payload)
    }

    fn write(self, relative: &str, payload: &Value) -> Self {
        let path = self.temp_dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create fixture dir");
        }
        fs::write(&path, payload.to_string()).expect("Failed to write fixture");
        self
    }

    pub fn build(self) -> TempDir {
        self.temp_dir
    }
}

impl Default for FixtureDirBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Task resource with a side-loadable workflow status
pub fn task_json(id: &str, title: &str, status_id: &str) -> Value {
    json!({
        "id": id,
        "type": "tasks",
        "attributes": {
            "title": title,
            "description": "<p>Steps to <b>reproduce</b></p>",
            "placement": 1024,
            "email_key": "task-abc@productive",
            "due_date": null,
            "tag_list": []
        },
        "relationships": {
            "project": {"data": {"type": "projects", "id": "12"}},
            "workflow_status": {"data": {"type": "workflow_statuses", "id": status_id}},
            "organization": {"data": {"type": "organizations", "id": "1"}}
        },
        "links": {"self": format!("https://api.productive.io/api/v2/tasks/{}", id)}
    })
}

pub fn workflow_status_json(id: &str, name: &str) -> Value {
    json!({"id": id, "type": "workflow_statuses", "attributes": {"name": name, "color_id": 3}})
}

pub fn project_json(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "type": "projects",
        "attributes": {"name": name, "project_number": "P-1", "sample_data": false, "number": "1"}
    })
}
