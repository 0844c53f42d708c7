use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Activity kinds as numbered by the service (1: comment, 2: changeset, 3: email)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Comment,
    Changeset,
    Email,
}

impl ActivityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Comment => "comment",
            Self::Changeset => "changeset",
            Self::Email => "email",
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Self::Comment => 1,
            Self::Changeset => 2,
            Self::Email => 3,
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityKind {
    type Err = String;

    /// Accepts the numeric code or the name, case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1" | "comment" => Ok(Self::Comment),
            "2" | "changeset" => Ok(Self::Changeset),
            "3" | "email" => Ok(Self::Email),
            other => Err(format!("unknown activity type: '{}' (expected 1-3 or a name)", other)),
        }
    }
}

/// One changed field; a missing side means the value was unset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    pub field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<Value>,
}

impl FieldChange {
    pub fn new(field: &str, from: Option<Value>, to: Option<Value>) -> Self {
        Self { field: field.to_string(), from, to }
    }
}

/// Kind-specific part of an activity
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActivityPayload {
    Comment {
        body: String,
    },
    Changeset {
        #[serde(skip_serializing_if = "Vec::is_empty")]
        changes: Vec<FieldChange>,
    },
    Email {
        #[serde(skip_serializing_if = "Option::is_none")]
        subject: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        body: Option<String>,
    },
}

impl ActivityPayload {
    pub fn kind(&self) -> ActivityKind {
        match self {
            Self::Comment { .. } => ActivityKind::Comment,
            Self::Changeset { .. } => ActivityKind::Changeset,
            Self::Email { .. } => ActivityKind::Email,
        }
    }

    pub fn changes(&self) -> &[FieldChange] {
        match self {
            Self::Changeset { changes } => changes,
            _ => &[],
        }
    }

    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Comment { body } => Some(body),
            Self::Email { body, .. } => body.as_deref(),
            Self::Changeset { .. } => None,
        }
    }
}

/// A parsed activity: shared envelope plus kind-specific payload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityRecord {
    pub id: String,
    pub occurred_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    #[serde(flatten)]
    pub payload: ActivityPayload,
}

impl ActivityRecord {
    pub fn kind(&self) -> ActivityKind {
        self.payload.kind()
    }

    pub fn changes(&self) -> &[FieldChange] {
        self.payload.changes()
    }

    pub fn body(&self) -> Option<&str> {
        self.payload.body()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    StatusChange,
    AssignmentChange,
    Milestone,
    Generic,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusChange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<Value>,
    pub changed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssignmentChange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<Value>,
    pub changed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Milestone {
    pub description: String,
    pub occurred_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_by: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActivitySummary {
    pub total: usize,
    pub comments: usize,
    pub changes: usize,
    pub status_updates: usize,
    pub assignments: usize,
    pub milestones: usize,
    /// Records skipped because they could not be parsed
    pub malformed: usize,
}

/// Timeline of one task, oldest event first
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskHistory {
    pub task_id: String,
    pub status_history: Vec<StatusChange>,
    pub assignment_history: Vec<AssignmentChange>,
    pub milestones: Vec<Milestone>,
    pub activity_summary: ActivitySummary,
}

impl TaskHistory {
    pub fn empty(task_id: &str) -> Self {
        Self {
            task_id: task_id.to_string(),
            status_history: Vec::new(),
            assignment_history: Vec::new(),
            milestones: Vec::new(),
            activity_summary: ActivitySummary::default(),
        }
    }
}

/// One row of the recent-activity feed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedEntry {
    #[serde(flatten)]
    pub record: ActivityRecord,
    pub categories: Vec<Category>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FeedSummary {
    /// Matching records before truncation
    pub total: usize,
    pub returned: usize,
    pub by_type: BTreeMap<String, usize>,
    pub by_event: BTreeMap<String, usize>,
    pub by_item_type: BTreeMap<String, usize>,
    pub malformed: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowInfo {
    pub since: DateTime<Utc>,
    pub until: DateTime<Utc>,
    pub hours: u32,
}

/// Cross-task activity feed, newest first
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentActivityFeed {
    pub activities: Vec<FeedEntry>,
    pub summary: FeedSummary,
    pub window: WindowInfo,
}
