use serde_json::{Map, Value};

use crate::models::ActivityKind;

/// Subject fields an activity can be filtered on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    /// Task the activity belongs to
    Task,
    /// Project the activity belongs to
    Project,
    /// Person who performed the activity
    User,
    /// Activity kind (comment, changeset, email)
    ActivityType,
    /// Item type such as Task, Page, Project (case-insensitive)
    ItemType,
    /// Event such as create, edit, delete (case-insensitive)
    Event,
}

impl FilterField {
    /// Name of the matching `filter[...]` query parameter on the service
    pub fn param_name(self) -> &'static str {
        match self {
            Self::Task => "task_id",
            Self::Project => "project_id",
            Self::User => "person_id",
            Self::ActivityType => "type",
            Self::ItemType => "item_type",
            Self::Event => "event",
        }
    }
}

/// Single field:value filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFilter {
    pub field: FilterField,
    pub value: String,
}

impl FieldFilter {
    pub fn new(field: FilterField, value: String) -> Self {
        Self { field, value }
    }
}

/// Conjunction of field filters; an empty expression matches everything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterExpr {
    pub filters: Vec<FieldFilter>,
}

impl FilterExpr {
    pub fn new() -> Self {
        Self { filters: Vec::new() }
    }

    pub fn add_filter(&mut self, filter: FieldFilter) {
        self.filters.push(filter);
    }

    /// Builder-style add; `None` leaves the expression unchanged
    pub fn with(mut self, field: FilterField, value: Option<impl ToString>) -> Self {
        if let Some(value) = value {
            self.add_filter(FieldFilter::new(field, value.to_string()));
        }
        self
    }

    pub fn with_activity_type(self, kind: Option<ActivityKind>) -> Self {
        self.with(FilterField::ActivityType, kind.map(ActivityKind::code))
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// The filters as `param -> value`, for reporting what was applied
    pub fn applied(&self) -> Map<String, Value> {
        self.filters
            .iter()
            .map(|f| (f.field.param_name().to_string(), Value::String(f.value.clone())))
            .collect()
    }
}
