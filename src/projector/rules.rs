//! Per-type attribute rules: bookkeeping denylists, rich-text fields, and the fields a
//! lightweight (collection) view keeps or drops.

/// Internal bookkeeping fields never shown to callers
pub fn denylist(resource_type: &str) -> &'static [&'static str] {
    match resource_type {
        "tasks" => &["creation_method_id", "email_key", "placement"],
        "pages" | "page" => {
            &["preferences", "cover_image_meta", "custom_fields", "version_number", "position"]
        }
        "attachments" => &["attachable_type", "attachable_id"],
        "projects" => &[
            "sample_data",
            "template",
            "time_on_tasks",
            "project_color_id",
            "duplication_status",
            "project_type_id",
            "preferences",
            // Redundant with project_number
            "number",
        ],
        _ => &[],
    }
}

/// Attributes whose values may carry markup
pub fn rich_text_fields(resource_type: &str) -> &'static [&'static str] {
    match resource_type {
        "tasks" | "todos" => &["description"],
        "comments" => &["body"],
        "pages" | "page" => &["body"],
        _ => &[],
    }
}

/// Long-form fields dropped from lightweight projections
pub const LONG_FORM_FIELDS: &[&str] = &["description", "body"];

/// Task attributes kept in lightweight projections; everything else is dropped
pub const TASK_LIST_FIELDS: &[&str] = &[
    "title",
    "task_number",
    "closed",
    "created_at",
    "updated_at",
    "due_date",
    "initial_estimate",
    "remaining_time",
    "worked_time",
    "billable_time",
    "closed_at",
    "type_id",
    "private",
    "workflow_status_name",
];

/// Relationships dropped everywhere; every resource belongs to the same organization
pub const DROPPED_RELATIONSHIPS: &[&str] = &["organization"];
