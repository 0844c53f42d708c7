use std::collections::BTreeMap;

use serde_json::{Value, json};
use tracing::info;

use super::{ToolError, ToolResult, Tools};
use crate::aggregator::MilestonePredicate;
use crate::client::{FetchError, FetchRequest, Fetcher};
use crate::projector::View;

// Time tracking fields a single task always reports, zero when unset
const TIME_TRACKING_FIELDS: &[&str] = &["initial_estimate", "worked_time", "billable_time", "remaining_time"];

/// Page selection shared by the collection tools
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Paging {
    pub number: Option<u32>,
    pub size: Option<u32>,
}

/// Task listing filters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskQuery {
    pub project_id: Option<String>,
    pub assignee_id: Option<String>,
    pub sort: Option<String>,
    /// Passed through to the service verbatim, e.g. `status` -> `1`
    pub extra_filters: BTreeMap<String, String>,
    pub paging: Paging,
}

/// Comment listing filters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentQuery {
    pub project_id: Option<String>,
    pub task_id: Option<String>,
    pub paging: Paging,
}

/// Page (document) listing filters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageQuery {
    pub project_id: Option<String>,
    pub creator_id: Option<String>,
    pub paging: Paging,
}

impl<F: Fetcher, P: MilestonePredicate> Tools<F, P> {
    /// All projects, most recently active first
    pub fn get_projects(&self) -> ToolResult {
        info!("Fetching all projects");
        self.list(FetchRequest::collection("projects").sort("-last_activity_at"))
    }

    /// Tasks, optionally narrowed to a project or assignee
    pub fn get_tasks(&self, query: &TaskQuery) -> ToolResult {
        info!(?query, "Fetching tasks");
        let mut request = self
            .paged(FetchRequest::collection("tasks"), query.paging)
            .include("workflow_status")
            .filter_opt("project_id", query.project_id.as_ref())
            .filter_opt("assignee_id", query.assignee_id.as_ref());
        if let Some(sort) = &query.sort {
            request = request.sort(sort);
        }
        for (name, value) in &query.extra_filters {
            request = request.filter(name, value);
        }
        self.list(request)
    }

    /// One task with its workflow status; time tracking fields are always present
    pub fn get_task(&self, task_id: &str) -> ToolResult {
        info!(task_id, "Fetching task");
        let mut envelope = self.single(FetchRequest::single("tasks", task_id).include("workflow_status"))?;

        if let Value::Object(task) = &mut envelope.data {
            let attributes = task
                .entry("attributes")
                .or_insert_with(|| Value::Object(Default::default()));
            if let Value::Object(attributes) = attributes {
                for field in TIME_TRACKING_FIELDS {
                    attributes.entry(*field).or_insert(json!(0));
                }
            }
        }
        Ok(envelope)
    }

    /// Open or closed tasks of one project, most recently active first
    ///
    /// `status` follows the service: 1 is open, 2 is closed.
    pub fn get_project_tasks(&self, project_id: &str, status: Option<u32>) -> ToolResult {
        info!(project_id, ?status, "Fetching project tasks");
        let request = FetchRequest::collection("tasks")
            .filter("project_id", project_id)
            .filter_opt("status", status)
            .page(1, self.config.items_per_page)
            .sort("-last_activity_at")
            .include("workflow_status");
        self.list(request)
    }

    /// A task by its per-project number, as shown in the web app
    pub fn get_project_task(&self, project_id: &str, task_number: &str) -> ToolResult {
        info!(project_id, task_number, "Fetching task by number");
        let request = FetchRequest::collection("tasks")
            .filter("project_id", project_id)
            .filter("task_number", task_number)
            .include("workflow_status");
        let payload = self.fetch(&request)?;

        let Some(task) = payload.primary().first() else {
            return Err(ToolError::from(FetchError::NotFound(format!(
                "task {} in project {}",
                task_number, project_id
            ))));
        };
        self.get_task(&task.id)
    }

    /// Comments, newest first
    pub fn get_comments(&self, query: &CommentQuery) -> ToolResult {
        info!(?query, "Fetching comments");
        let request = self
            .paged(FetchRequest::collection("comments"), query.paging)
            .filter_opt("project_id", query.project_id.as_ref())
            .filter_opt("task_id", query.task_id.as_ref())
            .sort("-created_at");
        self.list(request)
    }

    pub fn get_comment(&self, comment_id: &str) -> ToolResult {
        info!(comment_id, "Fetching comment");
        self.single(FetchRequest::single("comments", comment_id))
    }

    pub fn get_todos(&self, task_id: Option<&str>, paging: Paging) -> ToolResult {
        info!(?task_id, "Fetching todos");
        let request =
            self.paged(FetchRequest::collection("todos"), paging).filter_opt("task_id", task_id);
        self.list(request)
    }

    pub fn get_todo(&self, todo_id: &str) -> ToolResult {
        info!(todo_id, "Fetching todo");
        self.single(FetchRequest::single("todos", todo_id))
    }

    /// Pages (documents), most recently updated first; bodies only on single lookups
    pub fn get_pages(&self, query: &PageQuery) -> ToolResult {
        info!(?query, "Fetching pages");
        let request = self
            .paged(FetchRequest::collection("pages"), query.paging)
            .filter_opt("project_id", query.project_id.as_ref())
            .filter_opt("creator_id", query.creator_id.as_ref())
            .sort("-updated_at");
        self.list(request)
    }

    pub fn get_page(&self, page_id: &str) -> ToolResult {
        info!(page_id, "Fetching page");
        self.single(FetchRequest::single("pages", page_id))
    }

    pub fn get_attachments(&self, paging: Paging) -> ToolResult {
        info!("Fetching attachments");
        self.list(self.paged(FetchRequest::collection("attachments"), paging))
    }

    pub fn get_attachment(&self, attachment_id: &str) -> ToolResult {
        info!(attachment_id, "Fetching attachment");
        self.single(FetchRequest::single("attachments", attachment_id))
    }

    /// Team members, most recently seen first
    pub fn get_people(&self, paging: Paging) -> ToolResult {
        info!("Fetching people");
        self.list(self.paged(FetchRequest::collection("people"), paging).sort("-last_seen_at"))
    }

    pub fn get_person(&self, person_id: &str) -> ToolResult {
        info!(person_id, "Fetching person");
        self.single(FetchRequest::single("people", person_id))
    }

    fn paged(&self, request: FetchRequest, paging: Paging) -> FetchRequest {
        request.page(paging.number.unwrap_or(1), self.page_size(paging.size))
    }

    fn list(&self, request: FetchRequest) -> ToolResult {
        let payload = self.fetch(&request)?;
        Ok(self.projector.project_payload(&payload, View::Lightweight))
    }

    fn single(&self, request: FetchRequest) -> ToolResult {
        let payload = self.fetch(&request)?;
        if payload.primary().is_empty() {
            return Err(ToolError::from(FetchError::NotFound(request.path())));
        }
        Ok(self.projector.project_payload(&payload, View::Full))
    }
}
