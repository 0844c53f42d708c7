use serde_json::{Map, Value, json};
use tracing::info;

use super::{ToolError, ToolResult, Tools};
use crate::aggregator::{MAX_FEED_RESULTS, MilestonePredicate, feed_limit};
use crate::client::{FetchError, FetchRequest, Fetcher};
use crate::filters::{FilterExpr, FilterField, TimeWindow};
use crate::models::{ActivityKind, Envelope};

/// Look-back of a task history when the caller does not choose one, thirty days
pub const DEFAULT_HISTORY_HOURS: u32 = 720;

/// Recent-activity window and subject filters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentActivityParams {
    pub hours: u32,
    pub user_id: Option<String>,
    pub project_id: Option<String>,
    pub activity_type: Option<ActivityKind>,
    pub item_type: Option<String>,
    pub event_type: Option<String>,
    pub task_id: Option<String>,
    pub max_results: Option<usize>,
}

impl Default for RecentActivityParams {
    fn default() -> Self {
        Self {
            hours: 24,
            user_id: None,
            project_id: None,
            activity_type: None,
            item_type: None,
            event_type: None,
            task_id: None,
            max_results: None,
        }
    }
}

impl RecentActivityParams {
    fn filter(&self) -> FilterExpr {
        FilterExpr::new()
            .with(FilterField::User, self.user_id.as_ref())
            .with(FilterField::Project, self.project_id.as_ref())
            .with_activity_type(self.activity_type)
            .with(FilterField::ItemType, self.item_type.as_ref())
            .with(FilterField::Event, self.event_type.as_ref())
            .with(FilterField::Task, self.task_id.as_ref())
    }
}

impl<F: Fetcher, P: MilestonePredicate> Tools<F, P> {
    /// Activities across the organization within the last `hours`, newest first
    pub fn get_recent_activity(&self, params: &RecentActivityParams) -> ToolResult {
        let window = TimeWindow::ending_at(self.now(), params.hours, self.config.max_hours);
        let filter = params.filter();
        let limit = feed_limit(params.max_results);
        info!(hours = window.hours, cutoff = %window.cutoff(), "Fetching recent activity");

        let request = activity_request(&window, &filter, limit as u32);
        let payload = self.fetch(&request)?;
        let feed = self.aggregator.recent_feed(payload.primary(), &window, &filter, limit);

        let mut filters_applied = Map::new();
        filters_applied.insert("after".to_string(), json!(window.cutoff()));
        filters_applied.extend(filter.applied());

        let mut meta = Map::new();
        meta.insert("hours".to_string(), json!(window.hours));
        meta.insert("cutoff_time".to_string(), json!(window.cutoff()));
        meta.insert("filters_applied".to_string(), Value::Object(filters_applied));

        if feed.activities.is_empty() {
            info!("No recent activities found");
            meta.insert(
                "message".to_string(),
                json!(format!("No activities found in the last {} hours", window.hours)),
            );
        }
        meta.insert("total_activities".to_string(), json!(feed.summary.returned));
        meta.insert("activity_summary".to_string(), serde_json::to_value(&feed.summary)?);

        Ok(Envelope::new(serde_json::to_value(&feed.activities)?).with_meta(meta))
    }

    /// Status, assignment and milestone timeline of one task
    ///
    /// The task is fetched first; a task the service does not know is `NotFound`.
    pub fn get_task_history(&self, task_id: &str, hours: Option<u32>) -> ToolResult {
        let hours = hours.unwrap_or(DEFAULT_HISTORY_HOURS);
        info!(task_id, hours, "Fetching task history");

        let task = self.fetch(&FetchRequest::single("tasks", task_id))?;
        if task.primary().is_empty() {
            return Err(ToolError::from(FetchError::NotFound(format!("task {}", task_id))));
        }

        let window = TimeWindow::ending_at(self.now(), hours, self.config.max_hours);
        let scope = FilterExpr::new().with(FilterField::Task, Some(task_id));
        let request = activity_request(&window, &scope, MAX_FEED_RESULTS as u32);
        let activities = self.fetch(&request)?;

        // The service already scoped the response to the task; comment and change
        // records often carry no task id of their own
        let history =
            self.aggregator.task_history(task_id, activities.primary(), &window, &FilterExpr::new());

        let mut meta = Map::new();
        meta.insert("hours".to_string(), json!(window.hours));
        meta.insert("cutoff_time".to_string(), json!(window.cutoff()));

        let mut envelope = Envelope::new(serde_json::to_value(&history)?).with_meta(meta);
        envelope.webapp_url = self.projector.urls().for_resource("tasks", task_id);
        Ok(envelope)
    }
}

// The service filters by the same parameters; the aggregator re-applies them locally
fn activity_request(window: &TimeWindow, filter: &FilterExpr, page_size: u32) -> FetchRequest {
    let mut request = FetchRequest::collection("activities").filter("after", window.cutoff());
    for field_filter in &filter.filters {
        request = request.filter(field_filter.field.param_name(), &field_filter.value);
    }
    request.page(1, page_size)
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use serde_json::json;

    use super::*;
    use crate::models::Payload;
    use crate::utils::Config;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
    }

    fn ago(hours: i64) -> String {
        (now() - Duration::hours(hours)).to_rfc3339()
    }

    fn config() -> Config {
        Config { organization: "acme".to_string(), ..Config::default() }
    }

    fn activities() -> Payload {
        serde_json::from_value(json!({
            "data": [
                {"id": "a1", "type": "activities", "attributes": {
                    "created_at": ago(30), "event": "edit", "item_type": "Task", "task_id": 7,
                    "changes": {"status_id": {"from": 1, "to": 2}}}},
                {"id": "a2", "type": "activities", "attributes": {
                    "created_at": ago(2), "event": "edit", "item_type": "Task", "task_id": 7,
                    "changes": {"status_id": {"from": 2, "to": 3}, "assignee_id": {"to": "u9"}}}},
                {"id": "a3", "type": "activities", "attributes": {
                    "created_at": ago(1), "event": "create", "item_type": "Comment", "task_id": 8,
                    "body": "<p>Milestone: beta</p>", "type": 1}},
                {"id": "bad", "type": "activities", "attributes": {"event": "edit"}}
            ]
        }))
        .unwrap()
    }

    fn fetcher(request: &FetchRequest) -> Result<Payload, FetchError> {
        match (request.resource_type.as_str(), request.id.as_deref()) {
            ("activities", None) => Ok(activities()),
            ("tasks", Some("7")) => Ok(serde_json::from_value(json!({
                "data": {"id": "7", "type": "tasks", "attributes": {"title": "Fix"}}
            }))
            .unwrap()),
            _ => Err(FetchError::NotFound(request.path())),
        }
    }

    #[test]
    fn test_recent_activity_meta() {
        let tools = Tools::new(fetcher, config()).at(now());
        let envelope = tools.get_recent_activity(&RecentActivityParams::default()).unwrap();

        let ids: Vec<&str> = envelope.data.as_array().unwrap().iter().map(|a| a["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["a3", "a2"]);
        assert_eq!(envelope.meta["hours"], json!(24));
        assert_eq!(envelope.meta["cutoff_time"], json!("2025-06-14T12:00:00Z"));
        assert_eq!(envelope.meta["total_activities"], json!(2));
        assert_eq!(envelope.meta["activity_summary"]["malformed"], json!(1));
        assert_eq!(envelope.meta["filters_applied"], json!({"after": "2025-06-14T12:00:00Z"}));
        assert!(envelope.meta.get("message").is_none());
    }

    #[test]
    fn test_recent_activity_empty_has_message() {
        let tools = Tools::new(fetcher, config()).at(now());
        let params = RecentActivityParams { event_type: Some("delete".to_string()), ..Default::default() };
        let envelope = tools.get_recent_activity(&params).unwrap();

        assert_eq!(envelope.data, json!([]));
        assert_eq!(envelope.meta["message"], json!("No activities found in the last 24 hours"));
        assert_eq!(envelope.meta["filters_applied"]["event"], json!("delete"));
    }

    #[test]
    fn test_task_history() {
        let tools = Tools::new(fetcher, config()).at(now());
        let envelope = tools.get_task_history("7", None).unwrap();

        assert_eq!(envelope.data["task_id"], json!("7"));
        let statuses = envelope.data["status_history"].as_array().unwrap();
        assert_eq!(statuses.len(), 2);
        assert_eq!(statuses[0]["to"], json!(2));
        assert_eq!(envelope.data["assignment_history"][0]["assigned_to"], json!("u9"));
        assert_eq!(envelope.data["activity_summary"]["status_updates"], json!(2));
        assert_eq!(envelope.meta["hours"], json!(720));
        assert_eq!(envelope.webapp_url.as_deref(), Some("https://app.productive.io/acme/tasks/7"));
    }

    #[test]
    fn test_task_history_keeps_records_without_task_id() {
        let scoped = |request: &FetchRequest| -> Result<Payload, FetchError> {
            let value = match (request.resource_type.as_str(), request.id.as_deref()) {
                ("tasks", Some("7")) => json!({"data": {"id": "7", "type": "tasks", "attributes": {"title": "Fix"}}}),
                ("activities", None) => {
                    assert_eq!(request.filters["task_id"], "7");
                    json!({"data": [
                        {"id": "1", "type": "activities", "attributes": {
                            "created_at": ago(3), "changes": {"status_id": {"from": 1, "to": 2}}}},
                        {"id": "2", "type": "activities", "attributes": {
                            "created_at": ago(2), "changes": {"assignee_id": {"to": "u9"}}}},
                        {"id": "3", "type": "activities", "attributes": {
                            "created_at": ago(1), "item_type": "Comment", "item_id": 501,
                            "body": "Milestone: beta release"}}
                    ]})
                }
                _ => return Err(FetchError::NotFound(request.path())),
            };
            Ok(serde_json::from_value(value).unwrap())
        };

        let envelope = Tools::new(scoped, config()).at(now()).get_task_history("7", None).unwrap();
        let history = &envelope.data;

        assert_eq!(history["status_history"].as_array().unwrap().len(), 1);
        assert_eq!(history["assignment_history"][0]["assigned_to"], json!("u9"));
        assert_eq!(history["milestones"][0]["description"], json!("beta release"));
        assert_eq!(history["activity_summary"]["total"], json!(3));
        assert_eq!(history["activity_summary"]["comments"], json!(1));
    }

    #[test]
    fn test_task_history_unknown_task() {
        let tools = Tools::new(fetcher, config()).at(now());
        let err = tools.get_task_history("99", None).unwrap_err();
        assert_eq!(err.kind(), "not_found");
    }

    #[test]
    fn test_activity_request_carries_filters() {
        let window = TimeWindow::ending_at(now(), 24, 8760);
        let filter = FilterExpr::new()
            .with(FilterField::Project, Some("12"))
            .with_activity_type(Some(ActivityKind::Comment));
        let request = activity_request(&window, &filter, 100);

        assert_eq!(request.filters["after"], "2025-06-14T12:00:00Z");
        assert_eq!(request.filters["project_id"], "12");
        assert_eq!(request.filters["type"], "1");
        assert_eq!(request.page.unwrap().size, 100);
    }
}
