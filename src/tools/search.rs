use serde_json::{Map, Value, json};
use tracing::{info, warn};

use super::{ToolError, ToolResult, Tools};
use crate::aggregator::MilestonePredicate;
use crate::client::{FetchRequest, Fetcher};
use crate::models::{Envelope, SearchHit};
use crate::projector::View;
use crate::search::normalize_all;

pub const DEFAULT_SEARCH_TYPES: &[&str] = &["action", "project", "task", "page"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParams {
    pub query: String,
    pub search_types: Vec<String>,
    pub deep_search: bool,
    pub page: u32,
    pub per_page: u32,
}

impl SearchParams {
    pub fn new(query: &str) -> Self {
        Self {
            query: query.to_string(),
            search_types: DEFAULT_SEARCH_TYPES.iter().map(|t| t.to_string()).collect(),
            deep_search: true,
            page: 1,
            per_page: 50,
        }
    }
}

impl<F: Fetcher, P: MilestonePredicate> Tools<F, P> {
    /// Search projects, tasks, pages and actions in one call
    ///
    /// Task hits are enriched with their custom workflow status; a task that cannot be
    /// fetched keeps its hit as is.
    pub fn quick_search(&self, params: &SearchParams) -> ToolResult {
        if params.query.trim().is_empty() {
            return Err(ToolError::InvalidArgument("query must not be empty".to_string()));
        }
        info!(query = %params.query, "Quick search");

        let request = FetchRequest::collection("search/quick")
            .filter("query", &params.query)
            .filter("type", params.search_types.join(","))
            .filter("status", "all")
            .filter("deep_search", params.deep_search)
            .page(params.page, self.page_size(Some(params.per_page)));
        let payload = self.fetch(&request)?;

        let mut hits = normalize_all(payload.primary(), self.projector.urls());
        for hit in hits.iter_mut().filter(|hit| hit.record_type.eq_ignore_ascii_case("task")) {
            self.hydrate_task(hit);
        }
        info!(results = hits.len(), "Quick search finished");

        let mut meta = Map::new();
        meta.insert("query".to_string(), json!(params.query));
        meta.insert("search_types".to_string(), json!(params.search_types));
        meta.insert("deep_search".to_string(), json!(params.deep_search));
        meta.insert("page".to_string(), json!(params.page));
        meta.insert("per_page".to_string(), json!(params.per_page));
        meta.insert("total_results".to_string(), json!(hits.len()));

        Ok(Envelope::new(serde_json::to_value(&hits)?).with_meta(meta))
    }

    fn hydrate_task(&self, hit: &mut SearchHit) {
        let request = FetchRequest::single("tasks", &hit.record_id).include("workflow_status");
        let payload = match self.fetch(&request) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(task_id = %hit.record_id, "Could not fetch workflow status: {}", err);
                return;
            }
        };

        let envelope = self.projector.project_payload(&payload, View::Full);
        hit.workflow_status_name = envelope
            .data
            .get("attributes")
            .and_then(|attributes| attributes.get("workflow_status_name"))
            .and_then(Value::as_str)
            .map(str::to_string);
        if envelope.webapp_url.is_some() {
            hit.webapp_url = envelope.webapp_url;
        }
    }
}
