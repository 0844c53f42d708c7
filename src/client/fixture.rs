use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use tracing::debug;

use super::{FetchError, FetchRequest, Fetcher};
use crate::models::{Payload, PrimaryData, RawResource};
use crate::parsers::parse_payload_value;
use crate::utils::read_to_string_bounded;

/// Serves captured API payloads from a directory
///
/// Layout: `<root>/<resource_type>.json` answers collection requests and
/// `<root>/<resource_type>/<id>.json` answers single-resource requests (the resource
/// type may contain `/`, e.g. `search/quick.json`). A missing file is `NotFound`; a
/// file holding `{"error": {"status": 401, "message": "..."}}` replays that failure.
///
/// Collection fixtures are filtered on attributes and relationships named by the
/// request filters (`project_id` matches a `project_id` attribute or a `project`
/// relationship) and paginated; filters naming nothing on a resource do not exclude it.
#[derive(Debug, Clone)]
pub struct FixtureFetcher {
    root: PathBuf,
}

impl FixtureFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn fixture_path(&self, request: &FetchRequest) -> PathBuf {
        let mut path = self.root.join(&request.resource_type);
        match &request.id {
            Some(id) => path.push(format!("{}.json", id)),
            None => {
                path.set_extension("json");
            }
        }
        path
    }
}

impl Fetcher for FixtureFetcher {
    fn fetch(&self, request: &FetchRequest) -> Result<Payload, FetchError> {
        // Ids come from callers; keep them inside the fixture directory
        if request.id.as_deref().is_some_and(|id| id.contains(['/', '\\']) || id.starts_with('.')) {
            return Err(FetchError::NotFound(format!("no fixture for {}", request.path())));
        }

        let path = self.fixture_path(request);
        debug!(path = %path.display(), query = ?request.query_pairs(), "Reading fixture");

        if !path.exists() {
            return Err(FetchError::NotFound(format!("no fixture for {}", request.path())));
        }

        let text = read_to_string_bounded(&path).map_err(|err| {
            match err.downcast_ref::<std::io::Error>().map(std::io::Error::kind) {
                Some(ErrorKind::NotFound) => FetchError::NotFound(request.path()),
                _ => FetchError::InvalidPayload(format!("{:#}", err)),
            }
        })?;
        let value: Value = serde_json::from_str(&text).map_err(|err| {
            FetchError::InvalidPayload(format!("{}: {}", path.display(), err))
        })?;

        if let Some(error) = value.get("error") {
            return Err(replayed_error(error));
        }

        let mut payload = parse_payload_value(value)
            .map_err(|err| FetchError::InvalidPayload(format!("{}: {}", path.display(), err)))?;

        if request.id.is_none() {
            select(&mut payload, request);
        }
        Ok(payload)
    }
}

fn replayed_error(error: &Value) -> FetchError {
    let status = error.get("status").and_then(|status| match status {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    });
    let message = error
        .get("message")
        .or_else(|| error.get("detail"))
        .and_then(Value::as_str)
        .unwrap_or("upstream error")
        .to_string();

    match (error.get("kind").and_then(Value::as_str), status) {
        (Some("timeout"), _) => FetchError::Timeout(message),
        (_, Some(status)) => FetchError::from_status(u16::try_from(status).unwrap_or(500), message),
        (_, None) => FetchError::ServerError { status: 500, message },
    }
}

// Filter and paginate a collection fixture the way the service would
fn select(payload: &mut Payload, request: &FetchRequest) {
    let resources = match payload.data.take() {
        Some(PrimaryData::Many(resources)) => resources,
        other => {
            payload.data = other;
            return;
        }
    };

    let matching: Vec<RawResource> = resources
        .into_iter()
        .filter(|resource| {
            request.filters.iter().all(|(name, value)| matches_filter(resource, name, value))
        })
        .collect();

    let total = matching.len();
    let page = match request.page {
        Some(page) if page.size > 0 => {
            let number = page.number.max(1) as usize;
            let size = page.size as usize;
            payload.meta.insert("current_page".to_string(), json!(number));
            payload.meta.insert("page_size".to_string(), json!(size));
            payload.meta.insert("total_pages".to_string(), json!(total.div_ceil(size)));
            matching.into_iter().skip((number - 1) * size).take(size).collect()
        }
        _ => matching,
    };
    payload.meta.insert("total_count".to_string(), json!(total));
    payload.data = Some(PrimaryData::Many(page));
}

fn matches_filter(resource: &RawResource, name: &str, value: &str) -> bool {
    let accepted: Vec<&str> = value.split(',').map(str::trim).collect();

    if let Some(actual) = resource.attribute(name) {
        return match actual {
            Value::String(s) => accepted.iter().any(|v| v.eq_ignore_ascii_case(s)),
            Value::Number(n) => accepted.contains(&n.to_string().as_str()),
            Value::Bool(b) => accepted.contains(&b.to_string().as_str()),
            _ => true,
        };
    }

    let relationship = name.strip_suffix("_id").unwrap_or(name);
    match resource.relationship(relationship) {
        Some(rel) => rel.targets().iter().any(|target| accepted.contains(&target.id.as_str())),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn fixture_dir(files: &[(&str, Value)]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for (name, body) in files {
            let path = dir.path().join(name);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, body.to_string()).unwrap();
        }
        dir
    }

    fn tasks() -> Value {
        json!({
            "data": [
                {"id": "1", "type": "tasks", "attributes": {"title": "A"},
                 "relationships": {"project": {"data": {"type": "projects", "id": "10"}}}},
                {"id": "2", "type": "tasks", "attributes": {"title": "B"},
                 "relationships": {"project": {"data": {"type": "projects", "id": "20"}}}},
                {"id": "3", "type": "tasks", "attributes": {"title": "C", "project_id": 10}}
            ]
        })
    }

    #[test]
    fn test_collection_and_single() {
        let dir = fixture_dir(&[
            ("tasks.json", tasks()),
            ("tasks/1.json", json!({"data": {"id": "1", "type": "tasks", "attributes": {"title": "A"}}})),
        ]);
        let fetcher = FixtureFetcher::new(dir.path());

        let payload = fetcher.fetch(&FetchRequest::collection("tasks")).unwrap();
        assert_eq!(payload.primary().len(), 3);
        assert_eq!(payload.meta["total_count"], json!(3));

        let single = fetcher.fetch(&FetchRequest::single("tasks", "1")).unwrap();
        assert!(single.is_single());
    }

    #[test]
    fn test_filters_match_attributes_and_relationships() {
        let dir = fixture_dir(&[("tasks.json", tasks())]);
        let fetcher = FixtureFetcher::new(dir.path());

        let payload =
            fetcher.fetch(&FetchRequest::collection("tasks").filter("project_id", "10")).unwrap();
        let ids: Vec<&str> = payload.primary().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn test_pagination() {
        let dir = fixture_dir(&[("tasks.json", tasks())]);
        let fetcher = FixtureFetcher::new(dir.path());

        let payload = fetcher.fetch(&FetchRequest::collection("tasks").page(2, 2)).unwrap();
        assert_eq!(payload.primary().len(), 1);
        assert_eq!(payload.meta["total_pages"], json!(2));
        assert_eq!(payload.meta["current_page"], json!(2));
    }

    #[test]
    fn test_missing_fixture_is_not_found() {
        let dir = fixture_dir(&[]);
        let err = FixtureFetcher::new(dir.path()).fetch(&FetchRequest::single("tasks", "9")).unwrap_err();
        assert_eq!(err.kind(), "not_found");
    }

    #[test]
    fn test_path_escape_is_not_found() {
        let dir = fixture_dir(&[("tasks.json", tasks())]);
        let err = FixtureFetcher::new(dir.path())
            .fetch(&FetchRequest::single("tasks", "../tasks"))
            .unwrap_err();
        assert_eq!(err.kind(), "not_found");
    }

    #[test]
    fn test_replayed_errors() {
        let dir = fixture_dir(&[
            ("projects.json", json!({"error": {"status": 401, "message": "Invalid API token"}})),
            ("people.json", json!({"error": {"status": "503"}})),
            ("pages.json", json!({"error": {"kind": "timeout", "message": "took too long"}})),
        ]);
        let fetcher = FixtureFetcher::new(dir.path());

        let err = fetcher.fetch(&FetchRequest::collection("projects")).unwrap_err();
        assert_eq!(err, FetchError::Unauthorized("Invalid API token".to_string()));

        let err = fetcher.fetch(&FetchRequest::collection("people")).unwrap_err();
        assert_eq!(err.status_code(), Some(503));

        let err = fetcher.fetch(&FetchRequest::collection("pages")).unwrap_err();
        assert_eq!(err.kind(), "timeout");
    }

    #[test]
    fn test_invalid_payload() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("tasks.json"), "{not json").unwrap();
        let err = FixtureFetcher::new(dir.path()).fetch(&FetchRequest::collection("tasks")).unwrap_err();
        assert_eq!(err.kind(), "invalid_payload");
    }
}
