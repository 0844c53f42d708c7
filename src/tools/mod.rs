//! Read tools: fetch, run the pipeline once, wrap the result in an [`Envelope`]
//!
//! Each operation mirrors one read tool of the Productive integration: it builds a
//! [`FetchRequest`], hands the payload to the projector, aggregator or search
//! normalizer, and returns an envelope ready for encoding.
//!
//! # Error Handling Strategy
//!
//! Upstream failures are returned as [`ToolError`] and rendered as
//! `{"error": {"kind", "message", "status_code"}}` by [`ToolError::to_result`]. Nothing
//! is retried here. Problems inside the payload (malformed activities, unresolved
//! relationships, search hits without identity) degrade gracefully and are logged.

mod activity;
mod resources;
mod search;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use crate::aggregator::{Aggregator, KeywordMilestones, MilestonePredicate};
use crate::client::{FetchError, FetchRequest, Fetcher};
use crate::models::{Envelope, Payload};
use crate::projector::{Projector, WebappUrls};
use crate::utils::Config;
use crate::utils::environment::MAX_ITEMS_PER_PAGE;

pub use activity::{DEFAULT_HISTORY_HOURS, RecentActivityParams};
pub use resources::{CommentQuery, PageQuery, Paging, TaskQuery};
pub use search::{DEFAULT_SEARCH_TYPES, SearchParams};

pub type ToolResult = Result<Envelope, ToolError>;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Failed to build result: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl ToolError {
    pub fn kind(&self) -> &'static str {
        match self {
            ToolError::Fetch(err) => err.kind(),
            ToolError::InvalidArgument(_) => "invalid_argument",
            ToolError::Serialize(_) => "internal",
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            ToolError::Fetch(err) => err.status_code(),
            _ => None,
        }
    }

    /// Structured form handed to callers instead of a result
    pub fn to_result(&self) -> ErrorResult {
        ErrorResult {
            error: ErrorBody {
                kind: self.kind().to_string(),
                message: self.to_string(),
                status_code: self.status_code(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResult {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub kind: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
}

/// The read tools over one [`Fetcher`]
pub struct Tools<F, P = KeywordMilestones> {
    fetcher: F,
    config: Config,
    projector: Projector,
    aggregator: Aggregator<P>,
    now: Option<DateTime<Utc>>,
}

impl<F: Fetcher> Tools<F> {
    pub fn new(fetcher: F, config: Config) -> Self {
        Self::with_milestones(fetcher, config, KeywordMilestones::default())
    }
}

impl<F: Fetcher, P: MilestonePredicate> Tools<F, P> {
    pub fn with_milestones(fetcher: F, config: Config, milestones: P) -> Self {
        let projector = Projector::new(WebappUrls::new(&config.webapp_url, &config.organization));
        Self { fetcher, config, projector, aggregator: Aggregator::new(milestones), now: None }
    }

    /// Pin the clock used for activity windows
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn projector(&self) -> &Projector {
        &self.projector
    }

    fn now(&self) -> DateTime<Utc> {
        self.now.unwrap_or_else(Utc::now)
    }

    fn fetch(&self, request: &FetchRequest) -> Result<Payload, ToolError> {
        self.fetcher.fetch(request).map_err(|err| {
            warn!(path = %request.path(), kind = err.kind(), "Fetch failed: {}", err);
            ToolError::from(err)
        })
    }

    /// Requested page size, defaulting to the configured one and capped by the API limit
    fn page_size(&self, requested: Option<u32>) -> u32 {
        match requested {
            None => self.config.items_per_page,
            Some(size) if size > MAX_ITEMS_PER_PAGE => {
                warn!(requested = size, max = MAX_ITEMS_PER_PAGE, "Page size exceeds API limit, clamping");
                MAX_ITEMS_PER_PAGE
            }
            Some(0) => self.config.items_per_page,
            Some(size) => size,
        }
    }
}
