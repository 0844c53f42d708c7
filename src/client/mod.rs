//! Interface to the Productive API
//!
//! The pipeline only needs "give me the payload for this request"; that is the
//! [`Fetcher`] trait. [`FixtureFetcher`] answers from a directory of captured
//! payloads. Transport, authentication and retries belong to implementations;
//! callers never retry.

pub mod fixture;

use std::collections::BTreeMap;

use thiserror::Error;

use crate::models::Payload;

pub use fixture::FixtureFetcher;

/// Page selection for collection requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub number: u32,
    pub size: u32,
}

/// One read request against the API
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchRequest {
    /// Endpoint resource type, e.g. `tasks` or `search/quick`
    pub resource_type: String,
    pub id: Option<String>,
    /// Filter name to value, e.g. `project_id` -> `12`
    pub filters: BTreeMap<String, String>,
    pub page: Option<Pagination>,
    pub sort: Option<String>,
    pub include: Vec<String>,
}

impl FetchRequest {
    pub fn collection(resource_type: &str) -> Self {
        Self { resource_type: resource_type.to_string(), ..Self::default() }
    }

    pub fn single(resource_type: &str, id: &str) -> Self {
        Self { id: Some(id.to_string()), ..Self::collection(resource_type) }
    }

    pub fn filter(mut self, name: &str, value: impl ToString) -> Self {
        self.filters.insert(name.to_string(), value.to_string());
        self
    }

    /// Add a filter only when a value is present
    pub fn filter_opt(self, name: &str, value: Option<impl ToString>) -> Self {
        match value {
            Some(value) => self.filter(name, value),
            None => self,
        }
    }

    pub fn page(mut self, number: u32, size: u32) -> Self {
        self.page = Some(Pagination { number, size });
        self
    }

    pub fn sort(mut self, sort: &str) -> Self {
        self.sort = Some(sort.to_string());
        self
    }

    pub fn include(mut self, related: &str) -> Self {
        self.include.push(related.to_string());
        self
    }

    /// Endpoint path relative to the API root
    pub fn path(&self) -> String {
        match &self.id {
            Some(id) => format!("/{}/{}", self.resource_type, id),
            None => format!("/{}", self.resource_type),
        }
    }

    /// JSON:API query parameters in a stable order
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = self
            .filters
            .iter()
            .map(|(name, value)| (format!("filter[{}]", name), value.clone()))
            .collect();
        if let Some(page) = self.page {
            pairs.push(("page[number]".to_string(), page.number.to_string()));
            pairs.push(("page[size]".to_string(), page.size.to_string()));
        }
        if let Some(sort) = &self.sort {
            pairs.push(("sort".to_string(), sort.clone()));
        }
        if !self.include.is_empty() {
            pairs.push(("include".to_string(), self.include.join(",")));
        }
        pairs
    }
}

/// Upstream failures, reported to callers as a structured error result
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
}

impl FetchError {
    /// Map an HTTP status to the matching failure kind
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 => FetchError::Unauthorized(message),
            404 => FetchError::NotFound(message),
            408 | 504 => FetchError::Timeout(message),
            429 => FetchError::RateLimited(message),
            _ => FetchError::ServerError { status, message },
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Unauthorized(_) => "unauthorized",
            FetchError::NotFound(_) => "not_found",
            FetchError::RateLimited(_) => "rate_limited",
            FetchError::ServerError { .. } => "server_error",
            FetchError::Timeout(_) => "timeout",
            FetchError::InvalidPayload(_) => "invalid_payload",
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            FetchError::Unauthorized(_) => Some(401),
            FetchError::NotFound(_) => Some(404),
            FetchError::RateLimited(_) => Some(429),
            FetchError::ServerError { status, .. } => Some(*status),
            FetchError::Timeout(_) | FetchError::InvalidPayload(_) => None,
        }
    }
}

/// Source of API payloads
pub trait Fetcher {
    fn fetch(&self, request: &FetchRequest) -> Result<Payload, FetchError>;
}

impl<F> Fetcher for F
where
    F: Fn(&FetchRequest) -> Result<Payload, FetchError>,
{
    fn fetch(&self, request: &FetchRequest) -> Result<Payload, FetchError> {
        self(request)
    }
}
