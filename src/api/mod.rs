//! Papertrail search API model
//!
//! Defines the wire-level data model for the `/events/search.json`
//! endpoint and the `SearchBackend` trait that abstracts the HTTP
//! transport for testability:
//! - SearchBackend trait: interface for executing one search request
//! - HttpBackend (in `http`): real HTTP client for production
//! - Scripted fakes live in the test suites

pub mod http;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use http::HttpBackend;

/// A single search request against the events API.
///
/// Carries the user filters plus the resumption point. The cursor
/// (`min_id`), once obtained from a response, replaces `min_time` as the
/// resumption point: `advance` sets the one and clears the other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchFilter {
    /// Free-text query (terms joined with single spaces)
    pub query: String,

    /// Restrict results to one system
    pub system_id: Option<String>,

    /// Restrict results to one group
    pub group_id: Option<String>,

    /// Lower time bound; only used until a cursor exists
    pub min_time: Option<DateTime<Utc>>,

    /// Opaque cursor marking the newest event already seen
    pub min_id: Option<String>,
}

impl SearchFilter {
    /// Create a filter with only a free-text query set
    pub fn for_query(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            system_id: None,
            group_id: None,
            min_time: None,
            min_id: None,
        }
    }

    /// Advance the cursor to `max_id` from the latest page.
    ///
    /// Idempotent: applying the same `max_id` twice leaves the filter
    /// unchanged. An empty id is ignored so the cursor can never regress
    /// to "no cursor".
    pub fn advance(&mut self, max_id: &str) {
        if max_id.is_empty() {
            return;
        }
        self.min_id = Some(max_id.to_string());
        self.min_time = None;
    }

    /// Whether a cursor has been obtained yet
    pub fn has_cursor(&self) -> bool {
        self.min_id.is_some()
    }
}

/// One log event as returned by the search API. Immutable once parsed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Event id, unique and ascending within a stream
    #[serde(default)]
    pub id: String,

    /// When Papertrail received the event
    pub received_at: DateTime<Utc>,

    /// Name of the sending system
    pub source_name: String,

    /// Syslog facility
    #[serde(default)]
    pub facility: String,

    /// Syslog severity
    #[serde(default)]
    pub severity: Option<String>,

    /// Program that emitted the event, when the sender reported one
    #[serde(default)]
    pub program: Option<String>,

    /// The log line itself
    pub message: String,
}

/// One page of search results.
///
/// Events are ordered oldest-first. `max_id` marks the newest event the
/// service has seen for this page and is used verbatim as the next
/// request's cursor; it is non-decreasing across successive pages for a
/// fixed filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub events: Vec<Event>,

    #[serde(default)]
    pub max_id: String,

    #[serde(default)]
    pub min_id: String,

    /// True when the service truncated the page at its record limit
    #[serde(default)]
    pub reached_record_limit: bool,
}

/// Metadata from the raw search response. The tail loop ignores this;
/// it is surfaced because the search operation returns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseMeta {
    /// HTTP status code of the response
    pub status: u16,

    /// Remaining requests in the current rate-limit window, when the
    /// service reported one
    pub rate_limit_remaining: Option<u64>,
}

/// Errors from executing a search request
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("search returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Backend trait for executing search requests.
///
/// The tail loop depends only on this signature; retry, backoff, auth,
/// and transport details belong to implementations.
pub trait SearchBackend {
    /// Execute one search request and return the parsed page together
    /// with response metadata
    fn search(&self, filter: &SearchFilter) -> Result<(SearchResult, ResponseMeta), SearchError>;
}

/// Scripted backend for tests: returns queued pages in order and
/// records every filter it was called with. Once the script is
/// exhausted it keeps returning empty pages at the last `max_id`, like
/// a quiet live edge.
#[derive(Debug, Default)]
pub struct ScriptedBackend {
    script: std::cell::RefCell<std::collections::VecDeque<Result<SearchResult, SearchError>>>,
    calls: std::cell::RefCell<Vec<SearchFilter>>,
    last_max_id: std::cell::RefCell<String>,
}

impl ScriptedBackend {
    /// Create a backend that will serve `script` front to back
    pub fn new(script: Vec<Result<SearchResult, SearchError>>) -> Self {
        Self {
            script: std::cell::RefCell::new(script.into()),
            calls: std::cell::RefCell::new(Vec::new()),
            last_max_id: std::cell::RefCell::new(String::new()),
        }
    }

    /// Filters of every search call made so far, in order
    pub fn calls(&self) -> Vec<SearchFilter> {
        self.calls.borrow().clone()
    }
}

impl SearchBackend for ScriptedBackend {
    fn search(&self, filter: &SearchFilter) -> Result<(SearchResult, ResponseMeta), SearchError> {
        self.calls.borrow_mut().push(filter.clone());

        let meta = ResponseMeta {
            status: 200,
            rate_limit_remaining: None,
        };

        match self.script.borrow_mut().pop_front() {
            Some(Ok(result)) => {
                if !result.max_id.is_empty() {
                    *self.last_max_id.borrow_mut() = result.max_id.clone();
                }
                Ok((result, meta))
            }
            Some(Err(e)) => Err(e),
            None => Ok((
                SearchResult {
                    events: Vec::new(),
                    max_id: self.last_max_id.borrow().clone(),
                    min_id: String::new(),
                    reached_record_limit: false,
                },
                meta,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_advance_sets_cursor_and_clears_min_time() {
        let mut filter = SearchFilter::for_query("error");
        filter.min_time = Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());

        filter.advance("7001");

        assert_eq!(filter.min_id.as_deref(), Some("7001"));
        assert!(filter.min_time.is_none());
        assert!(filter.has_cursor());
    }

    #[test]
    fn test_advance_is_idempotent() {
        let mut filter = SearchFilter::for_query("error");
        filter.advance("7001");
        let once = filter.clone();

        filter.advance("7001");

        assert_eq!(filter, once);
    }

    #[test]
    fn test_advance_ignores_empty_max_id() {
        let mut filter = SearchFilter::for_query("error");
        filter.advance("7001");

        filter.advance("");

        assert_eq!(filter.min_id.as_deref(), Some("7001"));
    }

    #[test]
    fn test_search_result_parses_service_payload() {
        let body = r#"{
            "min_id": "7000",
            "max_id": "7002",
            "reached_record_limit": false,
            "events": [
                {
                    "id": "7002",
                    "received_at": "2024-01-01T00:00:00Z",
                    "source_name": "web-01",
                    "facility": "Local0",
                    "severity": "Info",
                    "program": "nginx",
                    "message": "GET /health 200"
                }
            ]
        }"#;

        let result: SearchResult = serde_json::from_str(body).unwrap();
        assert_eq!(result.max_id, "7002");
        assert_eq!(result.events.len(), 1);
        assert_eq!(result.events[0].source_name, "web-01");
        assert_eq!(result.events[0].program.as_deref(), Some("nginx"));
        assert!(!result.reached_record_limit);
    }

    #[test]
    fn test_search_result_defaults_for_sparse_payload() {
        let result: SearchResult = serde_json::from_str(r#"{"max_id": "1"}"#).unwrap();
        assert!(result.events.is_empty());
        assert_eq!(result.max_id, "1");
        assert_eq!(result.min_id, "");
    }
}
