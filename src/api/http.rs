//! HTTP backend for the search API
//!
//! Implements `SearchBackend` against the Papertrail REST API. Requests
//! are authenticated with the `X-Papertrail-Token` header; filters are
//! serialized as query-string parameters. Retry and backoff are left to
//! the caller's policy (the tail loop reports and re-attempts on its
//! next pass).

use std::time::Duration;

use reqwest::blocking::Client;

use super::{ResponseMeta, SearchBackend, SearchError, SearchFilter, SearchResult};

/// Base URL of the production API
pub const DEFAULT_BASE_URL: &str = "https://papertrailapp.com/api/v1";

/// Header carrying the API token
const TOKEN_HEADER: &str = "X-Papertrail-Token";

/// Rate-limit header on search responses
const RATE_LIMIT_REMAINING_HEADER: &str = "X-Rate-Limit-Remaining";

/// Request timeout; generous because the search endpoint can block
/// briefly while the service assembles a page
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP implementation of `SearchBackend`
#[derive(Debug)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
    token: String,
}

impl HttpBackend {
    /// Create a backend against the production API
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_base_url(token, DEFAULT_BASE_URL)
    }

    /// Create a backend against a custom base URL (test servers)
    pub fn with_base_url(token: impl Into<String>, base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.into(),
            token: token.into(),
        }
    }

    /// Serialize a filter into query-string pairs.
    ///
    /// `min_id` takes precedence over `min_time` as the resumption point;
    /// the filter upholds that by clearing `min_time` on advance, so both
    /// are simply forwarded when present.
    fn query_params(filter: &SearchFilter) -> Vec<(&'static str, String)> {
        let mut params = vec![("q", filter.query.clone())];

        if let Some(ref system_id) = filter.system_id {
            params.push(("system_id", system_id.clone()));
        }
        if let Some(ref group_id) = filter.group_id {
            params.push(("group_id", group_id.clone()));
        }
        if let Some(ref min_id) = filter.min_id {
            params.push(("min_id", min_id.clone()));
        }
        if let Some(min_time) = filter.min_time {
            params.push(("min_time", min_time.timestamp().to_string()));
        }

        params
    }
}

impl SearchBackend for HttpBackend {
    fn search(&self, filter: &SearchFilter) -> Result<(SearchResult, ResponseMeta), SearchError> {
        let url = format!("{}/events/search.json", self.base_url);

        let response = self
            .client
            .get(&url)
            .header(TOKEN_HEADER, &self.token)
            .query(&Self::query_params(filter))
            .send()?;

        let status = response.status();
        let rate_limit_remaining = response
            .headers()
            .get(RATE_LIMIT_REMAINING_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok());
        let meta = ResponseMeta {
            status: status.as_u16(),
            rate_limit_remaining,
        };

        let body = response.text()?;

        if !status.is_success() {
            return Err(SearchError::Api {
                status: status.as_u16(),
                message: body.trim().to_string(),
            });
        }

        let result: SearchResult = serde_json::from_str(&body)?;
        Ok((result, meta))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono::Utc;

    #[test]
    fn test_query_params_minimal_filter() {
        let filter = SearchFilter::for_query("level=error");
        let params = HttpBackend::query_params(&filter);

        assert_eq!(params, vec![("q", "level=error".to_string())]);
    }

    #[test]
    fn test_query_params_full_filter() {
        let mut filter = SearchFilter::for_query("timeout");
        filter.system_id = Some("42".to_string());
        filter.group_id = Some("7".to_string());
        filter.min_time = Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());

        let params = HttpBackend::query_params(&filter);

        assert!(params.contains(&("system_id", "42".to_string())));
        assert!(params.contains(&("group_id", "7".to_string())));
        assert!(params.contains(&("min_time", "1704067200".to_string())));
    }

    #[test]
    fn test_query_params_cursor_replaces_min_time() {
        let mut filter = SearchFilter::for_query("timeout");
        filter.min_time = Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        filter.advance("9001");

        let params = HttpBackend::query_params(&filter);

        assert!(params.contains(&("min_id", "9001".to_string())));
        assert!(!params.iter().any(|(k, _)| *k == "min_time"));
    }
}
