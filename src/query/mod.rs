//! Query builder
//!
//! Translates user-supplied filters (query terms, system id, group id,
//! time lower-bound, follow flag) into the first `SearchFilter` of a
//! tail run, plus the stop condition derived from them.

use std::time::Duration;

use chrono::Utc;

use crate::api::SearchFilter;

/// Default lookback window when no explicit time offset is requested
const DEFAULT_LOOKBACK_HOURS: i64 = 48;

/// User-supplied search parameters, as collected from the CLI
#[derive(Debug, Clone, Default)]
pub struct QuerySpec {
    /// Free-text query terms; at least one is required
    pub terms: Vec<String>,

    /// Restrict the search to one system
    pub system_id: Option<String>,

    /// Restrict the search to one group
    pub group_id: Option<String>,

    /// Keep following new events once the backlog is drained
    pub follow: bool,

    /// Explicit lower time bound, as an offset back from now.
    /// Zero means "no explicit offset" and selects the default
    /// 48-hour lookback.
    pub min_time_ago: Duration,
}

/// Errors from building a query
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum QueryError {
    /// User-input validation error, not a retryable failure; the caller
    /// must short-circuit before entering the tail loop
    #[error("at least one query term is required")]
    EmptyQuery,
}

/// A built query: the first request filter plus the stop condition
#[derive(Debug, Clone)]
pub struct BuiltQuery {
    /// Filter for the first search request
    pub filter: SearchFilter,

    /// Whether the tail loop should terminate on the first empty page.
    /// True only for a one-shot backward-looking search (`!follow` with
    /// no explicit time offset); any explicitly-following or
    /// explicitly-offset search polls instead of terminating.
    pub stop_on_empty: bool,
}

impl QuerySpec {
    /// Build the first search filter and the stop condition.
    ///
    /// Terms are joined with single spaces. With no explicit time
    /// offset, `min_time` is set to now (UTC) minus 48 hours; an
    /// explicit offset sets `min_time` to now minus that offset.
    pub fn build(&self) -> Result<BuiltQuery, QueryError> {
        if self.terms.is_empty() {
            return Err(QueryError::EmptyQuery);
        }

        let mut filter = SearchFilter::for_query(self.terms.join(" "));
        filter.system_id = self.system_id.clone();
        filter.group_id = self.group_id.clone();

        let lookback = if self.min_time_ago.is_zero() {
            chrono::Duration::hours(DEFAULT_LOOKBACK_HOURS)
        } else {
            chrono::Duration::from_std(self.min_time_ago)
                .unwrap_or_else(|_| chrono::Duration::hours(DEFAULT_LOOKBACK_HOURS))
        };
        filter.min_time = Some(Utc::now() - lookback);

        let stop_on_empty = !self.follow && self.min_time_ago.is_zero();

        Ok(BuiltQuery {
            filter,
            stop_on_empty,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec_with_terms(terms: &[&str]) -> QuerySpec {
        QuerySpec {
            terms: terms.iter().map(|t| t.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_terms_joined_with_single_spaces() {
        let spec = spec_with_terms(&["connection", "refused", "db-01"]);
        let built = spec.build().unwrap();

        assert_eq!(built.filter.query, "connection refused db-01");
    }

    #[test]
    fn test_empty_terms_rejected() {
        let spec = spec_with_terms(&[]);
        assert_eq!(spec.build().unwrap_err(), QueryError::EmptyQuery);
    }

    #[test]
    fn test_default_lookback_is_48_hours() {
        let spec = spec_with_terms(&["error"]);
        let built = spec.build().unwrap();

        let min_time = built.filter.min_time.unwrap();
        let expected = Utc::now() - chrono::Duration::hours(48);
        let drift = (min_time - expected).num_seconds().abs();
        assert!(drift < 5, "min_time drifted {}s from now-48h", drift);
    }

    #[test]
    fn test_explicit_offset_sets_min_time() {
        let mut spec = spec_with_terms(&["error"]);
        spec.min_time_ago = Duration::from_secs(600);
        let built = spec.build().unwrap();

        let min_time = built.filter.min_time.unwrap();
        let expected = Utc::now() - chrono::Duration::seconds(600);
        let drift = (min_time - expected).num_seconds().abs();
        assert!(drift < 5, "min_time drifted {}s from now-600s", drift);
    }

    #[test]
    fn test_stop_on_empty_truth_table() {
        let mut spec = spec_with_terms(&["error"]);

        // one-shot backward-looking search stops on empty
        spec.follow = false;
        spec.min_time_ago = Duration::ZERO;
        assert!(spec.build().unwrap().stop_on_empty);

        // following search polls instead
        spec.follow = true;
        assert!(!spec.build().unwrap().stop_on_empty);

        // explicit time offset polls even without follow
        spec.follow = false;
        spec.min_time_ago = Duration::from_secs(60);
        assert!(!spec.build().unwrap().stop_on_empty);

        spec.follow = true;
        assert!(!spec.build().unwrap().stop_on_empty);
    }

    #[test]
    fn test_system_and_group_forwarded() {
        let mut spec = spec_with_terms(&["error"]);
        spec.system_id = Some("42".to_string());
        spec.group_id = Some("7".to_string());
        let built = spec.build().unwrap();

        assert_eq!(built.filter.system_id.as_deref(), Some("42"));
        assert_eq!(built.filter.group_id.as_deref(), Some("7"));
    }
}
