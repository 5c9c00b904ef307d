//! Search configuration with sensible defaults.
//!
//! [`SearchConfig`] controls the instant-answer endpoint, request timeout,
//! result limits, and how deep grouped related topics are followed.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::SearchError;

/// Public DuckDuckGo instant-answer endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.duckduckgo.com/";

/// Default bound on related-topic group nesting.
pub const DEFAULT_MAX_TOPIC_DEPTH: usize = 8;

/// Configuration for an instant-answer search.
///
/// Use [`Default::default()`] for sensible defaults, or construct with
/// field overrides for custom behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Instant-answer API endpoint. Query parameters are appended to it.
    pub endpoint: String,
    /// HTTP request timeout in seconds.
    pub timeout_seconds: u64,
    /// Maximum number of results kept after assembly.
    pub max_results: usize,
    /// Maximum nesting depth followed inside grouped related topics.
    /// Groups deeper than this are skipped.
    pub max_topic_depth: usize,
    /// Custom User-Agent string. If `None`, the crate name and version are sent.
    pub user_agent: Option<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            timeout_seconds: 8,
            max_results: 50,
            max_topic_depth: DEFAULT_MAX_TOPIC_DEPTH,
            user_agent: None,
        }
    }
}

impl SearchConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `endpoint` must be an absolute `http`/`https` URL
    /// - `timeout_seconds` must be greater than 0
    /// - `max_results` must be greater than 0
    /// - `max_topic_depth` must be greater than 0
    pub fn validate(&self) -> Result<(), SearchError> {
        match Url::parse(&self.endpoint) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(_) => {
                return Err(SearchError::Config(
                    "endpoint must use http or https".into(),
                ));
            }
            Err(e) => {
                return Err(SearchError::Config(format!("endpoint is not a URL: {e}")));
            }
        }
        if self.timeout_seconds == 0 {
            return Err(SearchError::Config(
                "timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.max_results == 0 {
            return Err(SearchError::Config(
                "max_results must be greater than 0".into(),
            ));
        }
        if self.max_topic_depth == 0 {
            return Err(SearchError::Config(
                "max_topic_depth must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}
