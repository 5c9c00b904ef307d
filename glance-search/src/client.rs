//! Instant-answer API client.
//!
//! Issues `GET {endpoint}?q=…&format=json&no_redirect=1&no_html=1` and
//! decodes the body into an [`InstantAnswer`]. A request has three
//! outcomes: a decodable body, an undecodable body ([`SearchError::Parse`]),
//! or a transport/status failure ([`SearchError::Http`] or
//! [`SearchError::Timeout`]).

use crate::assemble::assemble_with_depth;
use crate::config::SearchConfig;
use crate::error::{Result, SearchError};
use crate::http;
use crate::types::{InstantAnswer, SearchResult};

/// Client for the DuckDuckGo instant-answer API.
#[derive(Debug, Clone)]
pub struct InstantAnswerClient {
    client: reqwest::Client,
    config: SearchConfig,
}

impl InstantAnswerClient {
    /// Create a client from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if `config` is invalid, or
    /// [`SearchError::Http`] if the HTTP client cannot be built.
    pub fn new(config: SearchConfig) -> Result<Self> {
        config.validate()?;
        let client = http::build_client(&config)?;
        Ok(Self { client, config })
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Fetch the raw instant answer for `query`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Timeout`] or [`SearchError::Http`] when the
    /// request fails or the status is not a success, and
    /// [`SearchError::Parse`] when the body is not an instant-answer object.
    pub async fn fetch(&self, query: &str) -> Result<InstantAnswer> {
        tracing::trace!(query, "instant answer request");

        let response = self
            .client
            .get(&self.config.endpoint)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("no_redirect", "1"),
                ("no_html", "1"),
            ])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SearchError::Timeout(format!(
                        "no response within {}s",
                        self.config.timeout_seconds
                    ))
                } else {
                    SearchError::Http(format!("instant answer request failed: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Http(format!(
                "instant answer returned status {status}"
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SearchError::Http(format!("instant answer read failed: {e}")))?;

        tracing::trace!(bytes = body.len(), "instant answer received");

        serde_json::from_str(&body)
            .map_err(|e| SearchError::Parse(format!("instant answer body: {e}")))
    }

    /// Fetch and assemble results for `query`.
    ///
    /// A blank query returns no results without issuing a request.
    /// Results are truncated to `max_results`.
    ///
    /// # Errors
    ///
    /// Same as [`InstantAnswerClient::fetch`].
    pub async fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let answer = self.fetch(query).await?;
        let mut results = assemble_with_depth(&answer, query, self.config.max_topic_depth);
        results.truncate(self.config.max_results);
        Ok(results)
    }
}
