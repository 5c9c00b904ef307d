//! # glance-search
//!
//! Instant-answer search for glance.
//!
//! This crate queries the public DuckDuckGo instant-answer API and turns its
//! loosely-structured JSON into a flat list of display results. It compiles
//! into glance's binary as a library dependency.
//!
//! ## Design
//!
//! - One GET per search; no retries, no caching
//! - The abstract answer comes first, then direct results, then related
//!   topics flattened depth-first with a bounded nesting depth
//! - Results are deduplicated by URL, first occurrence wins
//! - Missing or mistyped response fields yield zero results for that
//!   category rather than an error
//!
//! ## Security
//!
//! - No API keys or secrets
//! - Search queries are logged only at trace level
//! - Markup is stripped from API text fields before returning

pub mod assemble;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod markup;
pub mod types;

pub use assemble::assemble;
pub use client::InstantAnswerClient;
pub use config::SearchConfig;
pub use error::{Result, SearchError};
pub use markup::strip_markup;
pub use types::{InstantAnswer, SearchResult, Topic};

/// Search the instant-answer API and assemble display results.
///
/// A blank query returns an empty list without touching the network.
///
/// # Errors
///
/// Returns [`SearchError::Config`] if `config` is invalid, and the errors of
/// [`InstantAnswerClient::fetch`] otherwise.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> glance_search::Result<()> {
/// let config = glance_search::SearchConfig::default();
/// let results = glance_search::search("rust programming", &config).await?;
/// for result in &results {
///     println!("{}: {}", result.title, result.url);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn search(query: &str, config: &SearchConfig) -> Result<Vec<SearchResult>> {
    config.validate()?;
    if query.trim().is_empty() {
        return Ok(Vec::new());
    }
    InstantAnswerClient::new(config.clone())?.search(query).await
}

/// Search with the default configuration.
///
/// Convenience wrapper around [`search`] using [`SearchConfig::default()`].
///
/// # Errors
///
/// Same as [`search`].
pub async fn search_default(query: &str) -> Result<Vec<SearchResult>> {
    search(query, &SearchConfig::default()).await
}
