//! Error types for the glance-search crate.
//!
//! All errors use stable string messages suitable for display to users.
//! Query text never appears in error messages.

/// Errors that can occur while fetching or decoding an instant answer.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The request timed out before the API responded.
    #[error("search timed out: {0}")]
    Timeout(String),

    /// The HTTP request failed or returned a non-success status.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The response body was not a valid instant-answer document.
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid search configuration.
    #[error("config error: {0}")]
    Config(String),
}

/// Convenience type alias for glance-search results.
pub type Result<T> = std::result::Result<T, SearchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_timeout() {
        let err = SearchError::Timeout("exceeded 8s limit".into());
        assert_eq!(err.to_string(), "search timed out: exceeded 8s limit");
    }

    #[test]
    fn display_http() {
        let err = SearchError::Http("status 503".into());
        assert_eq!(err.to_string(), "HTTP error: status 503");
    }

    #[test]
    fn display_parse() {
        let err = SearchError::Parse("expected value at line 1".into());
        assert_eq!(err.to_string(), "parse error: expected value at line 1");
    }

    #[test]
    fn display_config() {
        let err = SearchError::Config("max_results must be greater than 0".into());
        assert_eq!(
            err.to_string(),
            "config error: max_results must be greater than 0"
        );
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SearchError>();
    }
}
