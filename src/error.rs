//! Error types for glance.

/// Top-level error type for the mini browser.
#[derive(Debug, thiserror::Error)]
pub enum GlanceError {
    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Instant-answer search error.
    #[error("search error: {0}")]
    Search(#[from] glance_search::SearchError),

    /// Display surface or external opener error.
    #[error("surface error: {0}")]
    Surface(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, GlanceError>;
