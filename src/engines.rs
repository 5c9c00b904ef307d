//! Search engines selectable for non-URL input.

use std::fmt;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Serialize};

/// Bytes escaped in a query component: everything except ASCII
/// alphanumerics and `- _ . ! ~ * ' ( )`, matching a browser's
/// `encodeURIComponent`.
const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// A web search engine whose results page can be loaded directly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SearchEngine {
    /// DuckDuckGo Lite. No JavaScript, embeds well.
    #[default]
    DuckDuckGo,
    /// Brave Search.
    Brave,
    /// Google.
    Google,
    /// Bing.
    Bing,
}

impl SearchEngine {
    /// Short identifier used in config files and on the command line.
    pub fn id(&self) -> &'static str {
        match self {
            Self::DuckDuckGo => "duck",
            Self::Brave => "brave",
            Self::Google => "google",
            Self::Bing => "bing",
        }
    }

    /// Returns the human-readable name of this engine.
    pub fn name(&self) -> &'static str {
        match self {
            Self::DuckDuckGo => "DuckDuckGo",
            Self::Brave => "Brave",
            Self::Google => "Google",
            Self::Bing => "Bing",
        }
    }

    /// Results page URL, up to and including the `q=` parameter.
    fn query_base(&self) -> &'static str {
        match self {
            Self::DuckDuckGo => "https://lite.duckduckgo.com/lite/?q=",
            Self::Brave => "https://search.brave.com/search?q=",
            Self::Google => "https://www.google.com/search?q=",
            Self::Bing => "https://www.bing.com/search?q=",
        }
    }

    /// Build the results page URL for `query`, percent-encoding it as a
    /// single URL component.
    pub fn query_url(&self, query: &str) -> String {
        format!(
            "{}{}",
            self.query_base(),
            utf8_percent_encode(query, QUERY_COMPONENT)
        )
    }

    /// Look up an engine by its [`id`](Self::id).
    pub fn from_id(id: &str) -> Option<Self> {
        Self::all().iter().copied().find(|e| e.id() == id)
    }

    /// Returns all available engine variants.
    pub fn all() -> &'static [SearchEngine] {
        &[Self::DuckDuckGo, Self::Brave, Self::Google, Self::Bing]
    }
}

impl fmt::Display for SearchEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_duckduckgo() {
        assert_eq!(SearchEngine::default(), SearchEngine::DuckDuckGo);
    }

    #[test]
    fn from_id_round_trips_every_engine() {
        for engine in SearchEngine::all() {
            assert_eq!(SearchEngine::from_id(engine.id()), Some(*engine));
        }
    }

    #[test]
    fn from_id_unknown_is_none() {
        assert_eq!(SearchEngine::from_id("yahoo"), None);
        assert_eq!(SearchEngine::from_id(""), None);
    }

    #[test]
    fn query_url_encodes_component() {
        assert_eq!(
            SearchEngine::DuckDuckGo.query_url("rust & c++"),
            "https://lite.duckduckgo.com/lite/?q=rust%20%26%20c%2B%2B"
        );
        assert_eq!(
            SearchEngine::Bing.query_url("a/b?c"),
            "https://www.bing.com/search?q=a%2Fb%3Fc"
        );
    }

    #[test]
    fn query_url_keeps_component_safe_marks() {
        assert_eq!(
            SearchEngine::DuckDuckGo.query_url("what's (new)!*~"),
            "https://lite.duckduckgo.com/lite/?q=what's%20(new)!*~"
        );
        assert_eq!(
            SearchEngine::Google.query_url("caf\u{e9} a-b_c.d"),
            "https://www.google.com/search?q=caf%C3%A9%20a-b_c.d"
        );
    }

    #[test]
    fn query_url_per_engine() {
        assert!(SearchEngine::Brave.query_url("x").starts_with("https://search.brave.com/"));
        assert!(SearchEngine::Google.query_url("x").starts_with("https://www.google.com/"));
    }

    #[test]
    fn display_uses_name() {
        assert_eq!(SearchEngine::DuckDuckGo.to_string(), "DuckDuckGo");
        assert_eq!(SearchEngine::Bing.to_string(), "Bing");
    }
}
