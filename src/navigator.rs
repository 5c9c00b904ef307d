//! Input routing: URL-or-query classification, redirect unwrapping, and
//! reader-mode rewriting.
//!
//! Free text typed into the address bar is either a direct URL (with a
//! scheme, or a bare domain such as `example.com/path`) or a search phrase.
//! Direct URLs may be rewritten through a reader service; search phrases
//! become a results-page URL of the selected engine and are never
//! rewritten.

use url::Url;

use crate::config::{DEFAULT_READER_ENDPOINT, NavigatorConfig};
use crate::engines::SearchEngine;

/// Hosts whose `/l/` links wrap the real target in a `uddg` parameter.
const REDIRECTOR_DOMAIN: &str = "duckduckgo.com";
const REDIRECT_PATH_PREFIX: &str = "/l/";
const REDIRECT_TARGET_PARAM: &str = "uddg";

/// A resolved navigation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationTarget {
    /// The trimmed user input.
    pub raw_input: String,
    /// Whether the input was recognised as an address rather than a query.
    pub is_direct_url: bool,
    /// The URL handed to the loader.
    pub final_url: String,
}

/// Routes address-bar input to a final URL.
#[derive(Debug, Clone)]
pub struct Navigator {
    reader_endpoint: String,
    default_engine: SearchEngine,
}

impl Default for Navigator {
    fn default() -> Self {
        Self {
            reader_endpoint: DEFAULT_READER_ENDPOINT.to_owned(),
            default_engine: SearchEngine::default(),
        }
    }
}

impl Navigator {
    /// Build a navigator from configuration.
    ///
    /// An unknown `default_engine` id falls back to DuckDuckGo.
    pub fn from_config(config: &NavigatorConfig) -> Self {
        let default_engine = SearchEngine::from_id(&config.default_engine).unwrap_or_else(|| {
            tracing::warn!(
                engine = %config.default_engine,
                "unknown default engine, using DuckDuckGo"
            );
            SearchEngine::default()
        });
        Self {
            reader_endpoint: config.reader_endpoint.clone(),
            default_engine,
        }
    }

    /// Use a different reader-service prefix.
    pub fn with_reader_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.reader_endpoint = endpoint.into();
        self
    }

    /// The engine used when a route names no recognised engine.
    pub fn default_engine(&self) -> SearchEngine {
        self.default_engine
    }

    /// Rewrite `url` through this navigator's reader service.
    pub fn reader_url(&self, url: &str) -> String {
        build_reader_url_with(&self.reader_endpoint, url)
    }

    /// Resolve raw input into a [`NavigationTarget`].
    ///
    /// Returns `None` for blank input. Direct URLs are unwrapped from
    /// search-engine redirect links and, if `reader_mode` is set, rewritten
    /// through the reader service. Anything else becomes a query URL for
    /// `engine_id` (or the default engine when the id is unknown); reader
    /// mode never applies to query URLs.
    pub fn route(
        &self,
        raw_input: &str,
        engine_id: &str,
        reader_mode: bool,
    ) -> Option<NavigationTarget> {
        let trimmed = raw_input.trim();
        if trimmed.is_empty() {
            return None;
        }

        let target = match normalize(trimmed) {
            Some(url) => {
                let url = unwrap_redirect(&url);
                let final_url = if reader_mode {
                    self.reader_url(&url)
                } else {
                    url
                };
                NavigationTarget {
                    raw_input: trimmed.to_owned(),
                    is_direct_url: true,
                    final_url,
                }
            }
            None => {
                let engine = SearchEngine::from_id(engine_id).unwrap_or(self.default_engine);
                NavigationTarget {
                    raw_input: trimmed.to_owned(),
                    is_direct_url: false,
                    final_url: engine.query_url(trimmed),
                }
            }
        };

        tracing::debug!(
            direct = target.is_direct_url,
            reader_mode,
            url = %target.final_url,
            "routed input"
        );
        Some(target)
    }
}

/// Whether `input` looks like an address rather than a search phrase.
///
/// True for a scheme prefix (`word://…`) or a bare domain
/// (`label.tld` with a 2+ letter TLD, optionally followed by `:port` or a
/// path). Input containing whitespace is ambiguous and never a URL.
pub fn classify(input: &str) -> bool {
    if input.is_empty() || input.chars().any(char::is_whitespace) {
        return false;
    }
    has_scheme(input) || is_bare_domain(input)
}

/// Turn address-like input into an absolute URL.
///
/// Input with a scheme is returned unchanged; a bare domain gets `https://`
/// prepended. Anything else is not a URL and yields `None`.
pub fn normalize(input: &str) -> Option<String> {
    if !classify(input) {
        return None;
    }
    if has_scheme(input) {
        Some(input.to_owned())
    } else {
        Some(format!("https://{input}"))
    }
}

/// Extract the real target from a DuckDuckGo `/l/?uddg=` redirect link.
///
/// Any other URL, and any URL that does not parse, is returned unchanged.
pub fn unwrap_redirect(url: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return url.to_owned();
    };
    let is_redirector = parsed
        .host_str()
        .is_some_and(|host| host.ends_with(REDIRECTOR_DOMAIN));
    if !is_redirector || !parsed.path().starts_with(REDIRECT_PATH_PREFIX) {
        return url.to_owned();
    }
    parsed
        .query_pairs()
        .find(|(key, value)| key == REDIRECT_TARGET_PARAM && !value.is_empty())
        .map(|(_, value)| value.into_owned())
        .unwrap_or_else(|| url.to_owned())
}

/// Rewrite `url` through the default reader service.
///
/// ```
/// assert_eq!(
///     glance::navigator::build_reader_url("https://example.com/a?b=1"),
///     "https://r.jina.ai/https://example.com/a?b=1"
/// );
/// ```
pub fn build_reader_url(url: &str) -> String {
    build_reader_url_with(DEFAULT_READER_ENDPOINT, url)
}

/// Rewrite `url` through the reader service at `endpoint`.
///
/// The parsed target's scheme, host (with port), path, query, and fragment
/// are appended to `endpoint`. Input that does not parse has any leading
/// `http://`/`https://` stripped and is assumed to be `https`.
pub fn build_reader_url_with(endpoint: &str, url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => {
            let mut target = format!("{}://", parsed.scheme());
            if let Some(host) = parsed.host_str() {
                target.push_str(host);
            }
            if let Some(port) = parsed.port() {
                target.push_str(&format!(":{port}"));
            }
            target.push_str(parsed.path());
            if let Some(query) = parsed.query().filter(|q| !q.is_empty()) {
                target.push('?');
                target.push_str(query);
            }
            if let Some(fragment) = parsed.fragment().filter(|f| !f.is_empty()) {
                target.push('#');
                target.push_str(fragment);
            }
            format!("{endpoint}{target}")
        }
        Err(_) => format!("{endpoint}https://{}", strip_http_scheme(url)),
    }
}

/// `^\w+://`
fn has_scheme(input: &str) -> bool {
    match input.split_once("://") {
        Some((scheme, _)) => !scheme.is_empty() && scheme.chars().all(is_word_char),
        None => false,
    }
}

/// `^[\w.-]+\.[A-Za-z]{2,}([:/].*)?$`
fn is_bare_domain(input: &str) -> bool {
    let host_end = input
        .find(|c: char| !(is_word_char(c) || c == '.' || c == '-'))
        .unwrap_or(input.len());
    let (host, rest) = input.split_at(host_end);
    if !(rest.is_empty() || rest.starts_with(':') || rest.starts_with('/')) {
        return false;
    }
    match host.rsplit_once('.') {
        Some((label, tld)) => {
            !label.is_empty() && tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic())
        }
        None => false,
    }
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn strip_http_scheme(input: &str) -> &str {
    for prefix in ["https://", "http://"] {
        let matches = input
            .get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix));
        if matches {
            return &input[prefix.len()..];
        }
    }
    input
}
