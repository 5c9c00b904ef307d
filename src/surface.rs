//! Concrete display surface and external opener for the command line.
//!
//! [`HttpProbeSurface`] stands in for an embedded page view: it fetches the
//! URL and signals completion only if the response succeeded and its
//! headers allow the page to be framed. Pages that refuse embedding stay
//! silent, exactly like a real frame would, and the loader's timer takes it
//! from there.

use std::process::{Command, Stdio};
use std::time::Duration;

use reqwest::header::{CONTENT_SECURITY_POLICY, HeaderMap, X_FRAME_OPTIONS};

use crate::error::{GlanceError, Result};
use crate::loader::{DisplaySurface, LoadSignal};

/// Opens a URL outside the display surface (a browser tab, a new window).
pub trait ExternalOpener: Send + Sync {
    /// Open `url`.
    ///
    /// # Errors
    ///
    /// Returns [`GlanceError::Surface`] if the URL could not be handed off.
    fn open(&self, url: &str) -> Result<()>;
}

/// Opens URLs with the platform's default handler.
///
/// The handler (`open`, `cmd /C start`, `xdg-open`) hands the URL to the
/// desktop and exits; `open` waits for it so no child is left unreaped.
#[derive(Debug, Default, Clone)]
pub struct SystemOpener {
    program: Option<String>,
}

impl SystemOpener {
    /// Use `program <url>` instead of the platform handler.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: Some(program.into()),
        }
    }

    fn command(&self) -> Command {
        if let Some(program) = &self.program {
            return Command::new(program);
        }
        if cfg!(target_os = "macos") {
            Command::new("open")
        } else if cfg!(target_os = "windows") {
            let mut c = Command::new("cmd");
            c.args(["/C", "start", ""]);
            c
        } else {
            Command::new("xdg-open")
        }
    }
}

impl ExternalOpener for SystemOpener {
    fn open(&self, url: &str) -> Result<()> {
        let status = self
            .command()
            .arg(url)
            .stdin(Stdio::null())
            .status()
            .map_err(|e| GlanceError::Surface(format!("failed to open {url}: {e}")))?;
        if !status.success() {
            return Err(GlanceError::Surface(format!(
                "opener exited with {status} for {url}"
            )));
        }
        tracing::debug!(url, "opened outside display surface");
        Ok(())
    }
}

/// A display surface that probes pages over HTTP.
#[derive(Debug, Clone)]
pub struct HttpProbeSurface {
    client: reqwest::Client,
}

impl HttpProbeSurface {
    /// Build a probe surface whose requests time out after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`GlanceError::Surface`] if the HTTP client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("glance/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GlanceError::Surface(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

impl DisplaySurface for HttpProbeSurface {
    fn load(&self, url: &str, signal: LoadSignal) {
        let client = self.client.clone();
        let url = url.to_owned();
        tokio::spawn(async move {
            let response = match client.get(&url).send().await {
                Ok(response) => response,
                Err(e) => {
                    tracing::debug!(%url, error = %e, "probe request failed");
                    return;
                }
            };
            let status = response.status();
            if !status.is_success() {
                tracing::debug!(%url, %status, "probe returned non-success status");
                return;
            }
            if !embedding_allowed(response.headers()) {
                tracing::debug!(%url, "page refuses embedding");
                return;
            }
            signal.complete();
        });
    }
}

/// Whether response headers allow the page to be shown in a foreign frame.
///
/// Refused when `X-Frame-Options` is `DENY`, `SAMEORIGIN`, or `ALLOW-FROM`,
/// or when a `Content-Security-Policy` has a `frame-ancestors` directive
/// without a `*` source.
pub fn embedding_allowed(headers: &HeaderMap) -> bool {
    let frame_options_block = headers.get_all(X_FRAME_OPTIONS).iter().any(|value| {
        value.to_str().is_ok_and(|v| {
            let v = v.trim().to_ascii_lowercase();
            v == "deny" || v == "sameorigin" || v.starts_with("allow-from")
        })
    });
    if frame_options_block {
        return false;
    }

    let csp_block = headers
        .get_all(CONTENT_SECURITY_POLICY)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|policy| policy.split(';'))
        .filter_map(|directive| {
            let mut parts = directive.split_whitespace();
            match parts.next() {
                Some(name) if name.eq_ignore_ascii_case("frame-ancestors") => Some(parts),
                _ => None,
            }
        })
        .any(|mut sources| !sources.any(|s| s == "*"));

    !csp_block
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use reqwest::header::HeaderValue;
    use tokio::sync::oneshot;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn no_headers_allows_embedding() {
        assert!(embedding_allowed(&HeaderMap::new()));
    }

    #[test]
    fn frame_options_block() {
        assert!(!embedding_allowed(&headers(&[("x-frame-options", "DENY")])));
        assert!(!embedding_allowed(&headers(&[("x-frame-options", "sameorigin")])));
        assert!(!embedding_allowed(&headers(&[(
            "x-frame-options",
            "ALLOW-FROM https://a.example"
        )])));
    }

    #[test]
    fn csp_frame_ancestors() {
        assert!(!embedding_allowed(&headers(&[(
            "content-security-policy",
            "default-src 'self'; frame-ancestors 'none'"
        )])));
        assert!(!embedding_allowed(&headers(&[(
            "content-security-policy",
            "frame-ancestors 'self' https://partner.example"
        )])));
        assert!(embedding_allowed(&headers(&[(
            "content-security-policy",
            "frame-ancestors *"
        )])));
        assert!(embedding_allowed(&headers(&[(
            "content-security-policy",
            "default-src 'self'; img-src *"
        )])));
    }

    /// Run one probe and report whether it signalled completion.
    async fn probe(response: ResponseTemplate) -> bool {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(response)
            .mount(&server)
            .await;

        let surface = HttpProbeSurface::new(Duration::from_secs(2)).unwrap();
        let (tx, rx) = oneshot::channel();
        surface.load(&server.uri(), LoadSignal::for_test(tx));
        tokio::time::timeout(Duration::from_secs(5), rx)
            .await
            .expect("probe task finished")
            .is_ok()
    }

    #[tokio::test]
    async fn embeddable_page_completes() {
        assert!(probe(ResponseTemplate::new(200).set_body_string("<html></html>")).await);
    }

    #[tokio::test]
    async fn framing_refused_stays_silent() {
        let response = ResponseTemplate::new(200).insert_header("X-Frame-Options", "DENY");
        assert!(!probe(response).await);
    }

    #[tokio::test]
    async fn error_status_stays_silent() {
        assert!(!probe(ResponseTemplate::new(404)).await);
    }

    #[cfg(unix)]
    #[test]
    fn system_opener_waits_for_handler() {
        assert!(SystemOpener::with_program("true").open("https://a.example").is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn system_opener_reports_failed_handler() {
        let err = SystemOpener::with_program("false")
            .open("https://a.example")
            .unwrap_err();
        assert!(matches!(err, GlanceError::Surface(_)));
        assert!(err.to_string().contains("https://a.example"));
    }

    #[test]
    fn system_opener_missing_program() {
        let err = SystemOpener::with_program("glance-no-such-opener")
            .open("https://a.example")
            .unwrap_err();
        assert!(matches!(err, GlanceError::Surface(_)));
    }
}
