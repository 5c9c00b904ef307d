//! A single page session: the address bar, the display surface, and the
//! search panel, wired together through injected handles.
//!
//! [`PageSession`] owns everything a session touches. Nothing is global:
//! the surface, the external opener, and the output sink are passed in, and
//! [`PageSession::teardown`] stops any pending load supervision.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use glance_search::{InstantAnswerClient, SearchResult};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::config::GlanceConfig;
use crate::error::Result;
use crate::loader::{DisplaySurface, FallbackOffer, Loader, LoaderEvent};
use crate::navigator::{NavigationTarget, Navigator};
use crate::render::Renderer;
use crate::surface::ExternalOpener;

/// What the search panel ended up showing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Blank query: the welcome placeholder, no request made.
    Welcome,
    /// One or more results.
    Results(Vec<SearchResult>),
    /// The query produced zero results.
    Empty {
        /// The trimmed query.
        query: String,
    },
    /// The request failed; a single status message was rendered in place
    /// of results.
    Failed {
        /// The message shown to the user.
        message: String,
    },
}

/// Most entries a [`History`] keeps; the oldest are dropped first.
pub const HISTORY_LIMIT: usize = 50;

/// Back/forward list of loaded URLs, capped at [`HISTORY_LIMIT`].
#[derive(Debug, Default, Clone)]
pub struct History {
    entries: Vec<String>,
    index: Option<usize>,
}

impl History {
    /// Record a new entry, dropping anything ahead of the current position.
    pub fn push(&mut self, url: &str) {
        if let Some(i) = self.index {
            self.entries.truncate(i + 1);
        }
        self.entries.push(url.to_owned());
        if self.entries.len() > HISTORY_LIMIT {
            let excess = self.entries.len() - HISTORY_LIMIT;
            self.entries.drain(..excess);
        }
        self.index = Some(self.entries.len() - 1);
    }

    /// Step back one entry.
    pub fn back(&mut self) -> Option<&str> {
        let i = self.index.filter(|&i| i > 0)? - 1;
        self.index = Some(i);
        self.entries.get(i).map(String::as_str)
    }

    /// Step forward one entry.
    pub fn forward(&mut self) -> Option<&str> {
        let i = self.index? + 1;
        let entry = self.entries.get(i)?;
        self.index = Some(i);
        Some(entry)
    }

    /// The entry at the current position.
    pub fn current(&self) -> Option<&str> {
        self.entries.get(self.index?).map(String::as_str)
    }

    /// Number of recorded entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One page session.
pub struct PageSession<W: Write> {
    config: GlanceConfig,
    navigator: Navigator,
    loader: Loader,
    opener: Arc<dyn ExternalOpener>,
    renderer: Renderer<W>,
    search: InstantAnswerClient,
    history: History,
    engine_id: String,
    reader_mode: bool,
}

impl<W: Write> PageSession<W> {
    /// Build a session from a configuration and its handles.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the search client
    /// cannot be built.
    pub fn new(
        config: GlanceConfig,
        surface: Arc<dyn DisplaySurface>,
        opener: Arc<dyn ExternalOpener>,
        out: W,
    ) -> Result<Self> {
        config.validate()?;
        let navigator = Navigator::from_config(&config.navigator);
        let loader = Loader::new(
            surface,
            navigator.clone(),
            Duration::from_millis(config.loader.fallback_delay_ms),
        );
        let search = InstantAnswerClient::new(config.search.clone())?;
        let renderer = Renderer::new(out, &config.render);
        Ok(Self {
            engine_id: navigator.default_engine().id().to_owned(),
            reader_mode: config.navigator.reader_mode,
            config,
            navigator,
            loader,
            opener,
            renderer,
            search,
            history: History::default(),
        })
    }

    /// Start the session: load the home page and show the welcome panel.
    ///
    /// # Errors
    ///
    /// Returns an error if the welcome panel cannot be written.
    pub fn init(&mut self) -> Result<()> {
        info!(home = %self.config.navigator.home_url, "page session starting");
        self.go_home();
        self.renderer.render_welcome()
    }

    /// End the session. Pending load waits are cancelled.
    pub fn teardown(&mut self) {
        self.loader.shutdown();
        info!("page session ended");
    }

    /// Subscribe to load events.
    pub fn subscribe(&self) -> broadcast::Receiver<LoaderEvent> {
        self.loader.subscribe()
    }

    /// Navigate to address-bar input.
    ///
    /// Blank input does nothing and returns `None`.
    pub fn navigate(&mut self, input: &str) -> Option<NavigationTarget> {
        let target = self
            .navigator
            .route(input, &self.engine_id, self.reader_mode)?;
        self.open(&target.final_url);
        Some(target)
    }

    /// Run an instant-answer search and render the outcome.
    ///
    /// A blank query renders the welcome panel without any request. Network
    /// and decode failures are rendered as a single status message; only
    /// output errors are returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the outcome cannot be written.
    pub async fn submit_search(&mut self, query: &str) -> Result<SearchOutcome> {
        let query = query.trim();
        if query.is_empty() {
            self.renderer.render_welcome()?;
            return Ok(SearchOutcome::Welcome);
        }

        let outcome = match self.search.search(query).await {
            Ok(results) if results.is_empty() => SearchOutcome::Empty {
                query: query.to_owned(),
            },
            Ok(results) => SearchOutcome::Results(results),
            Err(e) => {
                warn!(error = %e, "instant answer search failed");
                SearchOutcome::Failed {
                    message: format!("Search failed: {e}"),
                }
            }
        };

        match &outcome {
            SearchOutcome::Results(results) => {
                debug!(count = results.len(), "rendering results");
                self.renderer.render_results(results)?;
            }
            SearchOutcome::Empty { query } => self.renderer.render_empty(query)?,
            SearchOutcome::Failed { message } => self.renderer.render_status(message)?,
            SearchOutcome::Welcome => self.renderer.render_welcome()?,
        }
        Ok(outcome)
    }

    /// Load the home page.
    pub fn go_home(&mut self) {
        let home = self.config.navigator.home_url.clone();
        self.open(&home);
    }

    /// Go back one history entry. Returns the URL loaded.
    pub fn back(&mut self) -> Option<String> {
        let url = self.history.back()?.to_owned();
        self.loader.load(&url);
        Some(url)
    }

    /// Go forward one history entry. Returns the URL loaded.
    pub fn forward(&mut self) -> Option<String> {
        let url = self.history.forward()?.to_owned();
        self.loader.load(&url);
        Some(url)
    }

    /// Open the currently loaded URL outside the display surface.
    ///
    /// Returns `false` when nothing is loaded.
    ///
    /// # Errors
    ///
    /// Returns an error if the opener fails.
    pub fn open_current_external(&self) -> Result<bool> {
        match self.loader.current_url() {
            Some(url) => {
                self.opener.open(&url)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Take the "open directly" action of the current fallback offer.
    ///
    /// Returns `false` when no fallback is offered.
    ///
    /// # Errors
    ///
    /// Returns an error if the opener fails.
    pub fn open_fallback_external(&self) -> Result<bool> {
        match self.loader.active_fallback() {
            Some(offer) => {
                info!(url = %offer.open_direct_url, "opening fallback outside surface");
                self.opener.open(&offer.open_direct_url)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Retry the page behind the current fallback offer (or the current
    /// page) through the reader service, and switch reader mode on.
    ///
    /// Returns the reader URL loaded, or `None` when nothing is loaded.
    pub fn retry_with_reader(&mut self) -> Option<String> {
        let url = self
            .loader
            .active_fallback()
            .map(|offer| offer.url)
            .or_else(|| self.loader.current_url())?;
        self.reader_mode = true;
        let reader_url = self.loader.retry_with_reader(&url);
        self.history.push(&reader_url);
        Some(reader_url)
    }

    /// Render the fallback actions for `offer`.
    ///
    /// # Errors
    ///
    /// Returns an error if the output cannot be written.
    pub fn show_fallback(&mut self, offer: &FallbackOffer) -> Result<()> {
        self.renderer.render_fallback(offer)
    }

    /// Toggle reader mode for subsequent direct-URL navigation.
    pub fn set_reader_mode(&mut self, enabled: bool) {
        self.reader_mode = enabled;
    }

    /// Whether reader mode is on.
    pub fn reader_mode(&self) -> bool {
        self.reader_mode
    }

    /// Select the engine for subsequent query navigation.
    pub fn set_engine(&mut self, engine_id: &str) {
        self.engine_id = engine_id.to_owned();
    }

    /// The selected engine id.
    pub fn engine_id(&self) -> &str {
        &self.engine_id
    }

    /// The back/forward list.
    pub fn history(&self) -> &History {
        &self.history
    }

    /// The loader supervising the display surface.
    pub fn loader(&self) -> &Loader {
        &self.loader
    }

    /// The renderer, for inspecting output.
    pub fn renderer(&self) -> &Renderer<W> {
        &self.renderer
    }

    fn open(&mut self, url: &str) {
        self.history.push(url);
        self.loader.load(url);
    }
}
