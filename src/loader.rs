//! Display surface load supervision with a fallback timer.
//!
//! [`Loader::load`] hands a URL to the [`DisplaySurface`] and waits a fixed
//! delay for the surface's completion signal. If the signal arrives first,
//! the wait is cancelled and nothing else happens. If the delay elapses, a
//! [`FallbackOffer`] is raised: open the URL outside the surface, or retry
//! through the reader service. The offer stays up until a completion signal
//! finally arrives or the next load replaces it.
//!
//! Sites that refuse embedding give no explicit error, only silence, and a
//! slow site looks the same. The timer is therefore a best-effort
//! heuristic: false positives and false negatives are expected.
//!
//! # Usage
//!
//! ```rust,ignore
//! let loader = Loader::new(surface, navigator, Duration::from_millis(1_600));
//! let mut events = loader.subscribe();
//! loader.load("https://example.com/");
//! ```

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::{broadcast, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::navigator::Navigator;

/// Capacity of the loader event channel.
const EVENT_CHANNEL_CAPACITY: usize = 32;

/// Completion handle passed to a [`DisplaySurface`] with each load.
///
/// Call [`complete`](Self::complete) once the page has finished loading.
/// Dropping the signal without completing it means "no signal": the
/// fallback timer still runs to its deadline.
#[derive(Debug)]
pub struct LoadSignal {
    tx: oneshot::Sender<()>,
}

impl LoadSignal {
    /// Report that the load finished.
    pub fn complete(self) {
        // The watcher may already be gone (superseded or shut down).
        let _ = self.tx.send(());
    }

    /// Wrap a bare sender, for surface tests that run without a [`Loader`].
    #[cfg(test)]
    pub(crate) fn for_test(tx: oneshot::Sender<()>) -> Self {
        Self { tx }
    }
}

/// Something that can show a page and report when it finished loading.
pub trait DisplaySurface: Send + Sync {
    /// Start loading `url`, replacing whatever is shown.
    ///
    /// Must not block. Report completion through `signal`, at most once.
    fn load(&self, url: &str, signal: LoadSignal);
}

/// Fallback actions offered when a load produced no completion signal in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackOffer {
    /// The URL that appeared not to load.
    pub url: String,
    /// URL to open outside the display surface.
    pub open_direct_url: String,
    /// Reader-service URL for a retry.
    pub reader_url: String,
}

/// Events emitted by the [`Loader`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoaderEvent {
    /// A load started; any fallback offer was cleared.
    Loading {
        /// The URL being loaded.
        url: String,
    },
    /// The surface reported completion; any fallback offer was cleared.
    Loaded {
        /// The URL that finished.
        url: String,
    },
    /// No completion signal arrived before the fallback delay.
    FallbackOffered(FallbackOffer),
}

#[derive(Debug, Default)]
struct LoadState {
    /// Incremented per load; watchers of older loads must not touch state.
    generation: u64,
    current_url: Option<String>,
    fallback: Option<FallbackOffer>,
    pending: Option<CancellationToken>,
}

/// Supervises loads on a single display surface.
pub struct Loader {
    surface: Arc<dyn DisplaySurface>,
    navigator: Navigator,
    fallback_delay: Duration,
    events: broadcast::Sender<LoaderEvent>,
    state: Arc<Mutex<LoadState>>,
    cancel: CancellationToken,
}

impl Loader {
    /// Create a loader for `surface`.
    ///
    /// `navigator` supplies the reader-service rewrite used for fallback
    /// offers and [`retry_with_reader`](Self::retry_with_reader).
    pub fn new(
        surface: Arc<dyn DisplaySurface>,
        navigator: Navigator,
        fallback_delay: Duration,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            surface,
            navigator,
            fallback_delay,
            events,
            state: Arc::new(Mutex::new(LoadState::default())),
            cancel: CancellationToken::new(),
        }
    }

    /// Subscribe to loader events.
    pub fn subscribe(&self) -> broadcast::Receiver<LoaderEvent> {
        self.events.subscribe()
    }

    /// The fallback delay.
    pub fn fallback_delay(&self) -> Duration {
        self.fallback_delay
    }

    /// The URL most recently handed to the surface.
    pub fn current_url(&self) -> Option<String> {
        self.lock_state().current_url.clone()
    }

    /// The fallback offer currently shown, if any.
    pub fn active_fallback(&self) -> Option<FallbackOffer> {
        self.lock_state().fallback.clone()
    }

    /// Load `url` on the surface and arm the fallback timer.
    ///
    /// Supersedes any pending load: its timer is cancelled and a late
    /// completion signal from it is ignored. Must be called from within a
    /// Tokio runtime.
    pub fn load(&self, url: &str) {
        let (tx, rx) = oneshot::channel();
        let token = self.cancel.child_token();

        let generation = {
            let mut state = self.lock_state();
            if let Some(previous) = state.pending.replace(token.clone()) {
                previous.cancel();
            }
            state.generation += 1;
            state.current_url = Some(url.to_owned());
            state.fallback = None;
            let _ = self.events.send(LoaderEvent::Loading {
                url: url.to_owned(),
            });
            state.generation
        };

        debug!(url, generation, "loading on display surface");
        self.surface.load(url, LoadSignal { tx });

        let watcher = Watcher {
            url: url.to_owned(),
            reader_url: self.navigator.reader_url(url),
            generation,
            delay: self.fallback_delay,
            events: self.events.clone(),
            state: Arc::clone(&self.state),
        };
        tokio::spawn(watcher.run(rx, token));
    }

    /// Retry `url` through the reader service. Returns the reader URL loaded.
    pub fn retry_with_reader(&self, url: &str) -> String {
        let reader_url = self.navigator.reader_url(url);
        info!(url, "retrying through reader service");
        self.load(&reader_url);
        reader_url
    }

    /// Cancel any pending wait. Later loads are no longer supervised.
    pub fn shutdown(&self) {
        self.cancel.cancel();
        self.lock_state().pending = None;
        debug!("loader shut down");
    }

    fn lock_state(&self) -> MutexGuard<'_, LoadState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Drop for Loader {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Fallback timer for a single load.
struct Watcher {
    url: String,
    reader_url: String,
    generation: u64,
    delay: Duration,
    events: broadcast::Sender<LoaderEvent>,
    state: Arc<Mutex<LoadState>>,
}

impl Watcher {
    async fn run(self, mut done: oneshot::Receiver<()>, cancel: CancellationToken) {
        let deadline = tokio::time::sleep(self.delay);
        tokio::pin!(deadline);
        let mut signal_dropped = false;
        let mut fallback_shown = false;

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!(url = %self.url, "load wait cancelled");
                    return;
                }
                res = &mut done, if !signal_dropped => match res {
                    Ok(()) => {
                        self.finish();
                        return;
                    }
                    Err(_) => {
                        debug!(url = %self.url, "surface dropped completion signal");
                        signal_dropped = true;
                    }
                },
                _ = &mut deadline, if !fallback_shown => {
                    fallback_shown = true;
                    self.offer_fallback();
                }
            }

            if signal_dropped && fallback_shown {
                return;
            }
        }
    }

    fn finish(&self) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.generation != self.generation {
            return;
        }
        state.fallback = None;
        state.pending = None;
        debug!(url = %self.url, "load completed");
        let _ = self.events.send(LoaderEvent::Loaded {
            url: self.url.clone(),
        });
    }

    fn offer_fallback(&self) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.generation != self.generation {
            return;
        }
        let offer = FallbackOffer {
            url: self.url.clone(),
            open_direct_url: self.url.clone(),
            reader_url: self.reader_url.clone(),
        };
        info!(
            url = %self.url,
            delay_ms = self.delay.as_millis() as u64,
            "no load signal before deadline; embedding may be blocked"
        );
        state.fallback = Some(offer.clone());
        let _ = self.events.send(LoaderEvent::FallbackOffered(offer));
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    const DELAY: Duration = Duration::from_millis(1_600);

    /// Records loads; optionally completes them immediately.
    #[derive(Default)]
    struct RecordingSurface {
        auto_complete: bool,
        loads: Mutex<Vec<String>>,
        signals: Mutex<Vec<LoadSignal>>,
    }

    impl RecordingSurface {
        fn completing() -> Self {
            Self {
                auto_complete: true,
                ..Default::default()
            }
        }

        fn loads(&self) -> Vec<String> {
            self.loads.lock().unwrap().clone()
        }

        fn complete_last(&self) {
            let signal = self.signals.lock().unwrap().pop().expect("pending signal");
            signal.complete();
        }

        fn drop_signals(&self) {
            self.signals.lock().unwrap().clear();
        }
    }

    impl DisplaySurface for RecordingSurface {
        fn load(&self, url: &str, signal: LoadSignal) {
            self.loads.lock().unwrap().push(url.to_owned());
            if self.auto_complete {
                signal.complete();
            } else {
                self.signals.lock().unwrap().push(signal);
            }
        }
    }

    fn loader_with(surface: &Arc<RecordingSurface>) -> Loader {
        let surface: Arc<dyn DisplaySurface> = surface.clone();
        Loader::new(surface, Navigator::default(), DELAY)
    }

    fn drain(rx: &mut broadcast::Receiver<LoaderEvent>) -> Vec<LoaderEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    fn has_fallback(events: &[LoaderEvent]) -> bool {
        events
            .iter()
            .any(|e| matches!(e, LoaderEvent::FallbackOffered(_)))
    }

    #[tokio::test(start_paused = true)]
    async fn completion_before_deadline_never_shows_fallback() {
        let surface = Arc::new(RecordingSurface::completing());
        let loader = loader_with(&surface);
        let mut rx = loader.subscribe();

        loader.load("https://example.com/");
        tokio::time::sleep(DELAY * 3).await;

        let events = drain(&mut rx);
        assert_eq!(
            events,
            vec![
                LoaderEvent::Loading {
                    url: "https://example.com/".into()
                },
                LoaderEvent::Loaded {
                    url: "https://example.com/".into()
                },
            ]
        );
        assert!(loader.active_fallback().is_none());
        assert_eq!(surface.loads(), vec!["https://example.com/"]);
    }

    #[tokio::test(start_paused = true)]
    async fn silence_past_deadline_offers_fallback() {
        let surface = Arc::new(RecordingSurface::default());
        let loader = loader_with(&surface);
        let mut rx = loader.subscribe();

        loader.load("https://blocked.example/");
        tokio::time::sleep(DELAY / 2).await;
        assert!(!has_fallback(&drain(&mut rx)));

        tokio::time::sleep(DELAY).await;
        let events = drain(&mut rx);
        let expected = FallbackOffer {
            url: "https://blocked.example/".into(),
            open_direct_url: "https://blocked.example/".into(),
            reader_url: "https://r.jina.ai/https://blocked.example/".into(),
        };
        assert_eq!(events, vec![LoaderEvent::FallbackOffered(expected.clone())]);
        assert_eq!(loader.active_fallback(), Some(expected));
    }

    #[tokio::test(start_paused = true)]
    async fn late_completion_clears_fallback() {
        let surface = Arc::new(RecordingSurface::default());
        let loader = loader_with(&surface);
        let mut rx = loader.subscribe();

        loader.load("https://slow.example/");
        tokio::time::sleep(DELAY * 2).await;
        assert!(loader.active_fallback().is_some());

        surface.complete_last();
        tokio::time::sleep(Duration::from_millis(10)).await;

        let events = drain(&mut rx);
        assert!(matches!(
            events.last(),
            Some(LoaderEvent::Loaded { url }) if url == "https://slow.example/"
        ));
        assert!(loader.active_fallback().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_signal_still_reaches_deadline() {
        let surface = Arc::new(RecordingSurface::default());
        let loader = loader_with(&surface);
        let mut rx = loader.subscribe();

        loader.load("https://gone.example/");
        surface.drop_signals();
        tokio::time::sleep(DELAY * 2).await;

        assert!(has_fallback(&drain(&mut rx)));
    }

    #[tokio::test(start_paused = true)]
    async fn retry_with_reader_loads_reader_url() {
        let surface = Arc::new(RecordingSurface::completing());
        let loader = loader_with(&surface);

        let reader = loader.retry_with_reader("https://example.com/a?b=1");
        assert_eq!(reader, "https://r.jina.ai/https://example.com/a?b=1");
        assert_eq!(surface.loads(), vec![reader.clone()]);
        assert_eq!(loader.current_url(), Some(reader));
    }

    #[tokio::test(start_paused = true)]
    async fn new_load_supersedes_pending_one() {
        let surface = Arc::new(RecordingSurface::default());
        let loader = loader_with(&surface);
        let mut rx = loader.subscribe();

        loader.load("https://first.example/");
        tokio::time::sleep(DELAY / 2).await;
        loader.load("https://second.example/");
        surface.complete_last();
        tokio::time::sleep(DELAY * 3).await;

        let events = drain(&mut rx);
        assert!(!has_fallback(&events), "superseded load raised a fallback");
        assert!(matches!(
            events.last(),
            Some(LoaderEvent::Loaded { url }) if url == "https://second.example/"
        ));
        assert_eq!(loader.current_url().as_deref(), Some("https://second.example/"));
    }

    #[tokio::test(start_paused = true)]
    async fn stale_completion_is_ignored() {
        let surface = Arc::new(RecordingSurface::default());
        let loader = loader_with(&surface);
        let mut rx = loader.subscribe();

        loader.load("https://first.example/");
        let first_signal = surface.signals.lock().unwrap().remove(0);
        loader.load("https://second.example/");
        first_signal.complete();
        tokio::time::sleep(Duration::from_millis(10)).await;

        let events = drain(&mut rx);
        assert!(
            !events.iter().any(|e| matches!(e, LoaderEvent::Loaded { .. })),
            "stale completion reported: {events:?}"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_cancels_pending_wait() {
        let surface = Arc::new(RecordingSurface::default());
        let loader = loader_with(&surface);
        let mut rx = loader.subscribe();

        loader.load("https://example.com/");
        loader.shutdown();
        tokio::time::sleep(DELAY * 2).await;

        assert!(!has_fallback(&drain(&mut rx)));
    }

    #[test]
    fn loader_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Loader>();
    }
}
