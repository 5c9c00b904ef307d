//! Glance: a small address-bar browser with an instant-answer panel.
//!
//! Two pipelines share one session:
//!
//! - **Navigation**: address-bar input is classified as a URL or a query,
//!   normalized, unwrapped from search-engine redirects, optionally routed
//!   through a reader service, and handed to a display surface. A
//!   [`Loader`] watches each load and offers fallback actions when the
//!   surface never signals completion.
//! - **Search**: a query is sent to the instant-answer endpoint and the
//!   response is assembled into deduplicated result cards
//!   (see [`glance_search`]), then drawn by a [`Renderer`].

pub mod config;
pub mod engines;
pub mod error;
pub mod loader;
pub mod navigator;
pub mod render;
pub mod session;
pub mod surface;

pub use config::GlanceConfig;
pub use engines::SearchEngine;
pub use error::{GlanceError, Result};
pub use loader::{DisplaySurface, FallbackOffer, LoadSignal, Loader, LoaderEvent};
pub use navigator::{NavigationTarget, Navigator};
pub use render::Renderer;
pub use session::{HISTORY_LIMIT, History, PageSession, SearchOutcome};
pub use surface::{ExternalOpener, HttpProbeSurface, SystemOpener};
