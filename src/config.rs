//! Configuration types for the mini browser.

use std::path::{Path, PathBuf};

use glance_search::SearchConfig;
use serde::{Deserialize, Serialize};

use crate::engines::SearchEngine;
use crate::error::{GlanceError, Result};

/// Default reader-service prefix.
pub const DEFAULT_READER_ENDPOINT: &str = "https://r.jina.ai/";

/// Default home page.
pub const DEFAULT_HOME_URL: &str = "https://lite.duckduckgo.com/lite/";

/// Default wait for a load-completion signal before offering fallbacks.
pub const DEFAULT_FALLBACK_DELAY_MS: u64 = 1_600;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlanceConfig {
    /// Input routing and reader mode.
    pub navigator: NavigatorConfig,
    /// Display surface load supervision.
    pub loader: LoaderConfig,
    /// Instant-answer search.
    pub search: SearchConfig,
    /// Terminal output.
    pub render: RenderConfig,
}

/// Navigator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigatorConfig {
    /// Engine id used for search queries (`duck`, `brave`, `google`, `bing`).
    /// Unknown ids fall back to DuckDuckGo at routing time.
    pub default_engine: String,
    /// Whether reader mode starts enabled.
    pub reader_mode: bool,
    /// Reader-service prefix; the target URL is appended verbatim.
    pub reader_endpoint: String,
    /// Page loaded on session start and by "home".
    pub home_url: String,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            default_engine: SearchEngine::default().id().to_owned(),
            reader_mode: false,
            reader_endpoint: DEFAULT_READER_ENDPOINT.to_owned(),
            home_url: DEFAULT_HOME_URL.to_owned(),
        }
    }
}

/// Loader configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Milliseconds to wait for a completion signal before offering fallbacks.
    pub fallback_delay_ms: u64,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            fallback_delay_ms: DEFAULT_FALLBACK_DELAY_MS,
        }
    }
}

/// Terminal rendering configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Emit an ANSI clear-screen sequence before each full redraw.
    pub clear_screen: bool,
}

impl GlanceConfig {
    /// Load configuration from a TOML file, falling back to defaults for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| GlanceError::Config(e.to_string()))
    }

    /// Load `explicit` if given, else the default config file if it exists,
    /// else the built-in defaults. The result is validated.
    ///
    /// # Errors
    ///
    /// Returns an error if a file exists but cannot be read, parsed, or validated.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => {
                let path = default_config_path();
                if path.is_file() {
                    tracing::debug!(path = %path.display(), "loading default config file");
                    Self::from_file(&path)?
                } else {
                    Self::default()
                }
            }
        };
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| GlanceError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate every section.
    ///
    /// # Errors
    ///
    /// Returns [`GlanceError::Config`] naming the first invalid field.
    pub fn validate(&self) -> Result<()> {
        if url::Url::parse(&self.navigator.reader_endpoint).is_err() {
            return Err(GlanceError::Config(
                "navigator.reader_endpoint must be an absolute URL".into(),
            ));
        }
        if url::Url::parse(&self.navigator.home_url).is_err() {
            return Err(GlanceError::Config(
                "navigator.home_url must be an absolute URL".into(),
            ));
        }
        if self.loader.fallback_delay_ms == 0 {
            return Err(GlanceError::Config(
                "loader.fallback_delay_ms must be greater than 0".into(),
            ));
        }
        self.search
            .validate()
            .map_err(|e| GlanceError::Config(format!("search: {e}")))
    }
}

/// Application config directory.
///
/// Resolves to `dirs::config_dir()/glance/` by default. Override with
/// the `GLANCE_CONFIG_DIR` environment variable.
#[must_use]
pub fn config_dir() -> PathBuf {
    if let Some(override_dir) = std::env::var_os("GLANCE_CONFIG_DIR") {
        return PathBuf::from(override_dir);
    }
    dirs::config_dir()
        .map(|d| d.join("glance"))
        .unwrap_or_else(|| PathBuf::from("/tmp/glance-config"))
}

/// Returns the default config file path: `config_dir()/config.toml`.
#[must_use]
pub fn default_config_path() -> PathBuf {
    config_dir().join("config.toml")
}
