//! Terminal rendering of result cards and placeholder states.
//!
//! Each `render_*` call except [`Renderer::render_fallback`] starts a new
//! panel. With [`RenderConfig::clear_screen`] set, an ANSI clear sequence is
//! written first so earlier output disappears. The default leaves it unset:
//! nothing is cleared and each panel is appended after the previous one,
//! which keeps piped output and logs intact.

use std::io::Write;

use glance_search::SearchResult;

use crate::config::RenderConfig;
use crate::error::Result;
use crate::loader::FallbackOffer;

/// ANSI: clear screen, cursor home.
const CLEAR_SEQUENCE: &str = "\x1b[2J\x1b[H";

/// Writes cards and status messages to an output sink.
///
/// "Replacing" prior content only erases it when `clear_screen` is on;
/// otherwise the new panel is written below the old one.
pub struct Renderer<W: Write> {
    out: W,
    clear_screen: bool,
}

impl<W: Write> Renderer<W> {
    /// Create a renderer writing to `out`.
    pub fn new(out: W, config: &RenderConfig) -> Self {
        Self {
            out,
            clear_screen: config.clear_screen,
        }
    }

    /// Borrow the output sink.
    pub fn get_ref(&self) -> &W {
        &self.out
    }

    /// Consume the renderer, returning the output sink.
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Start a panel with one card per result.
    pub fn render_results(&mut self, results: &[SearchResult]) -> Result<()> {
        self.clear()?;
        for (i, result) in results.iter().enumerate() {
            if i > 0 {
                writeln!(self.out)?;
            }
            writeln!(self.out, "{}", result.title)?;
            if !result.description.is_empty() && result.description != result.title {
                writeln!(self.out, "  {}", result.description)?;
            }
            writeln!(self.out, "  open in new tab: {}", result.url)?;
        }
        self.out.flush()?;
        Ok(())
    }

    /// Placeholder shown before any query has been run.
    pub fn render_welcome(&mut self) -> Result<()> {
        self.clear()?;
        writeln!(self.out, "Search the web")?;
        writeln!(
            self.out,
            "  Type a query for instant answers, or an address to open it."
        )?;
        self.out.flush()?;
        Ok(())
    }

    /// Placeholder shown when a query produced zero results.
    pub fn render_empty(&mut self, query: &str) -> Result<()> {
        self.clear()?;
        writeln!(self.out, "No instant answers for \"{query}\"")?;
        writeln!(self.out, "  Try a broader query or open a full search page.")?;
        self.out.flush()?;
        Ok(())
    }

    /// Start a panel holding a single user-facing status line.
    pub fn render_status(&mut self, message: &str) -> Result<()> {
        self.clear()?;
        writeln!(self.out, "{message}")?;
        self.out.flush()?;
        Ok(())
    }

    /// Fallback actions for a page that did not signal a completed load.
    ///
    /// Appended below the current content rather than replacing it.
    pub fn render_fallback(&mut self, offer: &FallbackOffer) -> Result<()> {
        writeln!(self.out, "Embedding may be blocked by the site.")?;
        writeln!(
            self.out,
            "  Some websites disallow being shown inside other pages."
        )?;
        writeln!(self.out, "  open in new tab: {}", offer.open_direct_url)?;
        writeln!(self.out, "  try reader mode: {}", offer.reader_url)?;
        self.out.flush()?;
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        if self.clear_screen {
            self.out.write_all(CLEAR_SEQUENCE.as_bytes())?;
        }
        Ok(())
    }
}
