//! Core types for crawl operations.

use std::path::PathBuf;
use std::time::SystemTime;

use crate::site_list::Domain;

/// The conditions that abort a run before any domain is processed.
///
/// Everything else - navigation failures, rename contention, malformed
/// dumps - is absorbed by the loop; only a missing external piece stops
/// the crawl outright.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// Configured browser path does not exist
    #[error("browser executable not found: {}", .0.display())]
    BrowserMissing(PathBuf),

    /// No path configured and no system installation discovered
    #[error("no Brave/Chromium executable found; configure an explicit browser path")]
    BrowserNotFound,

    /// Extension directory does not exist
    #[error("extension directory not found: {}", .0.display())]
    ExtensionMissing(PathBuf),

    /// Site list file does not exist
    #[error("site list not found: {}", .0.display())]
    SiteListMissing(PathBuf),
}

/// The result of one visit attempt. Created once, never mutated, and
/// appended to the ledger by the orchestrator.
#[derive(Debug, Clone)]
pub struct VisitOutcome {
    pub domain: Domain,
    /// URL that actually loaded (`https://...` or the `http://` fallback),
    /// `None` when both attempts failed.
    pub final_url: Option<String>,
    /// Terminal error for the visit. For a protocol-fallback failure this
    /// is the HTTP attempt's error, per the state machine.
    pub error: Option<String>,
    /// Wall-clock start of the visit; anchors the scoped correlation pass.
    pub started_at: SystemTime,
}

impl VisitOutcome {
    #[must_use]
    pub fn loaded(&self) -> bool {
        self.final_url.is_some()
    }

    /// Whether this outcome belongs in the failure log.
    #[must_use]
    pub fn needs_failure_record(&self) -> bool {
        !self.loaded() || self.error.is_some()
    }
}

/// Aggregate counts reported when a run finishes.
#[derive(Debug, Default, Clone, Copy)]
pub struct CrawlSummary {
    /// Visits concluded this run (success or failure)
    pub visited: usize,
    /// Visits recorded in the failure log this run
    pub failed: usize,
    /// Dump files renamed to canonical names this run
    pub renamed: usize,
}
