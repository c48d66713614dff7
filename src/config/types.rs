//! Core configuration type for crawl runs.
//!
//! One immutable `CrawlConfig` is constructed at startup and passed by
//! reference into each component; nothing reads global state.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for a bulk crawl run.
///
/// Built once via [`CrawlConfig::builder`](crate::config::CrawlConfigBuilder);
/// the builder enforces the required paths at compile time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlConfig {
    /// Browser executable. `None` means discover a system
    /// Brave/Chromium installation at startup.
    pub(crate) browser_path: Option<PathBuf>,

    /// Unpacked measurement extension (directory with `manifest.json`).
    /// Missing at startup is fatal.
    pub(crate) extension_dir: PathBuf,

    /// Persistent browser profile. The downloads directory and both
    /// ledger files live underneath it, so the whole crawl state moves
    /// with this one directory.
    pub(crate) profile_dir: PathBuf,

    /// Free-text site list, one candidate per line.
    pub(crate) site_list: PathBuf,

    /// Seconds a loaded page stays open so the extension can persist its
    /// dump (a 0.2-0.8s jitter is added per visit).
    pub(crate) dwell_secs: f64,

    /// Per-attempt navigation timeout in seconds.
    pub(crate) nav_timeout_secs: u64,

    /// Restart the browser session after this many processed visits.
    /// 0 disables restarts.
    pub(crate) restart_every: usize,

    /// Pause between visits in seconds (plus up to 0.35s jitter).
    pub(crate) cooldown_secs: f64,

    /// Run the scoped correlation pass after every visit. The unscoped
    /// final pass runs either way.
    pub(crate) incremental_rename: bool,

    /// Headless browser. Off by default: the extension drives downloads
    /// from a real page context and headed mode matches what it was
    /// developed against.
    pub(crate) headless: bool,
}
