//! Type-safe builder for `CrawlConfig` using the typestate pattern.
//!
//! The two paths without a sensible default - the extension directory and
//! the site list - are enforced at compile time: `build()` only exists
//! once both have been provided.

use anyhow::{Result, anyhow};
use std::marker::PhantomData;
use std::path::PathBuf;

use super::types::CrawlConfig;
use crate::utils::constants::{
    DEFAULT_COOLDOWN_SECS, DEFAULT_DWELL_SECS, DEFAULT_NAV_TIMEOUT_SECS, DEFAULT_RESTART_EVERY,
};

// Type states for the builder
pub struct WithExtensionDir;
pub struct WithSiteList;

pub struct CrawlConfigBuilder<State = ()> {
    pub(crate) browser_path: Option<PathBuf>,
    pub(crate) extension_dir: Option<PathBuf>,
    pub(crate) profile_dir: PathBuf,
    pub(crate) site_list: Option<PathBuf>,
    pub(crate) dwell_secs: f64,
    pub(crate) nav_timeout_secs: u64,
    pub(crate) restart_every: usize,
    pub(crate) cooldown_secs: f64,
    pub(crate) incremental_rename: bool,
    pub(crate) headless: bool,
    pub(crate) _phantom: PhantomData<State>,
}

impl Default for CrawlConfigBuilder<()> {
    fn default() -> Self {
        Self {
            browser_path: None,
            extension_dir: None,
            profile_dir: PathBuf::from("./crawl_profile"),
            site_list: None,
            dwell_secs: DEFAULT_DWELL_SECS,
            nav_timeout_secs: DEFAULT_NAV_TIMEOUT_SECS,
            restart_every: DEFAULT_RESTART_EVERY,
            cooldown_secs: DEFAULT_COOLDOWN_SECS,
            incremental_rename: true,
            headless: false,
            _phantom: PhantomData,
        }
    }
}

impl CrawlConfig {
    /// Create a builder for configuring a `CrawlConfig` with a fluent interface
    #[must_use]
    pub fn builder() -> CrawlConfigBuilder<()> {
        CrawlConfigBuilder::default()
    }
}

impl CrawlConfigBuilder<()> {
    pub fn extension_dir(self, dir: impl Into<PathBuf>) -> CrawlConfigBuilder<WithExtensionDir> {
        CrawlConfigBuilder {
            browser_path: self.browser_path,
            extension_dir: Some(dir.into()),
            profile_dir: self.profile_dir,
            site_list: self.site_list,
            dwell_secs: self.dwell_secs,
            nav_timeout_secs: self.nav_timeout_secs,
            restart_every: self.restart_every,
            cooldown_secs: self.cooldown_secs,
            incremental_rename: self.incremental_rename,
            headless: self.headless,
            _phantom: PhantomData,
        }
    }
}

impl CrawlConfigBuilder<WithExtensionDir> {
    pub fn site_list(self, path: impl Into<PathBuf>) -> CrawlConfigBuilder<WithSiteList> {
        CrawlConfigBuilder {
            browser_path: self.browser_path,
            extension_dir: self.extension_dir,
            profile_dir: self.profile_dir,
            site_list: Some(path.into()),
            dwell_secs: self.dwell_secs,
            nav_timeout_secs: self.nav_timeout_secs,
            restart_every: self.restart_every,
            cooldown_secs: self.cooldown_secs,
            incremental_rename: self.incremental_rename,
            headless: self.headless,
            _phantom: PhantomData,
        }
    }
}

// Build method only available once both required paths are set
impl CrawlConfigBuilder<WithSiteList> {
    pub fn build(self) -> Result<CrawlConfig> {
        Ok(CrawlConfig {
            browser_path: self.browser_path,
            extension_dir: self
                .extension_dir
                .ok_or_else(|| anyhow!("extension_dir is required"))?,
            profile_dir: self.profile_dir,
            site_list: self
                .site_list
                .ok_or_else(|| anyhow!("site_list is required"))?,
            dwell_secs: self.dwell_secs,
            nav_timeout_secs: self.nav_timeout_secs,
            restart_every: self.restart_every,
            cooldown_secs: self.cooldown_secs,
            incremental_rename: self.incremental_rename,
            headless: self.headless,
        })
    }
}

// Optional knobs, settable at any builder state
impl<State> CrawlConfigBuilder<State> {
    /// Explicit browser executable. When unset, a system Brave/Chromium
    /// installation is discovered at startup.
    #[must_use]
    pub fn browser_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.browser_path = Some(path.into());
        self
    }

    /// Persistent profile directory (ledgers and downloads live here).
    #[must_use]
    pub fn profile_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.profile_dir = dir.into();
        self
    }

    /// Seconds to keep a loaded page open before moving on.
    #[must_use]
    pub fn dwell_secs(mut self, secs: f64) -> Self {
        self.dwell_secs = secs;
        self
    }

    /// Per-attempt navigation timeout in seconds.
    #[must_use]
    pub fn nav_timeout_secs(mut self, secs: u64) -> Self {
        self.nav_timeout_secs = secs;
        self
    }

    /// Restart the browser after this many visits (0 disables).
    #[must_use]
    pub fn restart_every(mut self, visits: usize) -> Self {
        self.restart_every = visits;
        self
    }

    /// Pause between visits in seconds.
    #[must_use]
    pub fn cooldown_secs(mut self, secs: f64) -> Self {
        self.cooldown_secs = secs;
        self
    }

    /// Toggle the scoped per-visit rename pass.
    #[must_use]
    pub fn incremental_rename(mut self, enabled: bool) -> Self {
        self.incremental_rename = enabled;
        self
    }

    /// Run the browser headless.
    #[must_use]
    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }
}
