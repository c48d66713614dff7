//! Getter methods for `CrawlConfig`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use super::types::CrawlConfig;
use crate::utils::constants::DOWNLOADS_SUBDIR;

impl CrawlConfig {
    #[must_use]
    pub fn browser_path(&self) -> Option<&Path> {
        self.browser_path.as_deref()
    }

    #[must_use]
    pub fn extension_dir(&self) -> &Path {
        &self.extension_dir
    }

    #[must_use]
    pub fn profile_dir(&self) -> &Path {
        &self.profile_dir
    }

    #[must_use]
    pub fn site_list(&self) -> &Path {
        &self.site_list
    }

    /// Where the extension's dumps land: `<profile>/Downloads`.
    #[must_use]
    pub fn downloads_dir(&self) -> PathBuf {
        self.profile_dir.join(DOWNLOADS_SUBDIR)
    }

    #[must_use]
    pub fn dwell_secs(&self) -> f64 {
        self.dwell_secs
    }

    #[must_use]
    pub fn nav_timeout_secs(&self) -> u64 {
        self.nav_timeout_secs
    }

    /// Navigation timeout as a `Duration`.
    #[must_use]
    pub fn nav_timeout(&self) -> Duration {
        Duration::from_secs(self.nav_timeout_secs)
    }

    #[must_use]
    pub fn restart_every(&self) -> usize {
        self.restart_every
    }

    #[must_use]
    pub fn cooldown_secs(&self) -> f64 {
        self.cooldown_secs
    }

    #[must_use]
    pub fn incremental_rename(&self) -> bool {
        self.incremental_rename
    }

    #[must_use]
    pub fn headless(&self) -> bool {
        self.headless
    }
}
