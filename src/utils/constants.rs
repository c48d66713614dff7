//! Shared configuration constants for cssdump-crawl
//!
//! Default values used throughout the codebase to ensure consistency
//! and avoid magic numbers.

/// Default post-navigation dwell: 5 seconds
///
/// How long a loaded page stays open before the visitor moves on. The
/// measurement extension computes and downloads its dump during this
/// window, so lowering it risks dumps landing after the visit's scoped
/// correlation pass (they are still picked up by the final pass).
pub const DEFAULT_DWELL_SECS: f64 = 5.0;

/// Default per-attempt navigation timeout: 30 seconds
///
/// Applies independently to the HTTPS attempt and the HTTP fallback.
pub const DEFAULT_NAV_TIMEOUT_SECS: u64 = 30;

/// Default session restart cadence: every 200 visits
///
/// A long-lived Chromium context accumulates memory across hundreds of
/// sites; restarting the whole browser periodically keeps resource usage
/// bounded. Set to 0 to disable restarts.
pub const DEFAULT_RESTART_EVERY: usize = 200;

/// Default inter-visit cooldown: 0.25 seconds
///
/// Small pause between sites, extended with up to 0.35s of jitter.
pub const DEFAULT_COOLDOWN_SECS: f64 = 0.25;

/// Prefix for canonical dump filenames
pub const DUMP_PREFIX: &str = "css_dump";

/// Visited-domain ledger filename (inside the profile directory)
pub const VISITED_LOG: &str = "visited.txt";

/// Failed-visit ledger filename (inside the profile directory)
pub const FAILED_LOG: &str = "failed.txt";

/// Downloads subdirectory of the profile, where the extension writes dumps
pub const DOWNLOADS_SUBDIR: &str = "Downloads";

/// Fixed viewport used for every session
pub const VIEWPORT_WIDTH: u32 = 1280;
pub const VIEWPORT_HEIGHT: u32 = 800;
