//! Browser discovery and session launch.
//!
//! Each session is a persistent Chromium/Brave context bound to the
//! configured profile directory, launched with the measurement extension
//! loaded. The launch arguments are the engine's contract with the
//! extension and are not reinterpreted here.

use anyhow::{Context, Result};
use chromiumoxide::browser::{Browser, BrowserConfigBuilder, HeadlessMode};
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;
use tokio::task::{self, JoinHandle};
use tracing::{error, info, trace, warn};

use crate::config::CrawlConfig;
use crate::crawl_engine::types::StartupError;
use crate::utils::constants::{VIEWPORT_HEIGHT, VIEWPORT_WIDTH};

/// Resolve the browser executable for this run.
///
/// A configured path must exist; without one, common Brave and Chromium
/// install locations are searched. Either way, failure here is fatal -
/// no visit starts without a browser.
pub fn resolve_browser_executable(config: &CrawlConfig) -> Result<PathBuf, StartupError> {
    if let Some(path) = config.browser_path() {
        if path.exists() {
            info!("Using configured browser: {}", path.display());
            return Ok(path.to_path_buf());
        }
        return Err(StartupError::BrowserMissing(path.to_path_buf()));
    }
    find_browser_executable().ok_or(StartupError::BrowserNotFound)
}

/// Search common Brave/Chrome/Chromium install paths, then `which`.
fn find_browser_executable() -> Option<PathBuf> {
    let candidates: Vec<PathBuf> = if cfg!(target_os = "windows") {
        vec![
            PathBuf::from(r"C:\Program Files\BraveSoftware\Brave-Browser\Application\brave.exe"),
            PathBuf::from(
                r"C:\Program Files (x86)\BraveSoftware\Brave-Browser\Application\brave.exe",
            ),
            PathBuf::from(r"C:\Program Files\Google\Chrome\Application\chrome.exe"),
            PathBuf::from(r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe"),
            PathBuf::from(r"C:\Program Files\Chromium\Application\chrome.exe"),
        ]
    } else if cfg!(target_os = "macos") {
        let mut paths = vec![
            PathBuf::from("/Applications/Brave Browser.app/Contents/MacOS/Brave Browser"),
            PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome"),
            PathBuf::from("/Applications/Chromium.app/Contents/MacOS/Chromium"),
            PathBuf::from("/opt/homebrew/bin/chromium"),
        ];
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join("Applications/Brave Browser.app/Contents/MacOS/Brave Browser"));
        }
        paths
    } else {
        vec![
            PathBuf::from("/usr/bin/brave-browser"),
            PathBuf::from("/usr/bin/brave"),
            PathBuf::from("/snap/bin/brave"),
            PathBuf::from("/usr/bin/google-chrome"),
            PathBuf::from("/usr/bin/google-chrome-stable"),
            PathBuf::from("/usr/bin/chromium"),
            PathBuf::from("/usr/bin/chromium-browser"),
            PathBuf::from("/snap/bin/chromium"),
        ]
    };

    for path in candidates {
        if path.exists() {
            info!("Found browser at: {}", path.display());
            return Some(path);
        }
    }

    if !cfg!(target_os = "windows") {
        for cmd in &["brave-browser", "brave", "chromium", "chromium-browser", "google-chrome"] {
            if let Ok(output) = Command::new("which").arg(cmd).output()
                && output.status.success()
            {
                let path_str = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !path_str.is_empty() {
                    let path = PathBuf::from(path_str);
                    info!("Found browser using 'which': {}", path.display());
                    return Some(path);
                }
            }
        }
    }

    warn!("No Brave/Chromium executable found on this system");
    None
}

/// Launch one browser session with the extension loaded against the
/// persistent profile.
///
/// Returns the browser plus the handler task driving its CDP connection;
/// the caller owns both and must abort the handler after closing the
/// browser.
pub async fn launch_session_browser(
    config: &CrawlConfig,
    executable: &Path,
) -> Result<(Browser, JoinHandle<()>)> {
    let extension = config.extension_dir().display().to_string();

    std::fs::create_dir_all(config.profile_dir())
        .context("failed to create profile directory")?;
    std::fs::create_dir_all(config.downloads_dir())
        .context("failed to create downloads directory")?;

    let mut builder = BrowserConfigBuilder::default()
        .request_timeout(Duration::from_secs(config.nav_timeout_secs()))
        .window_size(VIEWPORT_WIDTH, VIEWPORT_HEIGHT)
        .user_data_dir(config.profile_dir())
        .chrome_executable(executable)
        .arg(format!("--disable-extensions-except={extension}"))
        .arg(format!("--load-extension={extension}"))
        .arg("--no-first-run")
        .arg("--no-default-browser-check")
        .arg("--disable-background-timer-throttling")
        .arg("--disable-renderer-backgrounding")
        .arg("--disable-features=DownloadBubbleV2");

    // Extensions drive downloads from a real page context; the crawl runs
    // headed unless explicitly configured otherwise.
    builder = if config.headless() {
        builder.headless_mode(HeadlessMode::default())
    } else {
        builder.with_head()
    };

    let browser_config = builder
        .build()
        .map_err(|e| anyhow::anyhow!("failed to build browser config: {e}"))?;

    info!(
        "Launching browser session (profile {})",
        config.profile_dir().display()
    );
    let (browser, mut handler) = Browser::launch(browser_config)
        .await
        .context("failed to launch browser")?;

    let handler_task = task::spawn(async move {
        while let Some(event) = handler.next().await {
            if let Err(e) = event {
                let msg = e.to_string();
                // Chrome emits CDP events chromiumoxide cannot deserialize;
                // those are noise, not connection failures.
                // https://github.com/mattsse/chromiumoxide/issues/167
                let benign = msg.contains("data did not match any variant of untagged enum Message")
                    || msg.contains("Failed to deserialize WS response");
                if benign {
                    trace!("suppressed benign CDP serialization error: {msg}");
                } else {
                    error!("browser handler error: {msg}");
                }
            }
        }
        trace!("browser handler task completed");
    });

    Ok((browser, handler_task))
}
