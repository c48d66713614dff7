//! Browser session lifecycle.
//!
//! A session is one launched browser with the extension loaded. The
//! [`SessionManager`] launches lazily, counts processed sites, and
//! recycles the browser after the configured threshold so memory and
//! profile-state drift from a long headed run stay bounded. A failed
//! close during recycling is logged and ignored; a failed relaunch is
//! fatal, since no further visit can proceed without a browser.

use anyhow::Result;
use chromiumoxide::Page;
use chromiumoxide::browser::Browser;
use chromiumoxide::cdp::browser_protocol::browser::{
    SetDownloadBehaviorBehavior, SetDownloadBehaviorParams,
};
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::visitor::{VisitPage, VisitSession};
use crate::browser_setup::launch_session_browser;
use crate::config::CrawlConfig;

/// A live session the manager can recycle. Visits go through the
/// [`VisitSession`] supertrait; this adds teardown.
pub trait BrowserSession: VisitSession {
    fn close(self) -> impl Future<Output = Result<()>>;
}

/// Launches sessions. Split from the manager so restart cadence is
/// testable without a browser.
pub trait SessionLauncher {
    type Session: BrowserSession;

    fn launch(&self) -> impl Future<Output = Result<Self::Session>>;
}

/// Owns the current session and the restart counter.
pub struct SessionManager<L: SessionLauncher> {
    launcher: L,
    session: Option<L::Session>,
    processed_since_launch: usize,
    restart_every: usize,
}

impl<L: SessionLauncher> SessionManager<L> {
    #[must_use]
    pub fn new(launcher: L, restart_every: usize) -> Self {
        Self {
            launcher,
            session: None,
            processed_since_launch: 0,
            restart_every,
        }
    }

    /// The live session, launching one if none is open.
    pub async fn current(&mut self) -> Result<&mut L::Session> {
        if self.session.is_none() {
            self.session = Some(self.launcher.launch().await?);
            self.processed_since_launch = 0;
        }
        self.session
            .as_mut()
            .ok_or_else(|| anyhow::anyhow!("browser session unavailable"))
    }

    /// Record one concluded visit and recycle the browser once the
    /// threshold is reached. A threshold of zero disables recycling.
    pub async fn note_processed(&mut self) -> Result<()> {
        self.processed_since_launch += 1;
        if self.restart_every == 0 || self.processed_since_launch < self.restart_every {
            return Ok(());
        }

        info!(
            "Recycling browser session after {} sites",
            self.processed_since_launch
        );
        if let Some(old) = self.session.take()
            && let Err(e) = old.close().await
        {
            warn!("failed to close browser session cleanly: {e}");
        }
        self.session = Some(self.launcher.launch().await?);
        self.processed_since_launch = 0;

        // Let the fresh browser finish loading the extension before the
        // next navigation.
        tokio::time::sleep(Duration::from_secs(1)).await;
        Ok(())
    }

    /// Close the session if one is open. Close failures are logged, not
    /// propagated; by this point the crawl result is already decided.
    pub async fn shutdown(&mut self) {
        if let Some(session) = self.session.take()
            && let Err(e) = session.close().await
        {
            warn!("failed to close browser session cleanly: {e}");
        }
    }
}

/// Production launcher backed by chromiumoxide.
pub struct ChromiumLauncher {
    config: CrawlConfig,
    executable: PathBuf,
}

impl ChromiumLauncher {
    #[must_use]
    pub fn new(config: CrawlConfig, executable: PathBuf) -> Self {
        Self { config, executable }
    }
}

impl SessionLauncher for ChromiumLauncher {
    type Session = ChromiumSession;

    async fn launch(&self) -> Result<ChromiumSession> {
        let (browser, handler_task) = launch_session_browser(&self.config, &self.executable).await?;
        Ok(ChromiumSession {
            browser,
            handler_task,
            downloads_dir: self.config.downloads_dir(),
        })
    }
}

/// One launched browser plus the task driving its CDP connection.
pub struct ChromiumSession {
    browser: Browser,
    handler_task: JoinHandle<()>,
    downloads_dir: PathBuf,
}

impl VisitSession for ChromiumSession {
    type Page = ChromiumPage;

    async fn open_page(&mut self) -> Result<ChromiumPage> {
        let page = self.browser.new_page("about:blank").await?;

        // Route the extension's downloads into the profile's Downloads
        // directory. Best effort: some browser builds reject the command
        // for extension-initiated downloads and land them there anyway.
        match SetDownloadBehaviorParams::builder()
            .behavior(SetDownloadBehaviorBehavior::Allow)
            .download_path(self.downloads_dir.display().to_string())
            .build()
        {
            Ok(params) => {
                if let Err(e) = page.execute(params).await {
                    debug!("could not set download behavior: {e}");
                }
            }
            Err(e) => debug!("could not build download behavior params: {e}"),
        }

        Ok(ChromiumPage { page })
    }
}

impl BrowserSession for ChromiumSession {
    async fn close(mut self) -> Result<()> {
        self.browser.close().await?;
        self.browser.wait().await?;
        self.handler_task.abort();
        Ok(())
    }
}

/// One open tab.
pub struct ChromiumPage {
    page: Page,
}

impl VisitPage for ChromiumPage {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        self.page.goto(url).await?;
        self.page.wait_for_navigation().await?;
        Ok(())
    }

    async fn close(self) {
        if let Err(e) = self.page.close().await {
            debug!("failed to close page: {e}");
        }
    }
}
