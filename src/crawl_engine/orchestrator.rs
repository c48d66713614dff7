//! The sequential crawl loop.
//!
//! One domain at a time: visit, record the outcome, run the scoped
//! rename pass, advance the session counter, cool down. Visit failures
//! are data (logged to the failure ledger); only infrastructure failures
//! - ledger writes, browser relaunch - abort the run. Ctrl-C stops the
//! loop between visits, and the unscoped rename pass runs on every exit
//! path so dumps from a truncated run still get their canonical names.

use anyhow::{Context, Result};
use rand::Rng;
use std::time::Duration;
use tracing::{info, warn};

use super::session::{ChromiumLauncher, SessionLauncher, SessionManager};
use super::types::{CrawlSummary, StartupError};
use super::visitor::visit;
use crate::browser_setup::resolve_browser_executable;
use crate::config::CrawlConfig;
use crate::correlator::correlate_downloads;
use crate::ledger::ResumeLedger;
use crate::site_list::{Domain, read_site_list};

/// Run a full crawl over the configured site list.
///
/// Resumes from the visited ledger in the profile directory: domains
/// already recorded there are skipped, everything else is visited in
/// list order.
pub async fn run_crawl(config: &CrawlConfig) -> Result<CrawlSummary> {
    preflight(config)?;
    let executable = resolve_browser_executable(config)?;

    let domains = read_site_list(config.site_list())?;
    let mut ledger = ResumeLedger::open(config.profile_dir())?;
    let pending: Vec<Domain> = domains
        .iter()
        .filter(|d| !ledger.is_visited(d))
        .cloned()
        .collect();
    info!(
        "{} sites listed, {} already visited, {} pending",
        domains.len(),
        ledger.visited_count(),
        pending.len()
    );

    let launcher = ChromiumLauncher::new(config.clone(), executable);
    let mut sessions = SessionManager::new(launcher, config.restart_every());

    let driven = drive(config, &pending, &mut ledger, &mut sessions).await;
    sessions.shutdown().await;

    // Always sweep the whole downloads directory at the end: the scoped
    // passes miss files the browser finalized late, and a rename that
    // raced a write gets a second chance here.
    let final_renamed = match correlate_downloads(&config.downloads_dir(), None) {
        Ok(report) => {
            info!(
                "final rename pass: {} renamed, {} already canonical, {} transient",
                report.renamed, report.already_canonical, report.transient_errors
            );
            report.renamed
        }
        Err(e) => {
            warn!("final rename pass failed: {e}");
            0
        }
    };

    let mut summary = driven?;
    summary.renamed += final_renamed;
    info!(
        "crawl finished: {} visited, {} failed, {} dumps renamed",
        summary.visited, summary.failed, summary.renamed
    );
    info!("visited ledger: {}", ledger.visited_path().display());
    info!("failure ledger: {}", ledger.failed_path().display());
    info!("dumps directory: {}", config.downloads_dir().display());
    Ok(summary)
}

/// Abort before anything launches when an external piece is missing.
fn preflight(config: &CrawlConfig) -> Result<(), StartupError> {
    if !config.extension_dir().exists() {
        return Err(StartupError::ExtensionMissing(
            config.extension_dir().to_path_buf(),
        ));
    }
    if !config.site_list().exists() {
        return Err(StartupError::SiteListMissing(config.site_list().to_path_buf()));
    }
    Ok(())
}

/// Visit each pending domain in order. Returns early on Ctrl-C; the
/// ledger already holds everything concluded so far.
async fn drive<L: SessionLauncher>(
    config: &CrawlConfig,
    pending: &[Domain],
    ledger: &mut ResumeLedger,
    sessions: &mut SessionManager<L>,
) -> Result<CrawlSummary> {
    let mut summary = CrawlSummary::default();
    let mut interrupted = false;

    for (i, domain) in pending.iter().enumerate() {
        info!("[{}/{}] {domain}", i + 1, pending.len());
        tokio::select! {
            biased;
            _ = tokio::signal::ctrl_c() => {
                interrupted = true;
                break;
            }
            result = process_domain(domain, config, ledger, sessions, &mut summary) => {
                result.with_context(|| format!("fatal error while processing {domain}"))?;
            }
        }
    }

    if interrupted {
        info!(
            "interrupt received, stopping after {} visits (resume will skip them)",
            summary.visited
        );
    }
    Ok(summary)
}

/// One full iteration: visit, record, scoped rename, session upkeep,
/// cooldown.
async fn process_domain<L: SessionLauncher>(
    domain: &Domain,
    config: &CrawlConfig,
    ledger: &mut ResumeLedger,
    sessions: &mut SessionManager<L>,
    summary: &mut CrawlSummary,
) -> Result<()> {
    let session = sessions.current().await?;
    let outcome = visit(session, domain, config).await;
    summary.visited += 1;

    match outcome.final_url.as_deref() {
        Some(url) => info!("  loaded {url}"),
        None => warn!(
            "  failed: {}",
            outcome.error.as_deref().unwrap_or("not_loaded")
        ),
    }

    // The visit concluded either way; record it so a resume skips it.
    ledger.record_visited(domain)?;
    if outcome.needs_failure_record() {
        ledger.record_failure(domain, outcome.final_url.as_deref(), outcome.error.as_deref())?;
        summary.failed += 1;
    }

    if config.incremental_rename() {
        // One second of slack against mtime granularity and clock skew
        // between the visit start and the browser finalizing the file.
        let since = outcome.started_at.checked_sub(Duration::from_secs(1));
        match correlate_downloads(&config.downloads_dir(), since) {
            Ok(report) => summary.renamed += report.renamed,
            Err(e) => warn!("  scoped rename pass failed: {e}"),
        }
    }

    sessions.note_processed().await?;
    cooldown(config.cooldown_secs()).await;
    Ok(())
}

/// Between-site pause with a little jitter so the request cadence does
/// not look mechanical.
async fn cooldown(secs: f64) {
    let jitter = rand::rng().random_range(0.0..0.35);
    tokio::time::sleep(Duration::from_secs_f64(secs + jitter)).await;
}
