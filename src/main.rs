// CSS dump crawler: drives a Brave/Chromium session with the measurement
// extension loaded over a site list, and renames the dumps the extension
// downloads to canonical, per-site filenames.
//
// Configuration is environment-driven; CSSDUMP_EXTENSION is the only
// required variable.

use anyhow::{Context, Result};
use cssdump_crawl::{CrawlConfig, run_crawl};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let extension = std::env::var("CSSDUMP_EXTENSION")
        .context("CSSDUMP_EXTENSION must point at the measurement extension directory")?;
    let sites = std::env::var("CSSDUMP_SITES").unwrap_or_else(|_| "sites.txt".to_string());

    let mut builder = CrawlConfig::builder()
        .extension_dir(extension)
        .site_list(sites);
    if let Ok(profile) = std::env::var("CSSDUMP_PROFILE") {
        builder = builder.profile_dir(profile);
    }
    if let Ok(browser) = std::env::var("CSSDUMP_BROWSER") {
        builder = builder.browser_path(browser);
    }
    if let Some(secs) = parse_env::<f64>("CSSDUMP_DWELL_SECS")? {
        builder = builder.dwell_secs(secs);
    }
    if let Some(secs) = parse_env::<u64>("CSSDUMP_NAV_TIMEOUT_SECS")? {
        builder = builder.nav_timeout_secs(secs);
    }
    if let Some(visits) = parse_env::<usize>("CSSDUMP_RESTART_EVERY")? {
        builder = builder.restart_every(visits);
    }
    if let Some(secs) = parse_env::<f64>("CSSDUMP_COOLDOWN_SECS")? {
        builder = builder.cooldown_secs(secs);
    }
    if flag_env("CSSDUMP_HEADLESS") {
        builder = builder.headless(true);
    }
    if flag_env("CSSDUMP_NO_INCREMENTAL_RENAME") {
        builder = builder.incremental_rename(false);
    }
    let config = builder.build()?;

    run_crawl(&config).await?;
    Ok(())
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("invalid {name}={raw}: {e}")),
        Err(_) => Ok(None),
    }
}

fn flag_env(name: &str) -> bool {
    matches!(
        std::env::var(name).as_deref().map(str::trim),
        Ok("1") | Ok("true") | Ok("yes")
    )
}
