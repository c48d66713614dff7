//! Dump-file correlation and canonical renaming.
//!
//! The measurement extension downloads one JSON dump per page under an
//! opaque, browser-chosen filename. Nothing ties such a file back to the
//! visit that produced it, so relevance is decided by content: anything
//! in the downloads directory that parses as JSON and carries a `page`
//! (or `url`) field pointing at a valid hostname is treated as a dump and
//! renamed to `css_dump_<ISO-stamp>_<sld>.json`.
//!
//! The rename is the only mutation ever applied; file contents belong to
//! the extension. Renames racing the browser's own download finalization
//! are expected, so IO errors are classified transient and the file stays
//! eligible for the next pass.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;

use crate::site_list::{is_valid_host, sld_label};
use crate::utils::constants::DUMP_PREFIX;

/// Per-file outcome of a correlation pass.
///
/// Explicit classification instead of a blanket "ignore all errors": the
/// orchestrator logs renames and transient errors but treats the skip
/// variants as ordinary, since unrelated downloads land in the same
/// directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameOutcome {
    /// File matched a dump and was renamed to its canonical identity.
    Renamed { from: PathBuf, to: PathBuf },
    /// File already carries its canonical name; nothing to do.
    AlreadyCanonical,
    /// Not JSON, or JSON without a usable page identifier. Presumably an
    /// unrelated download; never an error.
    NotAnArtifact,
    /// Rename or metadata IO failed (file locked or still being
    /// written). Eligible again on the next pass.
    TransientError(String),
}

/// Aggregate counts for one correlation pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CorrelationReport {
    pub renamed: usize,
    pub already_canonical: usize,
    pub skipped: usize,
    pub transient_errors: usize,
}

impl CorrelationReport {
    fn tally(&mut self, outcome: &RenameOutcome) {
        match outcome {
            RenameOutcome::Renamed { .. } => self.renamed += 1,
            RenameOutcome::AlreadyCanonical => self.already_canonical += 1,
            RenameOutcome::NotAnArtifact => self.skipped += 1,
            RenameOutcome::TransientError(_) => self.transient_errors += 1,
        }
    }
}

/// Correlate dump files in `dir`, renaming each to its canonical name.
///
/// With `newer_than` set, only files modified at or after that instant
/// are considered - the scoped, per-visit incremental pass. Without it
/// the whole directory is scanned; that unscoped pass is idempotent and
/// safe to run repeatedly.
pub fn correlate_downloads(
    dir: &Path,
    newer_than: Option<SystemTime>,
) -> Result<CorrelationReport> {
    let mut report = CorrelationReport::default();
    if !dir.exists() {
        return Ok(report);
    }

    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to scan downloads directory {}", dir.display()))?;

    for entry in entries {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                report.tally(&RenameOutcome::TransientError(e.to_string()));
                continue;
            }
        };
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        if let Some(since) = newer_than {
            match modified_at(&path) {
                Ok(mtime) if mtime < since => continue,
                Ok(_) => {}
                Err(e) => {
                    report.tally(&RenameOutcome::TransientError(e.to_string()));
                    continue;
                }
            }
        }

        let outcome = rename_to_canonical(&path, dir);
        if let RenameOutcome::Renamed { from, to } = &outcome {
            debug!(
                "renamed dump {} -> {}",
                from.display(),
                to.display()
            );
        }
        report.tally(&outcome);
    }

    Ok(report)
}

/// Classify one file by content and rename it if it is a dump.
pub fn rename_to_canonical(path: &Path, dir: &Path) -> RenameOutcome {
    let Some(dump) = sniff_dump(path) else {
        return RenameOutcome::NotAnArtifact;
    };

    let stamp = canonical_stamp(dump.timestamp_ms, path);
    let base = format!("{DUMP_PREFIX}_{stamp}_{}", sld_label(&dump.host));
    let target = uniquify(dir, &base, path);

    if target == path {
        return RenameOutcome::AlreadyCanonical;
    }

    match std::fs::rename(path, &target) {
        Ok(()) => RenameOutcome::Renamed {
            from: path.to_path_buf(),
            to: target,
        },
        Err(e) => RenameOutcome::TransientError(e.to_string()),
    }
}

/// Fields a dump must carry to be correlated.
struct DumpFields {
    host: String,
    timestamp_ms: Option<i64>,
}

/// Decide by content whether a file is a dump.
///
/// The read is lossy so GUID-named files without an extension still parse
/// if they are JSON. Content that does not begin with `{` or `[` is
/// rejected before parsing; anything without a `page`/`url` field whose
/// hostname passes the domain pattern is not a dump.
fn sniff_dump(path: &Path) -> Option<DumpFields> {
    let bytes = std::fs::read(path).ok()?;
    let text = String::from_utf8_lossy(&bytes);
    let trimmed = text.trim_start();
    if !trimmed.starts_with('{') && !trimmed.starts_with('[') {
        return None;
    }

    let value: Value = serde_json::from_str(trimmed).ok()?;
    let page_url = value
        .get("page")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .or_else(|| value.get("url").and_then(Value::as_str))
        .filter(|s| !s.is_empty())?;

    let host = url::Url::parse(page_url).ok()?.host_str()?.to_ascii_lowercase();
    if !is_valid_host(&host) {
        return None;
    }

    let timestamp_ms = value
        .get("timestamp")
        .and_then(|v| v.as_i64().or_else(|| v.as_f64().map(|f| f as i64)));

    Some(DumpFields { host, timestamp_ms })
}

/// Compact ISO-8601 UTC stamp (`YYYY-MM-DDTHH-MM-SSZ`), filename-safe.
///
/// Prefers the dump's own epoch-millisecond timestamp; falls back to the
/// file's modification time, then to the current time.
#[must_use]
pub fn canonical_stamp(timestamp_ms: Option<i64>, fallback: &Path) -> String {
    let dt = timestamp_ms
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .or_else(|| modified_at(fallback).ok().map(DateTime::<Utc>::from))
        .unwrap_or_else(Utc::now);
    dt.format("%Y-%m-%dT%H-%M-%SZ").to_string()
}

/// Resolve the first free canonical path for `base` in `dir`, appending
/// `_1`, `_2`, ... before the extension on collision.
///
/// `current` counts as free: a file that already occupies its own
/// canonical name must resolve to itself, not get bumped to the next
/// suffix on every pass.
fn uniquify(dir: &Path, base: &str, current: &Path) -> PathBuf {
    let candidate = dir.join(format!("{base}.json"));
    if candidate == current || !candidate.exists() {
        return candidate;
    }
    let mut i = 1usize;
    loop {
        let candidate = dir.join(format!("{base}_{i}.json"));
        if candidate == current || !candidate.exists() {
            return candidate;
        }
        i += 1;
    }
}

fn modified_at(path: &Path) -> std::io::Result<SystemTime> {
    path.metadata()?.modified()
}
