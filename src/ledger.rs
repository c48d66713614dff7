//! Durable visited/failed visit record enabling crash-safe resume.
//!
//! Two append-only text logs live inside the profile directory:
//! `visited.txt` (one domain per line) and `failed.txt` (tab-separated
//! `domain\tfinalUrlOrEmpty\treason`). Every append is flushed and synced
//! so an interrupted run resumes at the first domain not yet recorded.
//!
//! Only the visited log is replayed at startup. A domain that shows up in
//! the failure log but not the visited log is revisited on the next run;
//! "visited" means the attempt concluded, not that it succeeded.

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::site_list::Domain;
use crate::utils::constants::{FAILED_LOG, VISITED_LOG};

pub struct ResumeLedger {
    visited: HashSet<String>,
    visited_file: File,
    failed_file: File,
    visited_path: PathBuf,
    failed_path: PathBuf,
}

impl ResumeLedger {
    /// Open (or create) the ledger files under `dir`, replaying the
    /// visited log into memory.
    pub fn open(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create ledger directory {}", dir.display()))?;

        let visited_path = dir.join(VISITED_LOG);
        let failed_path = dir.join(FAILED_LOG);

        let visited = match std::fs::read_to_string(&visited_path) {
            Ok(text) => text
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashSet::new(),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("failed to read {}", visited_path.display()));
            }
        };

        let visited_file = append_handle(&visited_path)?;
        let failed_file = append_handle(&failed_path)?;

        Ok(Self {
            visited,
            visited_file,
            failed_file,
            visited_path,
            failed_path,
        })
    }

    #[must_use]
    pub fn is_visited(&self, domain: &Domain) -> bool {
        self.visited.contains(domain.as_str())
    }

    #[must_use]
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    #[must_use]
    pub fn visited_path(&self) -> &Path {
        &self.visited_path
    }

    #[must_use]
    pub fn failed_path(&self) -> &Path {
        &self.failed_path
    }

    /// Append a domain to the visited log and update the in-memory set.
    ///
    /// Idempotent within a process: a domain already recorded is not
    /// appended a second time.
    pub fn record_visited(&mut self, domain: &Domain) -> Result<()> {
        if !self.visited.insert(domain.as_str().to_string()) {
            return Ok(());
        }
        writeln!(self.visited_file, "{domain}")
            .and_then(|()| self.visited_file.flush())
            .and_then(|()| self.visited_file.sync_data())
            .with_context(|| format!("failed to append to {}", self.visited_path.display()))
    }

    /// Append a failed visit to the failure log.
    ///
    /// `final_url` is empty when no navigation attempt succeeded; a
    /// missing reason is recorded as `not_loaded`.
    pub fn record_failure(
        &mut self,
        domain: &Domain,
        final_url: Option<&str>,
        reason: Option<&str>,
    ) -> Result<()> {
        writeln!(
            self.failed_file,
            "{}\t{}\t{}",
            domain,
            final_url.unwrap_or(""),
            reason.unwrap_or("not_loaded"),
        )
        .and_then(|()| self.failed_file.flush())
        .and_then(|()| self.failed_file.sync_data())
        .with_context(|| format!("failed to append to {}", self.failed_path.display()))
    }
}

fn append_handle(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open {} for append", path.display()))
}
