//! Site list loading and domain normalization.
//!
//! Site lists come in whatever shape the ranking provider ships: bare
//! URLs, `rank,domain` CSV rows, `rank domain` whitespace rows, or bare
//! hostnames. Every line is normalized into a validated [`Domain`] or
//! silently dropped; free-form lists routinely contain headers and
//! comments, so an unparseable line is not an error.

use anyhow::{Context, Result};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use url::Url;

lazy_static! {
    /// Sanity pattern for hostnames: at least two labels, ASCII TLD of 2+.
    static ref DOMAIN_RE: Regex =
        Regex::new(r"^[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("domain pattern compiles");

    /// Leading rank token like `83.`, `83-`, or `83:`.
    static ref RANK_RE: Regex = Regex::new(r"^\d+[.\-:]").expect("rank pattern compiles");
}

/// Check a hostname against the domain sanity pattern.
#[must_use]
pub fn is_valid_host(host: &str) -> bool {
    DOMAIN_RE.is_match(host)
}

/// A validated, lowercased hostname. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Domain(String);

impl Domain {
    /// Validate a candidate hostname, lowercasing on success.
    #[must_use]
    pub fn parse(candidate: &str) -> Option<Self> {
        let host = candidate.to_ascii_lowercase();
        if DOMAIN_RE.is_match(&host) {
            Some(Self(host))
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Second-level-domain label, used as the human-readable suffix in
    /// canonical dump names (`example` from `example.com`).
    #[must_use]
    pub fn sld_label(&self) -> &str {
        sld_label(&self.0)
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Second-to-last dot-separated label of a hostname, or the whole host
/// when it has fewer than two labels.
#[must_use]
pub fn sld_label(host: &str) -> &str {
    let parts: Vec<&str> = host.split('.').collect();
    if parts.len() >= 2 {
        parts[parts.len() - 2]
    } else {
        host
    }
}

/// Normalize one free-text line into a [`Domain`].
///
/// Accepted shapes, in order of precedence:
/// 1. full URL (`https://example.com/x`) - hostname is extracted
/// 2. ranked CSV row (`83,example.com`) - last comma field
/// 3. ranked whitespace row (`83 example.com`, `83. example.com`) - last token
/// 4. bare hostname, optionally with a fused rank prefix (`83.example.com`
///    keeps the host after the rank token is stripped)
///
/// Returns `None` for anything that fails the domain pattern after
/// normalization.
#[must_use]
pub fn extract_domain(raw: &str) -> Option<Domain> {
    let s = raw.trim().trim_matches(|c| c == '"' || c == '\'').trim();
    if s.is_empty() {
        return None;
    }

    if s.starts_with("http://") || s.starts_with("https://") {
        let url = Url::parse(s).ok()?;
        return Domain::parse(url.host_str()?);
    }

    let mut s = s;
    if s.contains(',') {
        s = s.rsplit(',').next()?.trim();
    }
    if s.contains(char::is_whitespace) {
        s = s.split_whitespace().next_back()?;
    }

    let deranked = RANK_RE.replace(s, "");
    Domain::parse(deranked.trim_matches(|c| c == '/' || c == '"' || c == '\''))
}

/// Parse raw site-list text into an ordered, deduplicated domain sequence.
///
/// First-seen order is preserved; lines that fail normalization are
/// dropped without comment.
#[must_use]
pub fn load_site_list(text: &str) -> Vec<Domain> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for line in text.lines() {
        if let Some(domain) = extract_domain(line)
            && seen.insert(domain.clone())
        {
            out.push(domain);
        }
    }
    out
}

/// Read and parse a site list from disk.
///
/// The file is decoded lossily so a stray non-UTF-8 byte does not kill
/// the whole list.
pub fn read_site_list(path: &Path) -> Result<Vec<Domain>> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("failed to read site list {}", path.display()))?;
    Ok(load_site_list(&String::from_utf8_lossy(&bytes)))
}
