//! Tests for the durable visited/failed ledger

use cssdump_crawl::ledger::ResumeLedger;
use cssdump_crawl::site_list::Domain;
use tempfile::TempDir;

fn domain(name: &str) -> Domain {
    Domain::parse(name).expect("valid domain")
}

#[test]
fn test_fresh_ledger_is_empty() {
    let tmp = TempDir::new().unwrap();
    let ledger = ResumeLedger::open(tmp.path()).unwrap();

    assert_eq!(ledger.visited_count(), 0);
    assert!(!ledger.is_visited(&domain("a.com")));
}

#[test]
fn test_record_visited_is_durable_across_reopen() {
    let tmp = TempDir::new().unwrap();
    {
        let mut ledger = ResumeLedger::open(tmp.path()).unwrap();
        ledger.record_visited(&domain("a.com")).unwrap();
        ledger.record_visited(&domain("b.org")).unwrap();
        // Dropped without any explicit close; appends were already synced.
    }

    let ledger = ResumeLedger::open(tmp.path()).unwrap();
    assert_eq!(ledger.visited_count(), 2);
    assert!(ledger.is_visited(&domain("a.com")));
    assert!(ledger.is_visited(&domain("b.org")));
    assert!(!ledger.is_visited(&domain("c.net")));
}

#[test]
fn test_record_visited_is_idempotent() {
    let tmp = TempDir::new().unwrap();
    let mut ledger = ResumeLedger::open(tmp.path()).unwrap();
    ledger.record_visited(&domain("a.com")).unwrap();
    ledger.record_visited(&domain("a.com")).unwrap();
    ledger.record_visited(&domain("a.com")).unwrap();

    let text = std::fs::read_to_string(ledger.visited_path()).unwrap();
    assert_eq!(text, "a.com\n");
    assert_eq!(ledger.visited_count(), 1);
}

#[test]
fn test_failure_log_format_and_defaults() {
    let tmp = TempDir::new().unwrap();
    let mut ledger = ResumeLedger::open(tmp.path()).unwrap();
    ledger
        .record_failure(&domain("a.com"), Some("http://a.com"), Some("navigation timeout after 30s"))
        .unwrap();
    ledger.record_failure(&domain("b.org"), None, None).unwrap();

    let text = std::fs::read_to_string(ledger.failed_path()).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "a.com\thttp://a.com\tnavigation timeout after 30s");
    assert_eq!(lines[1], "b.org\t\tnot_loaded");
}

#[test]
fn test_failures_do_not_mark_a_domain_visited() {
    let tmp = TempDir::new().unwrap();
    {
        let mut ledger = ResumeLedger::open(tmp.path()).unwrap();
        ledger.record_failure(&domain("a.com"), None, Some("boom")).unwrap();
    }

    // Only the visited log is replayed: a failure alone leaves the
    // domain pending for the next run.
    let ledger = ResumeLedger::open(tmp.path()).unwrap();
    assert!(!ledger.is_visited(&domain("a.com")));
}

#[test]
fn test_visited_log_tolerates_blank_lines() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("visited.txt"), "a.com\n\n  \nb.org\n").unwrap();

    let ledger = ResumeLedger::open(tmp.path()).unwrap();
    assert_eq!(ledger.visited_count(), 2);
}

#[test]
fn test_open_creates_missing_directory() {
    let tmp = TempDir::new().unwrap();
    let nested = tmp.path().join("profile").join("deep");

    let mut ledger = ResumeLedger::open(&nested).unwrap();
    ledger.record_visited(&domain("a.com")).unwrap();

    assert!(nested.join("visited.txt").exists());
    assert!(nested.join("failed.txt").exists());
}
