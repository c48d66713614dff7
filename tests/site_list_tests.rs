//! Tests for site-list parsing and domain normalization

use cssdump_crawl::site_list::{Domain, extract_domain, load_site_list, read_site_list, sld_label};
use tempfile::TempDir;

fn host(raw: &str) -> Option<String> {
    extract_domain(raw).map(|d| d.as_str().to_string())
}

#[test]
fn test_extract_from_full_url() {
    assert_eq!(host("https://example.com/some/path?q=1"), Some("example.com".into()));
    assert_eq!(host("http://Sub.Example.COM"), Some("sub.example.com".into()));
}

#[test]
fn test_extract_from_ranked_csv_row() {
    assert_eq!(host("83,example.com"), Some("example.com".into()));
    assert_eq!(host("1,google.com,extra"), None); // trailing field is not a host
    assert_eq!(host("7,\"wrapped.org\""), Some("wrapped.org".into()));
}

#[test]
fn test_extract_from_ranked_whitespace_row() {
    assert_eq!(host("12 c.net"), Some("c.net".into()));
    assert_eq!(host("12. c.net"), Some("c.net".into()));
    assert_eq!(host("  12\texample.co.uk  "), Some("example.co.uk".into()));
}

#[test]
fn test_extract_from_bare_and_fused_rank() {
    assert_eq!(host("example.com"), Some("example.com".into()));
    assert_eq!(host("83.example.com"), Some("example.com".into()));
    assert_eq!(host("example.com/"), Some("example.com".into()));
}

#[test]
fn test_rank_pattern_does_not_eat_digit_leading_hosts() {
    // Digits without a separator are part of the hostname.
    assert_eq!(host("123movies.com"), Some("123movies.com".into()));
}

#[test]
fn test_unparseable_lines_yield_none() {
    assert_eq!(host("notadomain"), None);
    assert_eq!(host(""), None);
    assert_eq!(host("# comment"), None);
    assert_eq!(host("rank,domain"), None); // CSV header
    assert_eq!(host("https://"), None);
}

#[test]
fn test_load_site_list_mixed_shapes_in_order() {
    let text = "https://a.com/x\n83,b.org\nnotadomain\n12 c.net\n";
    let domains: Vec<String> = load_site_list(text)
        .iter()
        .map(|d| d.as_str().to_string())
        .collect();
    assert_eq!(domains, vec!["a.com", "b.org", "c.net"]);
}

#[test]
fn test_load_site_list_dedupes_keeping_first_position() {
    let text = "b.org\na.com\nhttps://B.ORG/path\na.com\n";
    let domains: Vec<String> = load_site_list(text)
        .iter()
        .map(|d| d.as_str().to_string())
        .collect();
    assert_eq!(domains, vec!["b.org", "a.com"]);
}

#[test]
fn test_read_site_list_tolerates_non_utf8_bytes() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("sites.txt");
    let mut bytes = b"a.com\n".to_vec();
    bytes.extend_from_slice(&[0xff, 0xfe]);
    bytes.extend_from_slice(b"\nb.org\n");
    std::fs::write(&path, bytes).unwrap();

    let domains: Vec<String> = read_site_list(&path)
        .unwrap()
        .iter()
        .map(|d| d.as_str().to_string())
        .collect();
    assert_eq!(domains, vec!["a.com", "b.org"]);
}

#[test]
fn test_read_site_list_missing_file_is_an_error() {
    let tmp = TempDir::new().unwrap();
    assert!(read_site_list(&tmp.path().join("nope.txt")).is_err());
}

#[test]
fn test_sld_label() {
    assert_eq!(sld_label("example.com"), "example");
    assert_eq!(sld_label("www.example.co.uk"), "co");
    assert_eq!(sld_label("localhost"), "localhost");

    let domain = Domain::parse("news.ycombinator.com").unwrap();
    assert_eq!(domain.sld_label(), "ycombinator");
}
