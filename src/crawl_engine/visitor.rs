//! Single-site visitor with protocol fallback.
//!
//! One visit is a small state machine: try `https://<domain>`, fall back
//! to `http://` on any failure (including timeout), dwell on success so
//! the extension can persist its dump, and always close the page. A
//! timeout on the HTTP fallback is terminal for the visit; there are no
//! further retries.

use anyhow::Result;
use rand::Rng;
use std::future::Future;
use std::time::{Duration, SystemTime};
use tracing::{debug, info};

use super::types::VisitOutcome;
use crate::config::CrawlConfig;
use crate::site_list::Domain;

/// One open browser page. Exactly one is created per visit and closed on
/// every exit path.
pub trait VisitPage {
    /// Navigate to `url` and wait for the load to settle. The caller
    /// bounds this with the configured timeout.
    fn navigate(&mut self, url: &str) -> impl Future<Output = Result<()>>;

    /// Close the page. Best effort; a close failure never fails a visit.
    fn close(self) -> impl Future<Output = ()>;
}

/// Source of pages for visits, implemented by the live browser session.
pub trait VisitSession {
    type Page: VisitPage;

    fn open_page(&mut self) -> impl Future<Output = Result<Self::Page>>;
}

/// Visit one domain. Never fails the loop: every problem is folded into
/// the returned [`VisitOutcome`].
pub async fn visit<S: VisitSession>(
    session: &mut S,
    domain: &Domain,
    config: &CrawlConfig,
) -> VisitOutcome {
    let started_at = SystemTime::now();
    let url_https = format!("https://{domain}");
    let url_http = format!("http://{domain}");

    let mut page = match session.open_page().await {
        Ok(page) => page,
        Err(e) => {
            return VisitOutcome {
                domain: domain.clone(),
                final_url: None,
                error: Some(format!("failed to open page: {e}")),
                started_at,
            };
        }
    };

    let timeout = config.nav_timeout();
    let navigated = match bounded(page.navigate(&url_https), timeout).await {
        Ok(()) => Ok(url_https),
        Err(e_https) => {
            info!("  https failed for {domain}, trying http: {e_https}");
            match bounded(page.navigate(&url_http), timeout).await {
                Ok(()) => Ok(url_http),
                Err(e_http) => Err(e_http),
            }
        }
    };

    let outcome = match navigated {
        Ok(final_url) => {
            dwell(config.dwell_secs()).await;
            VisitOutcome {
                domain: domain.clone(),
                final_url: Some(final_url),
                error: None,
                started_at,
            }
        }
        Err(e) => VisitOutcome {
            domain: domain.clone(),
            final_url: None,
            error: Some(e.to_string()),
            started_at,
        },
    };

    page.close().await;
    outcome
}

/// Bound a navigation attempt with a hard timeout so a hung load cannot
/// stall the whole crawl.
async fn bounded<F>(attempt: F, limit: Duration) -> Result<()>
where
    F: Future<Output = Result<()>>,
{
    match tokio::time::timeout(limit, attempt).await {
        Ok(result) => result,
        Err(_) => Err(anyhow::anyhow!(
            "navigation timeout after {}s",
            limit.as_secs()
        )),
    }
}

/// Post-load dwell: fixed seconds plus 0.2-0.8s jitter. This is the
/// window in which the extension computes and downloads its dump.
async fn dwell(secs: f64) {
    let jitter = rand::rng().random_range(0.2..0.8);
    debug!("  dwelling {:.1}s", secs + jitter);
    tokio::time::sleep(Duration::from_secs_f64(secs + jitter)).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    /// Shared state between the fake session and the pages it hands out.
    #[derive(Default)]
    struct PageState {
        /// Canned result per navigation attempt, in order.
        script: VecDeque<Result<(), String>>,
        /// URLs navigated to, in order.
        visited: Vec<String>,
        closed: bool,
    }

    struct FakePage {
        state: Rc<RefCell<PageState>>,
    }

    impl VisitPage for FakePage {
        async fn navigate(&mut self, url: &str) -> Result<()> {
            let mut state = self.state.borrow_mut();
            state.visited.push(url.to_string());
            match state.script.pop_front() {
                Some(Ok(())) => Ok(()),
                Some(Err(msg)) => Err(anyhow::anyhow!(msg)),
                None => panic!("unscripted navigation to {url}"),
            }
        }

        async fn close(self) {
            self.state.borrow_mut().closed = true;
        }
    }

    struct FakeSession {
        state: Rc<RefCell<PageState>>,
    }

    impl FakeSession {
        fn scripted(script: Vec<Result<(), String>>) -> Self {
            Self {
                state: Rc::new(RefCell::new(PageState {
                    script: script.into(),
                    ..PageState::default()
                })),
            }
        }
    }

    impl VisitSession for FakeSession {
        type Page = FakePage;

        async fn open_page(&mut self) -> Result<Self::Page> {
            Ok(FakePage {
                state: Rc::clone(&self.state),
            })
        }
    }

    fn config() -> CrawlConfig {
        CrawlConfig::builder()
            .extension_dir("/tmp/ext")
            .site_list("/tmp/sites.txt")
            .dwell_secs(0.0)
            .nav_timeout_secs(2)
            .build()
            .expect("test config")
    }

    #[tokio::test]
    async fn https_success_skips_fallback() {
        let mut session = FakeSession::scripted(vec![Ok(())]);
        let domain = Domain::parse("example.com").unwrap();

        let outcome = visit(&mut session, &domain, &config()).await;

        assert_eq!(outcome.final_url.as_deref(), Some("https://example.com"));
        assert!(outcome.loaded());
        assert!(outcome.error.is_none());
        assert!(!outcome.needs_failure_record());
        let state = session.state.borrow();
        assert_eq!(state.visited, vec!["https://example.com".to_string()]);
        assert!(state.closed);
    }

    #[tokio::test]
    async fn https_failure_falls_back_to_http() {
        let mut session =
            FakeSession::scripted(vec![Err("tls handshake failed".into()), Ok(())]);
        let domain = Domain::parse("example.com").unwrap();

        let outcome = visit(&mut session, &domain, &config()).await;

        assert_eq!(outcome.final_url.as_deref(), Some("http://example.com"));
        assert!(outcome.error.is_none());
        let state = session.state.borrow();
        assert_eq!(
            state.visited,
            vec![
                "https://example.com".to_string(),
                "http://example.com".to_string()
            ]
        );
        assert!(state.closed);
    }

    #[tokio::test]
    async fn both_failures_record_the_http_error() {
        let mut session = FakeSession::scripted(vec![
            Err("tls handshake failed".into()),
            Err("connection refused".into()),
        ]);
        let domain = Domain::parse("example.com").unwrap();

        let outcome = visit(&mut session, &domain, &config()).await;

        assert!(outcome.final_url.is_none());
        assert_eq!(outcome.error.as_deref(), Some("connection refused"));
        assert!(outcome.needs_failure_record());
        assert!(session.state.borrow().closed);
    }

    #[tokio::test]
    async fn page_open_failure_is_a_failed_visit() {
        struct NoPageSession;
        impl VisitSession for NoPageSession {
            type Page = FakePage;
            async fn open_page(&mut self) -> Result<Self::Page> {
                Err(anyhow::anyhow!("browser gone"))
            }
        }

        let domain = Domain::parse("example.com").unwrap();
        let outcome = visit(&mut NoPageSession, &domain, &config()).await;

        assert!(outcome.final_url.is_none());
        assert!(outcome.needs_failure_record());
    }
}
