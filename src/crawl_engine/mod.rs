//! Crawl orchestration: session lifecycle, per-site visits, and the
//! sequential drive loop.

pub mod orchestrator;
pub mod session;
pub mod types;
pub mod visitor;

pub use orchestrator::run_crawl;
pub use session::{BrowserSession, ChromiumLauncher, SessionLauncher, SessionManager};
pub use types::{CrawlSummary, StartupError, VisitOutcome};
pub use visitor::{VisitPage, VisitSession, visit};
