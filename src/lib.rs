pub mod browser_setup;
pub mod config;
pub mod correlator;
pub mod crawl_engine;
pub mod ledger;
pub mod site_list;
pub mod utils;

pub use browser_setup::{launch_session_browser, resolve_browser_executable};
pub use config::CrawlConfig;
pub use correlator::{CorrelationReport, RenameOutcome, correlate_downloads, rename_to_canonical};
pub use crawl_engine::{
    BrowserSession, ChromiumLauncher, CrawlSummary, SessionLauncher, SessionManager, StartupError,
    VisitOutcome, VisitPage, VisitSession, run_crawl, visit,
};
pub use ledger::ResumeLedger;
pub use site_list::{Domain, extract_domain, load_site_list, read_site_list};
