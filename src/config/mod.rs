//! Crawl configuration: types, builder, and accessors.

pub mod builder;
pub mod getters;
pub mod types;

pub use builder::CrawlConfigBuilder;
pub use types::CrawlConfig;
