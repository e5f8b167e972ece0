// Re-export modules
pub mod config;
pub mod crawlers;
pub mod documents;
pub mod fetchers;
pub mod filter;
pub mod output;
pub mod pages;
pub mod parsers;
pub mod results;
pub mod utils;

// Re-export commonly used types for convenience
pub use config::CrawlConfig;
pub use fetchers::{FetchError, Fetcher};
pub use pages::Pages;
pub use results::{CrawlReport, LinkRecord, PageRecord};

use thiserror::Error;

/// Errors that end a crawl or a single-page scrape
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("No pages could be crawled from {start_url}")]
    EmptyResult { start_url: String },

    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration loading and validation errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid URL pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}
