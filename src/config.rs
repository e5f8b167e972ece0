use crate::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

/// Configuration for a crawl or single-page scrape
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlConfig {
    /// URL to start crawling from
    #[serde(default)]
    pub start_url: String,

    /// Maximum number of pages collected
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    /// Maximum link depth from the start page (None = unbounded)
    #[serde(default)]
    pub max_depth: Option<usize>,

    /// Only follow links whose path starts with this prefix
    #[serde(default)]
    pub path_prefix: Option<String>,

    /// Always render pages in the browser
    #[serde(default)]
    pub force_render: bool,

    /// Click through tab widgets and merge their code blocks
    #[serde(default)]
    pub expand_tabs: bool,

    /// Number of pages fetched at once
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,

    #[serde(default = "default_render_timeout_secs")]
    pub render_timeout_secs: u64,

    /// Delay after navigation so client-side rendering can finish
    #[serde(default = "default_render_settle_ms")]
    pub render_settle_ms: u64,

    /// Delay after each tab click
    #[serde(default = "default_tab_settle_ms")]
    pub tab_settle_ms: u64,

    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Regex patterns for URLs to include
    #[serde(default)]
    pub include_patterns: Vec<String>,

    /// Regex patterns for URLs to exclude
    #[serde(default)]
    pub exclude_patterns: Vec<String>,
}

/// Default value for max_pages
fn default_max_pages() -> usize {
    50
}

/// Default value for concurrency
fn default_concurrency() -> usize {
    1
}

fn default_http_timeout_secs() -> u64 {
    10
}

fn default_render_timeout_secs() -> u64 {
    30
}

fn default_render_settle_ms() -> u64 {
    2000
}

fn default_tab_settle_ms() -> u64 {
    500
}

/// Default value for webdriver_url
fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

impl CrawlConfig {
    /// Create a new configuration with default values
    pub fn new(start_url: &str) -> Self {
        Self {
            start_url: start_url.to_string(),
            max_pages: default_max_pages(),
            max_depth: None,
            path_prefix: None,
            force_render: false,
            expand_tabs: false,
            concurrency: default_concurrency(),
            http_timeout_secs: default_http_timeout_secs(),
            render_timeout_secs: default_render_timeout_secs(),
            render_settle_ms: default_render_settle_ms(),
            tab_settle_ms: default_tab_settle_ms(),
            webdriver_url: default_webdriver_url(),
            include_patterns: Vec::new(),
            exclude_patterns: Vec::new(),
        }
    }

    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config)
    }

    /// Override the WebDriver URL with `WEBDRIVER_URL` if it is set
    pub fn apply_env(&mut self) {
        if let Ok(webdriver_url) = std::env::var("WEBDRIVER_URL") {
            if !webdriver_url.is_empty() {
                self.webdriver_url = webdriver_url;
            }
        }
    }

    /// Check the values a crawl cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_pages == 0 {
            return Err(ConfigError::Validation(
                "max_pages must be at least 1".to_string(),
            ));
        }
        if self.concurrency == 0 {
            return Err(ConfigError::Validation(
                "concurrency must be at least 1".to_string(),
            ));
        }
        match url::Url::parse(&self.start_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
            Ok(url) => Err(ConfigError::Validation(format!(
                "unsupported scheme '{}' in start URL",
                url.scheme()
            ))),
            Err(e) => Err(ConfigError::Validation(format!(
                "invalid start URL '{}': {}",
                self.start_url, e
            ))),
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn render_timeout(&self) -> Duration {
        Duration::from_secs(self.render_timeout_secs)
    }

    pub fn render_settle(&self) -> Duration {
        Duration::from_millis(self.render_settle_ms)
    }

    pub fn tab_settle(&self) -> Duration {
        Duration::from_millis(self.tab_settle_ms)
    }
}
