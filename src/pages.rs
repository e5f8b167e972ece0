use crate::CrawlError;
use crate::ConfigError;
use crate::config::CrawlConfig;
use crate::crawlers::{crawl, scrape_page};
use crate::fetchers::browser::RenderSession;
use crate::fetchers::http::HttpFetcher;
use crate::fetchers::{FetchMode, Fetcher};
use crate::results::{CrawlReport, ScrapedPage};
use std::path::Path;
use std::sync::Arc;

/// Builder struct for configuring and running a crawl or a single-page scrape
///
/// The fetcher, and with it the browser session, is created on first use and
/// kept until [`Pages::shutdown`].
pub struct Pages {
    config: CrawlConfig,
    fetcher: Option<Fetcher>,
}

impl Pages {
    /// Create a new Pages builder starting at `url`
    pub fn new(url: &str) -> Self {
        Self {
            config: CrawlConfig::new(url),
            fetcher: None,
        }
    }

    /// Apply a configuration, keeping the start URL if the configuration has none
    pub fn with_config(mut self, config: CrawlConfig) -> Self {
        let start_url = std::mem::take(&mut self.config.start_url);
        self.config = config;
        if self.config.start_url.is_empty() {
            self.config.start_url = start_url;
        }
        self
    }

    /// Load configuration from a JSON file
    pub fn with_config_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        let config = CrawlConfig::from_file(path)?;
        Ok(self.with_config(config))
    }

    /// Apply configuration from a JSON string
    pub fn with_config_str(self, json: &str) -> Result<Self, ConfigError> {
        let config = CrawlConfig::from_json(json)?;
        Ok(self.with_config(config))
    }

    pub fn with_max_pages(mut self, value: usize) -> Self {
        self.config.max_pages = value;
        self
    }

    pub fn with_max_depth(mut self, value: Option<usize>) -> Self {
        self.config.max_depth = value;
        self
    }

    pub fn with_path_prefix(mut self, value: Option<String>) -> Self {
        self.config.path_prefix = value;
        self
    }

    pub fn with_force_render(mut self, value: bool) -> Self {
        self.config.force_render = value;
        self
    }

    pub fn with_expand_tabs(mut self, value: bool) -> Self {
        self.config.expand_tabs = value;
        self
    }

    pub fn with_concurrency(mut self, value: usize) -> Self {
        self.config.concurrency = value;
        self
    }

    /// Use `fetcher` instead of the default HTTP client and browser session
    pub fn with_fetcher(mut self, fetcher: Fetcher) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    /// Crawl the site breadth-first from the start URL
    pub async fn crawl(&mut self) -> Result<CrawlReport, CrawlError> {
        self.config.validate()?;
        let fetcher = self.fetcher()?;
        crawl(&self.config, &fetcher).await
    }

    /// Fetch and extract only the start URL
    ///
    /// Unlike a crawl, a failed fetch is returned as an error, and every
    /// internal link is listed regardless of the path prefix.
    pub async fn scrape(&mut self) -> Result<ScrapedPage, CrawlError> {
        self.config.validate()?;
        let fetcher = self.fetcher()?;
        let mode = FetchMode {
            force_render: self.config.force_render,
            expand_tabs: self.config.expand_tabs,
        };

        let page = scrape_page(
            &fetcher,
            &self.config.start_url,
            None,
            None,
            mode,
        )
        .await?;

        ::log::info!(
            "Scraped {}: '{}', {} chars, {} internal links",
            self.config.start_url,
            page.title,
            page.content.len(),
            page.links.len()
        );
        Ok(page)
    }

    /// Release the browser session if one was started
    pub async fn shutdown(&self) {
        if let Some(fetcher) = &self.fetcher {
            fetcher.shutdown().await;
        }
    }

    fn fetcher(&mut self) -> Result<Fetcher, CrawlError> {
        if let Some(fetcher) = &self.fetcher {
            return Ok(fetcher.clone());
        }

        let http = HttpFetcher::new(self.config.http_timeout())?;
        let render = RenderSession::from_config(&self.config);
        let fetcher = Fetcher::new(Arc::new(http), Arc::new(render));
        self.fetcher = Some(fetcher.clone());
        Ok(fetcher)
    }
}
