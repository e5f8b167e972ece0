use clap::Parser;
use page_scribe::CrawlConfig;
use page_scribe::ConfigError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "page-scribe")]
#[command(about = "Scrapes a web page or crawls a site and saves the text as Markdown")]
#[command(version)]
pub struct Args {
    /// Start URL (https:// is assumed when no scheme is given)
    pub url: String,

    /// Follow in-domain links instead of scraping only the start page
    #[arg(short, long)]
    pub crawl: bool,

    /// Maximum number of pages to crawl [default: 50]
    #[arg(short, long)]
    pub max: Option<usize>,

    /// Maximum link depth from the start page (1 = direct links only)
    #[arg(short, long)]
    pub depth: Option<usize>,

    /// Only follow links whose path starts with this prefix, e.g. /docs/api/
    #[arg(short, long)]
    pub prefix: Option<String>,

    /// Save every page as its own file in a new directory
    #[arg(short, long)]
    pub separate: bool,

    /// Click through tab widgets to capture all tab contents (slower)
    #[arg(short = 't', long)]
    pub expand_tabs: bool,

    /// Always render pages in the browser
    #[arg(short = 'b', long)]
    pub force_browser: bool,

    /// Output file (default: derived from the URL)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Number of pages fetched at once [default: 1]
    #[arg(short = 'j', long)]
    pub concurrency: Option<usize>,

    /// JSON configuration file; command line flags take precedence
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log every step
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Start URL with a scheme
    pub fn start_url(&self) -> String {
        if self.url.starts_with("http://") || self.url.starts_with("https://") {
            self.url.clone()
        } else {
            format!("https://{}", self.url)
        }
    }

    /// Configuration file (if any), overridden by flags and then the environment
    pub fn crawl_config(&self) -> Result<CrawlConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => CrawlConfig::from_file(path)?,
            None => CrawlConfig::new(&self.start_url()),
        };

        config.start_url = self.start_url();
        if let Some(max) = self.max {
            config.max_pages = max;
        }
        if self.depth.is_some() {
            config.max_depth = self.depth;
        }
        if self.prefix.is_some() {
            config.path_prefix = self.prefix.clone();
        }
        if let Some(concurrency) = self.concurrency {
            config.concurrency = concurrency;
        }
        config.force_render |= self.force_browser;
        config.expand_tabs |= self.expand_tabs;

        config.apply_env();
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_flags() {
        let args = Args::try_parse_from([
            "page-scribe", "ex.com/docs", "-c", "-m", "20", "-d", "2", "-p", "/docs/", "-s", "-t",
            "-b", "-j", "4", "-v",
        ])
        .unwrap();

        assert_eq!(args.start_url(), "https://ex.com/docs");
        assert!(args.crawl && args.separate && args.expand_tabs && args.force_browser && args.verbose);

        let config = args.crawl_config().unwrap();
        assert_eq!(config.max_pages, 20);
        assert_eq!(config.max_depth, Some(2));
        assert_eq!(config.path_prefix.as_deref(), Some("/docs/"));
        assert_eq!(config.concurrency, 4);
        assert!(config.force_render && config.expand_tabs);
    }

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["page-scribe", "http://ex.com"]).unwrap();
        assert_eq!(args.start_url(), "http://ex.com");

        let config = args.crawl_config().unwrap();
        assert_eq!(config.max_pages, 50);
        assert_eq!(config.max_depth, None);
        assert_eq!(config.concurrency, 1);
    }

    #[test]
    fn test_zero_max_is_rejected() {
        let args = Args::try_parse_from(["page-scribe", "ex.com", "-m", "0"]).unwrap();
        assert!(matches!(args.crawl_config(), Err(ConfigError::Validation(_))));
    }
}
