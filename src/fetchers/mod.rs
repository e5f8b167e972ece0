//! Page fetching: a cheap HTTP request first, a real browser when the page
//! needs JavaScript or the request fails.

pub mod browser;
pub mod heuristic;
pub mod http;
pub mod tabs;

use async_trait::async_trait;
use scraper::Html;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while obtaining the HTML of a page
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("Timed out loading {url}")]
    Timeout { url: String },

    #[error("Browser failed to render {url}: {message}")]
    Render { url: String, message: String },

    #[error("No fetch strategy succeeded for {url}")]
    Exhausted { url: String },
}

/// Body and status of a plain HTTP GET
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Lightweight HTTP access: follows redirects, sends browser-like headers
#[async_trait]
pub trait HttpCapability: Send + Sync {
    async fn get(&self, url: &str, referer: Option<&str>) -> Result<HttpResponse, FetchError>;
}

/// Full browser rendering
///
/// Implementations open one page per call and release it before returning,
/// whether rendering succeeded or not.
#[async_trait]
pub trait RenderCapability: Send + Sync {
    /// Navigate to `url` and return the rendered DOM, optionally clicking
    /// through tab widgets first
    async fn render(&self, url: &str, expand_tabs: bool) -> Result<String, FetchError>;

    /// Release the underlying browser; rendering again reconnects
    async fn shutdown(&self);
}

/// How a page should be fetched
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchMode {
    /// Skip plain HTTP and render in the browser
    pub force_render: bool,
    /// Render and click through tab widgets
    pub expand_tabs: bool,
}

/// A named way of obtaining HTML, tried in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Http,
    Render,
    RenderWithTabs,
}

impl Strategy {
    /// Strategies to try for a fetch mode, in order
    pub fn plan(mode: FetchMode) -> &'static [Strategy] {
        if mode.expand_tabs {
            &[Strategy::RenderWithTabs]
        } else if mode.force_render {
            &[Strategy::Render]
        } else {
            &[Strategy::Http, Strategy::Render]
        }
    }

    pub fn uses_render(self) -> bool {
        !matches!(self, Strategy::Http)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Http => write!(f, "http"),
            Strategy::Render => write!(f, "render"),
            Strategy::RenderWithTabs => write!(f, "render+tabs"),
        }
    }
}

/// Outcome of a single strategy
#[derive(Debug)]
pub enum StrategyOutcome {
    Accepted(String),
    Rejected(FetchError),
}

/// HTML of a fetched page and the strategy that produced it
#[derive(Debug, Clone)]
pub struct Fetched {
    pub html: String,
    pub strategy: Strategy,
}

impl Fetched {
    pub fn used_render(&self) -> bool {
        self.strategy.uses_render()
    }
}

/// Chooses between plain HTTP and browser rendering for each page
#[derive(Clone)]
pub struct Fetcher {
    http: Arc<dyn HttpCapability>,
    render: Arc<dyn RenderCapability>,
}

impl Fetcher {
    pub fn new(http: Arc<dyn HttpCapability>, render: Arc<dyn RenderCapability>) -> Self {
        Self { http, render }
    }

    /// Fetch a page, falling back through the strategies of `mode`
    pub async fn fetch(
        &self,
        url: &str,
        referer: Option<&str>,
        mode: FetchMode,
    ) -> Result<Fetched, FetchError> {
        let mut last_error = None;

        for &strategy in Strategy::plan(mode) {
            match self.attempt(strategy, url, referer).await {
                StrategyOutcome::Accepted(html) => {
                    ::log::debug!("Fetched {} via {}", url, strategy);
                    return Ok(Fetched { html, strategy });
                }
                StrategyOutcome::Rejected(e) => {
                    ::log::debug!("Strategy {} rejected {}: {}", strategy, url, e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| FetchError::Exhausted {
            url: url.to_string(),
        }))
    }

    async fn attempt(&self, strategy: Strategy, url: &str, referer: Option<&str>) -> StrategyOutcome {
        match strategy {
            Strategy::Http => self.attempt_http(url, referer).await,
            Strategy::Render => outcome(self.render.render(url, false).await),
            Strategy::RenderWithTabs => outcome(self.render.render(url, true).await),
        }
    }

    async fn attempt_http(&self, url: &str, referer: Option<&str>) -> StrategyOutcome {
        let response = match self.http.get(url, referer).await {
            Ok(response) => response,
            Err(e) => {
                ::log::info!("Falling back to browser for {}: {}", url, e);
                return StrategyOutcome::Rejected(e);
            }
        };

        if response.status != 200 {
            ::log::info!("Falling back to browser for {}: HTTP {}", url, response.status);
            return StrategyOutcome::Rejected(FetchError::Status {
                url: url.to_string(),
                status: response.status,
            });
        }

        let doc = Html::parse_document(&response.body);
        if heuristic::needs_render(&response.body, &doc) {
            ::log::info!("Page looks client-rendered, using browser: {}", url);
            return StrategyOutcome::Rejected(FetchError::Render {
                url: url.to_string(),
                message: "page is rendered client-side".to_string(),
            });
        }

        StrategyOutcome::Accepted(response.body)
    }

    /// Release the browser if it was ever started
    pub async fn shutdown(&self) {
        self.render.shutdown().await;
    }
}

fn outcome(result: Result<String, FetchError>) -> StrategyOutcome {
    match result {
        Ok(html) => StrategyOutcome::Accepted(html),
        Err(e) => StrategyOutcome::Rejected(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct StubHttp {
        result: Result<HttpResponse, FetchError>,
        calls: Mutex<Vec<(String, Option<String>)>>,
    }

    impl StubHttp {
        fn new(result: Result<HttpResponse, FetchError>) -> Arc<Self> {
            Arc::new(Self {
                result,
                calls: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl HttpCapability for StubHttp {
        async fn get(&self, url: &str, referer: Option<&str>) -> Result<HttpResponse, FetchError> {
            self.calls
                .lock()
                .unwrap()
                .push((url.to_string(), referer.map(str::to_string)));
            self.result.clone()
        }
    }

    #[derive(Default)]
    struct StubRender {
        fail: bool,
        calls: Mutex<Vec<bool>>,
    }

    #[async_trait]
    impl RenderCapability for StubRender {
        async fn render(&self, url: &str, expand_tabs: bool) -> Result<String, FetchError> {
            self.calls.lock().unwrap().push(expand_tabs);
            if self.fail {
                return Err(FetchError::Render {
                    url: url.to_string(),
                    message: "no browser".to_string(),
                });
            }
            Ok("<body><p>rendered</p></body>".to_string())
        }

        async fn shutdown(&self) {}
    }

    fn ok(body: &str) -> Result<HttpResponse, FetchError> {
        Ok(HttpResponse {
            status: 200,
            body: body.to_string(),
        })
    }

    const STATIC_PAGE: &str = "<html><body><p>A server rendered page.</p></body></html>";

    #[tokio::test]
    async fn test_http_result_kept_for_static_page() {
        let http = StubHttp::new(ok(STATIC_PAGE));
        let render = Arc::new(StubRender::default());
        let fetcher = Fetcher::new(http.clone(), render.clone());

        let fetched = fetcher
            .fetch("https://ex.com/a", Some("https://ex.com"), FetchMode::default())
            .await
            .unwrap();

        assert_eq!(fetched.html, STATIC_PAGE);
        assert_eq!(fetched.strategy, Strategy::Http);
        assert!(!fetched.used_render());
        assert_eq!(
            http.calls.lock().unwrap().as_slice(),
            &[("https://ex.com/a".to_string(), Some("https://ex.com".to_string()))]
        );
        assert!(render.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_non_200_falls_back_to_render() {
        let http = StubHttp::new(Ok(HttpResponse {
            status: 403,
            body: STATIC_PAGE.to_string(),
        }));
        let render = Arc::new(StubRender::default());
        let fetcher = Fetcher::new(http, render.clone());

        let fetched = fetcher.fetch("https://ex.com", None, FetchMode::default()).await.unwrap();
        assert!(fetched.used_render());
        assert_eq!(render.calls.lock().unwrap().as_slice(), &[false]);
    }

    #[tokio::test]
    async fn test_transport_error_falls_back_to_render() {
        let http = StubHttp::new(Err(FetchError::Transport {
            url: "https://ex.com".to_string(),
            message: "connection reset".to_string(),
        }));
        let fetcher = Fetcher::new(http, Arc::new(StubRender::default()));

        let fetched = fetcher.fetch("https://ex.com", None, FetchMode::default()).await.unwrap();
        assert_eq!(fetched.strategy, Strategy::Render);
    }

    #[tokio::test]
    async fn test_client_rendered_page_refetched() {
        let shell = format!(
            "<html><head>{}</head><body><div id=\"root\"></div></body></html>",
            "<script></script>".repeat(8)
        );
        let fetcher = Fetcher::new(StubHttp::new(ok(&shell)), Arc::new(StubRender::default()));

        let fetched = fetcher.fetch("https://ex.com", None, FetchMode::default()).await.unwrap();
        assert_eq!(fetched.html, "<body><p>rendered</p></body>");
    }

    #[tokio::test]
    async fn test_force_render_skips_http() {
        let http = StubHttp::new(ok(STATIC_PAGE));
        let fetcher = Fetcher::new(http.clone(), Arc::new(StubRender::default()));
        let mode = FetchMode {
            force_render: true,
            expand_tabs: false,
        };

        let fetched = fetcher.fetch("https://ex.com", None, mode).await.unwrap();
        assert_eq!(fetched.strategy, Strategy::Render);
        assert!(http.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_expand_tabs_takes_precedence() {
        let http = StubHttp::new(ok(STATIC_PAGE));
        let render = Arc::new(StubRender::default());
        let fetcher = Fetcher::new(http.clone(), render.clone());
        let mode = FetchMode {
            force_render: true,
            expand_tabs: true,
        };

        let fetched = fetcher.fetch("https://ex.com", None, mode).await.unwrap();
        assert_eq!(fetched.strategy, Strategy::RenderWithTabs);
        assert_eq!(render.calls.lock().unwrap().as_slice(), &[true]);
        assert!(http.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_all_strategies_failing_returns_last_error() {
        let http = StubHttp::new(Ok(HttpResponse {
            status: 500,
            body: String::new(),
        }));
        let render = Arc::new(StubRender {
            fail: true,
            ..Default::default()
        });
        let fetcher = Fetcher::new(http, render);

        let err = fetcher.fetch("https://ex.com", None, FetchMode::default()).await.unwrap_err();
        assert!(matches!(err, FetchError::Render { .. }));
    }
}
