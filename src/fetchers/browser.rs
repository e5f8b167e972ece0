use crate::config::CrawlConfig;
use crate::fetchers::tabs::{TAB_SELECTORS, merge_snapshots};
use crate::fetchers::{FetchError, RenderCapability};
use async_trait::async_trait;
use fantoccini::error::CmdError;
use fantoccini::wd::WindowHandle;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::json;
use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep, timeout};

/// Common WebDriver endpoints tried when the configured one is unreachable
const FALLBACK_WEBDRIVER_URLS: &[&str] = &[
    "http://localhost:9515", // ChromeDriver default
    "http://localhost:4444", // geckodriver / Selenium default
    "http://127.0.0.1:4444",
];

/// Browser rendering over WebDriver
///
/// The session is opened on first use and kept until [`RenderCapability::shutdown`].
/// Access is serialized: every render opens its own tab and closes it before
/// the next render starts.
pub struct RenderSession {
    webdriver_url: String,
    page_timeout: Duration,
    settle: Duration,
    tab_settle: Duration,
    client: Mutex<Option<Client>>,
}

impl RenderSession {
    pub fn new(webdriver_url: &str, page_timeout: Duration, settle: Duration, tab_settle: Duration) -> Self {
        Self {
            webdriver_url: webdriver_url.to_string(),
            page_timeout,
            settle,
            tab_settle,
            client: Mutex::new(None),
        }
    }

    pub fn from_config(config: &CrawlConfig) -> Self {
        Self::new(
            &config.webdriver_url,
            config.render_timeout(),
            config.render_settle(),
            config.tab_settle(),
        )
    }

    /// Whether a WebDriver session is currently open
    pub async fn is_connected(&self) -> bool {
        self.client.lock().await.is_some()
    }

    async fn connect(&self, url: &str) -> Result<Client, FetchError> {
        let candidates = std::iter::once(self.webdriver_url.as_str())
            .chain(FALLBACK_WEBDRIVER_URLS.iter().copied().filter(|u| *u != self.webdriver_url));

        for webdriver_url in candidates {
            let mut builder = ClientBuilder::native();
            builder.capabilities(headless_capabilities());
            match builder.connect(webdriver_url).await {
                Ok(client) => {
                    ::log::info!("Connected to WebDriver at {}", webdriver_url);
                    return Ok(client);
                }
                Err(e) => {
                    ::log::debug!("WebDriver at {} unavailable: {}", webdriver_url, e);
                }
            }
        }

        ::log::error!(
            "Make sure a WebDriver server is running or set the WEBDRIVER_URL environment variable"
        );
        Err(FetchError::Render {
            url: url.to_string(),
            message: format!("no WebDriver server reachable at {}", self.webdriver_url),
        })
    }

    /// Renders `url` in a fresh tab, closing the tab whatever the outcome
    async fn render_in_tab(&self, client: &Client, url: &str, expand_tabs: bool) -> Result<String, FetchError> {
        let origin = client.window().await.map_err(|e| render_error(url, e))?;
        let tab = client.new_window(true).await.map_err(|e| render_error(url, e))?;

        within_tab(client, origin, tab.handle, url, || self.visit(client, url, expand_tabs)).await
    }

    async fn visit(&self, client: &Client, url: &str, expand_tabs: bool) -> Result<String, FetchError> {
        match timeout(self.page_timeout, client.goto(url)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(render_error(url, e)),
            Err(_) => {
                return Err(FetchError::Timeout {
                    url: url.to_string(),
                });
            }
        }

        // Let client-side rendering finish
        sleep(self.settle).await;

        if expand_tabs {
            let snapshots = self.collect_tab_snapshots(client).await.map_err(|e| render_error(url, e))?;
            ::log::debug!("Captured {} tab snapshots for {}", snapshots.len(), url);
            Ok(merge_snapshots(&snapshots))
        } else {
            client.source().await.map_err(|e| render_error(url, e))
        }
    }

    /// Clicks every tab-like element once and records each distinct DOM
    ///
    /// Failing selectors and clicks only skip that element.
    async fn collect_tab_snapshots(&self, client: &Client) -> Result<Vec<String>, CmdError> {
        let mut snapshots = vec![client.source().await?];
        let mut clicked = HashSet::new();

        for &selector in TAB_SELECTORS {
            let tabs = match client.find_all(Locator::Css(selector)).await {
                Ok(tabs) => tabs,
                Err(e) => {
                    ::log::trace!("Tab selector {} failed: {}", selector, e);
                    continue;
                }
            };

            for tab in tabs {
                let Ok(label) = tab.text().await else {
                    continue;
                };
                if !clicked.insert(label.clone()) {
                    continue;
                }
                if let Err(e) = tab.click().await {
                    ::log::trace!("Could not click tab '{}': {}", label, e);
                    continue;
                }
                sleep(self.tab_settle).await;

                match client.source().await {
                    Ok(source) if !snapshots.contains(&source) => snapshots.push(source),
                    Ok(_) => {}
                    Err(e) => ::log::trace!("No snapshot after clicking '{}': {}", label, e),
                }
            }
        }

        Ok(snapshots)
    }
}

#[async_trait]
impl RenderCapability for RenderSession {
    async fn render(&self, url: &str, expand_tabs: bool) -> Result<String, FetchError> {
        let mut guard = self.client.lock().await;
        if guard.is_none() {
            *guard = Some(self.connect(url).await?);
        }
        let Some(client) = guard.as_ref() else {
            return Err(FetchError::Render {
                url: url.to_string(),
                message: "WebDriver session unavailable".to_string(),
            });
        };

        ::log::debug!("Rendering {} in browser", url);
        self.render_in_tab(client, url, expand_tabs).await
    }

    async fn shutdown(&self) {
        if let Some(client) = self.client.lock().await.take() {
            match client.close().await {
                Ok(()) => ::log::debug!("WebDriver session closed"),
                Err(e) => ::log::warn!("Failed to close WebDriver session: {}", e),
            }
        }
    }
}

/// Window operations needed to run work in a separate tab
#[async_trait]
trait TabControl: Sync {
    type Handle: Clone + Send + Sync;

    async fn switch_to(&self, handle: Self::Handle) -> Result<(), CmdError>;

    /// Closes the current window
    async fn close_current(&self) -> Result<(), CmdError>;
}

#[async_trait]
impl TabControl for Client {
    type Handle = WindowHandle;

    async fn switch_to(&self, handle: WindowHandle) -> Result<(), CmdError> {
        self.switch_to_window(handle).await
    }

    async fn close_current(&self) -> Result<(), CmdError> {
        self.close_window().await
    }
}

/// Runs `work` with `tab` as the current window, then closes `tab` and
/// returns to `origin`, also when switching to the tab failed
async fn within_tab<C, F, Fut, T>(
    tabs: &C,
    origin: C::Handle,
    tab: C::Handle,
    url: &str,
    work: F,
) -> Result<T, FetchError>
where
    C: TabControl,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let result = match tabs.switch_to(tab.clone()).await {
        Ok(()) => work().await,
        Err(e) => Err(render_error(url, e)),
    };

    release_tab(tabs, origin, tab, url).await;
    result
}

async fn release_tab<C: TabControl>(tabs: &C, origin: C::Handle, tab: C::Handle, url: &str) {
    // Closing acts on the current window, so the tab must be current first
    match tabs.switch_to(tab).await {
        Ok(()) => {
            if let Err(e) = tabs.close_current().await {
                ::log::warn!("Failed to close tab for {}: {}", url, e);
            }
        }
        Err(e) => ::log::warn!("Could not reach tab for {} to close it: {}", url, e),
    }
    if let Err(e) = tabs.switch_to(origin).await {
        ::log::warn!("Failed to return to the main window: {}", e);
    }
}

fn headless_capabilities() -> serde_json::Map<String, serde_json::Value> {
    let capabilities = json!({
        "goog:chromeOptions": { "args": ["--headless=new", "--disable-gpu", "--no-sandbox"] },
        "moz:firefoxOptions": { "args": ["-headless"] },
    });
    match capabilities {
        serde_json::Value::Object(map) => map,
        _ => serde_json::Map::new(),
    }
}

fn render_error(url: &str, error: CmdError) -> FetchError {
    if error.to_string().contains("Unable to find session") {
        ::log::warn!("Lost WebDriver session while rendering {}", url);
    }
    FetchError::Render {
        url: url.to_string(),
        message: error.to_string(),
    }
}
