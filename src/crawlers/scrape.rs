use crate::fetchers::{FetchError, FetchMode, Fetcher};
use crate::parsers::Parser;
use crate::results::ScrapedPage;

/// Fetches one page and runs title, content and link extraction on it
///
/// Fails only when no fetch strategy produced HTML; extraction itself
/// degrades to empty content.
pub async fn scrape_page(
    fetcher: &Fetcher,
    url: &str,
    referer: Option<&str>,
    path_prefix: Option<&str>,
    mode: FetchMode,
) -> Result<ScrapedPage, FetchError> {
    let worker_start = std::time::Instant::now();

    let fetched = fetcher.fetch(url, referer, mode).await?;
    let used_render = fetched.used_render();
    let parsed = Parser::parse(&fetched.html, url, path_prefix);

    ::log::debug!(
        "Scraped {} via {} in {:.2} seconds",
        url,
        fetched.strategy,
        worker_start.elapsed().as_secs_f64()
    );

    Ok(ScrapedPage {
        title: parsed.title,
        content: parsed.content,
        links: parsed.links,
        used_render,
    })
}
