use crate::CrawlError;
use crate::config::CrawlConfig;
use crate::crawlers::frontier::{Frontier, FrontierEntry};
use crate::crawlers::scrape::scrape_page;
use crate::fetchers::{FetchError, FetchMode, Fetcher};
use crate::filter::UrlFilter;
use crate::results::{CrawlReport, PageRecord, ScrapedPage};
use futures::stream::{self, StreamExt};
use url::Url;

/// Crawls breadth-first from `config.start_url`
///
/// Pages are identified by their canonical URL but fetched at the URL they
/// were linked with, which is also the base for their relative links.
///
/// Pages are collected in dequeue order until the frontier is empty or
/// `max_pages` pages with content were collected. With `concurrency > 1`
/// several entries are fetched at once, but results are still consumed in
/// dequeue order and never more entries than the remaining budget are in
/// flight, so the result matches a sequential crawl.
pub async fn crawl(config: &CrawlConfig, fetcher: &Fetcher) -> Result<CrawlReport, CrawlError> {
    ::log::info!("Starting web crawler for: {}", config.start_url);

    let root_url = Url::parse(&config.start_url).map_err(|e| CrawlError::InvalidUrl {
        url: config.start_url.clone(),
        reason: e.to_string(),
    })?;
    let url_filter = UrlFilter::from_config(&root_url, config)?;
    let mode = FetchMode {
        force_render: config.force_render,
        expand_tabs: config.expand_tabs,
    };
    let concurrency = config.concurrency.max(1);

    let mut frontier = Frontier::new(&config.start_url);
    let mut report = CrawlReport::default();

    while report.pages.len() < config.max_pages {
        let budget = (config.max_pages - report.pages.len()).min(concurrency);
        let batch = frontier.next_batch(budget, |url| url_filter.should_crawl_str(url));
        if batch.is_empty() {
            break;
        }

        let results = stream::iter(batch)
            .map(|entry| {
                let prefix = url_filter.path_prefix();
                async move {
                    let result =
                        scrape_page(fetcher, &entry.location, entry.referer.as_deref(), prefix, mode).await;
                    (entry, result)
                }
            })
            .buffered(concurrency)
            .collect::<Vec<_>>()
            .await;

        for (entry, result) in results {
            let position = report.pages.len() + 1;
            process_result(config, &mut frontier, &mut report, entry, result, position);
        }
    }

    ::log::info!(
        "Crawl finished: {} pages, {} links, {} URLs visited, {} left in queue",
        report.pages.len(),
        report.links.len(),
        frontier.visited_count(),
        frontier.len()
    );

    if report.pages.is_empty() {
        return Err(CrawlError::EmptyResult {
            start_url: config.start_url.clone(),
        });
    }
    Ok(report)
}

/// Records a scraped page and queues its links
fn process_result(
    config: &CrawlConfig,
    frontier: &mut Frontier,
    report: &mut CrawlReport,
    entry: FrontierEntry,
    result: Result<ScrapedPage, FetchError>,
    position: usize,
) {
    let depth_info = match config.max_depth {
        Some(_) => format!(" (depth {})", entry.depth),
        None => String::new(),
    };

    let page = match result {
        Ok(page) if !page.content.trim().is_empty() => page,
        Ok(_) => {
            ::log::info!("Skipped {}{}: no content", entry.url, depth_info);
            return;
        }
        Err(e) => {
            ::log::warn!("Skipped {}{}: {}", entry.url, depth_info, e);
            return;
        }
    };

    ::log::info!(
        "[{}/{}] {}{}: {} chars, {} links{}",
        position,
        config.max_pages,
        entry.url,
        depth_info,
        page.content.len(),
        page.links.len(),
        if page.used_render { " (rendered)" } else { "" }
    );

    let follow_links = config.max_depth.is_none_or(|max| entry.depth < max);
    if follow_links {
        for link in page.links {
            if frontier.push(&link.url, entry.depth + 1, &entry.location) {
                ::log::debug!("Queuing link for crawling: {}", link.url);
            }
            report.links.push(link);
        }
    }

    report
        .pages
        .push(PageRecord::new(entry.url, page.title, page.content));
}
