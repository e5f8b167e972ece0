//! Markdown documents built from crawl results

use crate::results::{LinkRecord, PageRecord};
use crate::utils::domain_of;
use chrono::NaiveDateTime;
use regex::Regex;
use std::sync::LazyLock;

/// Timestamp format of the `scraped_at` front-matter field
pub const SCRAPED_AT_FORMAT: &str = "%Y-%m-%d %H:%M";

static ANCHOR_STRIP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s-]").expect("static regex is valid"));
static ANCHOR_SPACES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("static regex is valid"));

/// Heading anchor for a title: lowercase, punctuation dropped, spaces as `-`
pub fn anchor(title: &str) -> String {
    let lowered = title.to_lowercase();
    let stripped = ANCHOR_STRIP.replace_all(&lowered, "");
    ANCHOR_SPACES.replace_all(&stripped, "-").into_owned()
}

/// One document covering every crawled page
pub fn combined_document(start_url: &str, pages: &[PageRecord], scraped_at: NaiveDateTime) -> String {
    let now = scraped_at.format(SCRAPED_AT_FORMAT).to_string();
    let domain = domain_of(start_url);

    let mut lines = vec![
        "---".to_string(),
        format!("source: {}", domain),
        format!("start_url: {}", start_url),
        format!("scraped_at: {}", now),
        format!("pages_crawled: {}", pages.len()),
        "---".to_string(),
        String::new(),
        format!("# {}", domain),
        String::new(),
        format!("*Crawled on {} - {} pages*", now, pages.len()),
        String::new(),
        "---".to_string(),
        String::new(),
        "## Contents\n".to_string(),
    ];

    for (i, page) in pages.iter().enumerate() {
        lines.push(format!("{}. [{}](#{})", i + 1, page.title, anchor(&page.title)));
    }
    lines.push("\n---\n".to_string());

    for page in pages {
        lines.push(page_section(page));
    }

    lines.join("\n")
}

/// Section of the combined document for one page
fn page_section(page: &PageRecord) -> String {
    [
        format!("## {}", page.title),
        format!("**URL:** {}", page.url),
        String::new(),
        page.content.clone(),
        String::new(),
        "---".to_string(),
        String::new(),
    ]
    .join("\n")
}

/// Standalone document for one page of a separate-mode crawl
pub fn page_document(page: &PageRecord, scraped_at: NaiveDateTime) -> String {
    let mut lines = front_matter(&page.url, &page.title, scraped_at);
    lines.extend([
        format!("# {}", page.title),
        String::new(),
        page.content.clone(),
        String::new(),
    ]);
    lines.join("\n")
}

/// Document for a single scraped page, listing its internal links
pub fn single_page_document(
    url: &str,
    title: &str,
    content: &str,
    links: &[LinkRecord],
    scraped_at: NaiveDateTime,
) -> String {
    let mut lines = front_matter(url, title, scraped_at);
    lines.extend([
        format!("# {}", title),
        String::new(),
        "## Content".to_string(),
        String::new(),
        content.to_string(),
        String::new(),
    ]);

    if !links.is_empty() {
        lines.push("## Internal links".to_string());
        lines.push(String::new());
        for link in links {
            lines.push(format!("- [{}]({})", link.text, link.url));
        }
    }

    lines.join("\n")
}

fn front_matter(url: &str, title: &str, scraped_at: NaiveDateTime) -> Vec<String> {
    vec![
        "---".to_string(),
        format!("url: {}", url),
        format!("scraped_at: {}", scraped_at.format(SCRAPED_AT_FORMAT)),
        format!("title: {}", title),
        "---".to_string(),
        String::new(),
    ]
}
