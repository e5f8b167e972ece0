use crate::filter::path_has_prefix;
use crate::results::LinkRecord;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// File extensions that are never followed
pub const SKIP_EXTENSIONS: &[&str] = &[
    ".pdf", ".jpg", ".jpeg", ".png", ".gif", ".svg", ".webp", ".mp3", ".mp4", ".avi", ".mov",
    ".zip", ".rar", ".exe", ".doc", ".docx", ".xls", ".xlsx", ".ppt", ".pptx",
];

/// Extracts same-site links from a parsed document
///
/// Links are resolved against `base_url`, restricted to http(s) on the same
/// authority and the optional `path_prefix`, stripped of fragments, filtered
/// against [`SKIP_EXTENSIONS`] and deduplicated (first occurrence wins).
pub fn extract_links(doc: &Html, base_url: &str, path_prefix: Option<&str>) -> Vec<LinkRecord> {
    let Ok(base) = Url::parse(base_url) else {
        ::log::debug!("Cannot extract links, invalid base URL: {}", base_url);
        return Vec::new();
    };
    let Ok(link_selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for anchor in doc.select(&link_selector) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Some(clean) = clean_link(&base, href, path_prefix) else {
            continue;
        };
        if !seen.insert(clean.to_string()) {
            continue;
        }

        let text = anchor.text().collect::<Vec<_>>().join(" ");
        let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
        let text = if text.is_empty() {
            clean.path().to_string()
        } else {
            text
        };

        links.push(LinkRecord {
            url: clean.to_string(),
            text,
        });
    }

    ::log::debug!("Found {} internal links on {}", links.len(), base_url);
    links
}

/// Resolves and filters a single href; `None` means the link is not followed
fn clean_link(base: &Url, href: &str, path_prefix: Option<&str>) -> Option<Url> {
    let mut resolved = base.join(href.trim()).ok()?;

    if !matches!(resolved.scheme(), "http" | "https") {
        return None;
    }
    if resolved.authority() != base.authority() {
        return None;
    }
    if let Some(prefix) = path_prefix.filter(|p| !p.is_empty()) {
        if !path_has_prefix(resolved.path(), prefix) {
            return None;
        }
    }

    let path = resolved.path().to_lowercase();
    if SKIP_EXTENSIONS.iter().any(|ext| path.ends_with(ext)) {
        return None;
    }

    resolved.set_fragment(None);
    if resolved.query() == Some("") {
        resolved.set_query(None);
    }
    Some(resolved)
}
