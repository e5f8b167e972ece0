use serde::{Deserialize, Serialize};

/// A crawled page with non-empty extracted content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    /// Canonical URL of the page
    pub url: String,

    /// Title of the page
    pub title: String,

    /// Extracted Markdown-like text content
    pub content: String,
}

impl PageRecord {
    /// Create a new page record
    pub fn new(url: String, title: String, content: String) -> Self {
        Self {
            url,
            title,
            content,
        }
    }
}

/// An in-domain hyperlink discovered on a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRecord {
    /// Absolute URL without fragment
    pub url: String,

    /// Anchor text, or the URL path when the anchor has no text
    pub text: String,
}

/// Everything one page yielded
#[derive(Debug, Clone)]
pub struct ScrapedPage {
    pub title: String,
    pub content: String,
    pub links: Vec<LinkRecord>,

    /// Whether the HTML came from the browser
    pub used_render: bool,
}

/// Pages in completion order plus every link recorded while crawling
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrawlReport {
    pub pages: Vec<PageRecord>,
    pub links: Vec<LinkRecord>,
}
