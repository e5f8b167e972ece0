pub mod html;
pub mod links;
pub mod text;

#[cfg(test)]
mod tests;

use crate::results::LinkRecord;
use scraper::Html;

/// Result of parsing one HTML page
#[derive(Debug, Clone)]
pub struct ParseResult {
    pub title: String,
    /// Extracted text content
    pub content: String,
    /// Extracted in-domain links
    pub links: Vec<LinkRecord>,
}

/// Runs title, content and link extraction over one document
pub struct Parser;

impl Parser {
    /// Parse an HTML page fetched from `url`
    pub fn parse(html: &str, url: &str, path_prefix: Option<&str>) -> ParseResult {
        let doc = Html::parse_document(html);

        let result = ParseResult {
            title: html::page_title(&doc),
            content: html::extract_text(&doc),
            links: links::extract_links(&doc, url, path_prefix),
        };

        ::log::trace!(
            "Parsed {}: {} chars, {} links",
            url,
            result.content.len(),
            result.links.len()
        );
        result
    }
}
