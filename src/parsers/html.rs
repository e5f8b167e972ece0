use crate::parsers::text::{find_first, is_stripped, raw_text, text_lines, visible_text};
use scraper::{ElementRef, Html, Selector};

/// Block elements that become one output unit each
const BLOCK_TAGS: &[&str] = &[
    "h1", "h2", "h3", "h4", "h5", "h6", "p", "li", "td", "th", "blockquote", "pre", "code",
];

pub const UNKNOWN_TITLE: &str = "Unknown title";

/// Converts a parsed document into normalized Markdown-like text
///
/// Never fails: a document without any recognized block element falls back to
/// the plain text of the content root.
pub fn extract_text(doc: &Html) -> String {
    let root = content_root(doc);

    let mut blocks = Vec::new();
    collect_blocks(root, &mut blocks);

    let lines = blocks.into_iter().filter_map(render_block).collect::<Vec<_>>();

    if lines.is_empty() {
        ::log::trace!("No block elements found, falling back to plain text");
        return text_lines(root);
    }

    lines.join("\n")
}

/// Picks the element holding the main content
///
/// First match of `<main>`, `<article>`, `#content`, `.content`, `<body>`,
/// else the document element.
pub fn content_root(doc: &Html) -> ElementRef<'_> {
    let document = doc.root_element();
    let candidates: [&dyn Fn(&ElementRef) -> bool; 5] = [
        &|e| e.value().name() == "main",
        &|e| e.value().name() == "article",
        &|e| e.value().id() == Some("content"),
        &|e| e.value().classes().any(|c| c == "content"),
        &|e| e.value().name() == "body",
    ];

    candidates
        .iter()
        .find_map(|predicate| find_first(document, predicate))
        .unwrap_or(document)
}

/// Gathers block elements in document order; `pre` subtrees are consumed whole
fn collect_blocks<'a>(element: ElementRef<'a>, blocks: &mut Vec<ElementRef<'a>>) {
    for child in element.children().filter_map(ElementRef::wrap) {
        if is_stripped(&child) {
            continue;
        }
        let name = child.value().name();
        if BLOCK_TAGS.contains(&name) {
            blocks.push(child);
        }
        if name != "pre" {
            collect_blocks(child, blocks);
        }
    }
}

fn render_block(element: ElementRef) -> Option<String> {
    let name = element.value().name();

    if name == "pre" {
        return render_code_block(element);
    }

    let text = visible_text(element);
    if text.is_empty() {
        return None;
    }

    let line = match name {
        "code" => format!("`{}`", text),
        "li" => format!("- {}", text),
        "blockquote" => format!("> {}", text),
        _ => match heading_level(name) {
            Some(level) => format!("\n{} {}\n", "#".repeat(level), text),
            None => text,
        },
    };
    Some(line)
}

fn render_code_block(pre: ElementRef) -> Option<String> {
    let code = raw_text(pre);
    let code = code.trim();
    if code.is_empty() {
        return None;
    }

    let lang = code_language(pre).unwrap_or_default();
    Some(format!("\n```{}\n{}\n```\n", lang, code))
}

/// Language tag from a `language-X` class on the first `code` inside `pre`
fn code_language(pre: ElementRef) -> Option<String> {
    let code = find_first(pre, &|e: &ElementRef| e.value().name() == "code")?;
    code.value()
        .classes()
        .find_map(|class| class.strip_prefix("language-"))
        .filter(|lang| !lang.is_empty())
        .map(str::to_string)
}

fn heading_level(name: &str) -> Option<usize> {
    match name.as_bytes() {
        [b'h', level @ b'1'..=b'6'] => Some((level - b'0') as usize),
        _ => None,
    }
}

/// Extracts the page title
///
/// `<title>`, then the first `<h1>`, then `og:title`, then a placeholder.
pub fn page_title(doc: &Html) -> String {
    let title = first_text(doc, "title")
        .or_else(|| first_text(doc, "h1"))
        .or_else(|| meta_content(doc, r#"meta[property="og:title"]"#));

    title.unwrap_or_else(|| UNKNOWN_TITLE.to_string())
}

fn first_text(doc: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    doc.select(&selector)
        .next()
        .map(|e| e.text().collect::<Vec<_>>().join(" "))
        .map(|t| t.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|t| !t.is_empty())
}

fn meta_content(doc: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    doc.select(&selector)
        .filter_map(|e| e.value().attr("content"))
        .map(str::trim)
        .find(|c| !c.is_empty())
        .map(str::to_string)
}
