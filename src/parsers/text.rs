use regex::Regex;
use scraper::ElementRef;
use std::sync::LazyLock;

/// Subtrees that never contribute readable text
pub const STRIPPED_TAGS: &[&str] = &[
    "script", "style", "nav", "footer", "header", "aside", "noscript", "iframe", "svg",
];

static BLANK_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("static regex is valid"));

/// Whether an element is the root of a stripped subtree
pub fn is_stripped(element: &ElementRef) -> bool {
    STRIPPED_TAGS.contains(&element.value().name())
}

/// Collapses every run of whitespace into a single space and trims the ends
pub fn normalize_whitespace_in_segment(segment: &str) -> String {
    segment.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Collapses 3+ consecutive newlines to exactly 2
pub fn collapse_blank_lines(text: &str) -> String {
    BLANK_RUNS.replace_all(text, "\n\n").into_owned()
}

/// Text of an element outside stripped subtrees, whitespace-normalized
pub fn visible_text(element: ElementRef) -> String {
    let mut chunks = Vec::new();
    collect_text(element, &mut chunks);
    normalize_whitespace_in_segment(&chunks.concat())
}

/// Text of an element outside stripped subtrees, whitespace preserved
pub fn raw_text(element: ElementRef) -> String {
    let mut chunks = Vec::new();
    collect_text(element, &mut chunks);
    chunks.concat()
}

/// Each non-empty text node outside stripped subtrees, trimmed, one per line
///
/// Used when no block element produced output.
pub fn text_lines(element: ElementRef) -> String {
    let mut chunks = Vec::new();
    collect_text(element, &mut chunks);
    let lines = chunks
        .iter()
        .map(|chunk| chunk.trim())
        .filter(|chunk| !chunk.is_empty())
        .collect::<Vec<_>>();
    collapse_blank_lines(&lines.join("\n"))
}

fn collect_text<'a>(element: ElementRef<'a>, chunks: &mut Vec<&'a str>) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            chunks.push(&**text);
        } else if let Some(child_element) = ElementRef::wrap(child) {
            if !is_stripped(&child_element) {
                collect_text(child_element, chunks);
            }
        }
    }
}

/// Finds the first element in document order matching `predicate`,
/// never descending into stripped subtrees
pub fn find_first<'a, F>(element: ElementRef<'a>, predicate: &F) -> Option<ElementRef<'a>>
where
    F: Fn(&ElementRef) -> bool,
{
    for child in element.children().filter_map(ElementRef::wrap) {
        if is_stripped(&child) {
            continue;
        }
        if predicate(&child) {
            return Some(child);
        }
        if let Some(found) = find_first(child, predicate) {
            return Some(found);
        }
    }
    None
}
