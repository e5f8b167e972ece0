use scraper::{ElementRef, Html, Selector};

/// Root container ids used by common single-page-app frameworks
const SPA_ROOT_IDS: &[&str] = &["app", "root", "__next", "__nuxt"];

/// Classifies a fetched page as client-rendered
///
/// A page needs the browser when its body has under 500 characters of visible
/// text and more than 5 `<script` tags, or under 200 characters and an SPA
/// root container.
pub fn needs_render(html: &str, doc: &Html) -> bool {
    let Some(text_length) = body_text_length(doc) else {
        return false;
    };

    let script_count = html.to_lowercase().matches("<script").count();
    let has_spa_root = has_spa_root(doc);

    ::log::trace!(
        "Render heuristic: {} text chars, {} scripts, spa root: {}",
        text_length,
        script_count,
        has_spa_root
    );

    (text_length < 500 && script_count > 5) || (text_length < 200 && has_spa_root)
}

/// Visible body text length, ignoring script and style contents
fn body_text_length(doc: &Html) -> Option<usize> {
    let selector = Selector::parse("body").ok()?;
    let body = doc.select(&selector).next()?;
    let mut length = 0;
    count_text(body, &mut length);
    Some(length)
}

fn count_text(element: ElementRef, length: &mut usize) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            *length += text.trim().chars().count();
        } else if let Some(child_element) = ElementRef::wrap(child) {
            if !matches!(child_element.value().name(), "script" | "style") {
                count_text(child_element, length);
            }
        }
    }
}

fn has_spa_root(doc: &Html) -> bool {
    let Ok(selector) = Selector::parse("[id]") else {
        return false;
    };
    doc.select(&selector)
        .filter_map(|e| e.value().id())
        .any(|id| SPA_ROOT_IDS.contains(&id))
}
