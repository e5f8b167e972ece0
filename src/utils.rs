use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\-]").expect("static regex is valid"));
static UNDERSCORE_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_+").expect("static regex is valid"));

/// Replaces non-word characters with `_`, collapses runs and trims the ends
pub fn slugify(text: &str) -> String {
    let name = NON_WORD.replace_all(text, "_");
    let name = UNDERSCORE_RUNS.replace_all(&name, "_");
    name.trim_matches('_').to_string()
}

/// File name for one page of a separate-mode crawl, derived from its path
pub fn page_filename(url: &str) -> String {
    let path = Url::parse(url)
        .map(|u| u.path().to_string())
        .unwrap_or_default();
    let name = slugify(path.trim_matches('/'));
    if name.is_empty() {
        "index.md".to_string()
    } else {
        format!("{}.md", name)
    }
}

/// Slug of host and path, used for output file names
pub fn url_slug(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => slugify(&format!("{}{}", parsed.authority(), parsed.path())),
        Err(_) => slugify(url),
    }
}

/// Host of a URL, or the input when it has none
pub fn domain_of(url: &str) -> String {
    Url::parse(url)
        .ok()
        .map(|u| u.authority().to_string())
        .filter(|a| !a.is_empty())
        .unwrap_or_else(|| url.to_string())
}
