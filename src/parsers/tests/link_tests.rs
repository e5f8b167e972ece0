use crate::parsers::links::extract_links;
use scraper::Html;

fn links(html: &str, base: &str, prefix: Option<&str>) -> Vec<(String, String)> {
    extract_links(&Html::parse_document(html), base, prefix)
        .into_iter()
        .map(|l| (l.url, l.text))
        .collect()
}

#[test]
fn test_relative_links_resolved() {
    let found = links(
        r#"<a href="/about">About</a><a href="guide">Guide</a>"#,
        "https://ex.com/docs/",
        None,
    );
    assert_eq!(
        found,
        vec![
            ("https://ex.com/about".to_string(), "About".to_string()),
            ("https://ex.com/docs/guide".to_string(), "Guide".to_string()),
        ]
    );
}

#[test]
fn test_asset_links_excluded() {
    let found = links(
        r#"<a href="doc.pdf">PDF</a><a href="/img/Logo.PNG">Logo</a><a href="/page">Page</a>"#,
        "https://ex.com/",
        None,
    );
    assert_eq!(found, vec![("https://ex.com/page".to_string(), "Page".to_string())]);
}

#[test]
fn test_fragment_removed_and_deduplicated() {
    let found = links(
        r##"<a href="/x#frag">First</a><a href="/x">Second</a><a href="/x?">Third</a><a href="#top">Top</a>"##,
        "https://ex.com/x",
        None,
    );
    assert_eq!(found, vec![("https://ex.com/x".to_string(), "First".to_string())]);
}

#[test]
fn test_query_kept() {
    let found = links(r#"<a href="/search?q=rust#r">Search</a>"#, "https://ex.com/", None);
    assert_eq!(found[0].0, "https://ex.com/search?q=rust");
}

#[test]
fn test_foreign_hosts_and_schemes_excluded() {
    let found = links(
        r#"<a href="https://other.com/x">Other</a>
           <a href="mailto:me@ex.com">Mail</a>
           <a href="javascript:void(0)">JS</a>
           <a href="http://ex.com:8080/y">Port</a>
           <a href="https://ex.com/ok">Ok</a>"#,
        "https://ex.com/",
        None,
    );
    assert_eq!(found, vec![("https://ex.com/ok".to_string(), "Ok".to_string())]);
}

#[test]
fn test_path_prefix() {
    let found = links(
        r#"<a href="/docs/a">A</a><a href="/blog/x">Blog</a><a href="/docs">Root</a>"#,
        "https://ex.com/docs/",
        Some("/docs/"),
    );
    let urls = found.into_iter().map(|(u, _)| u).collect::<Vec<_>>();
    assert_eq!(urls, vec!["https://ex.com/docs/a", "https://ex.com/docs"]);
}

#[test]
fn test_empty_text_uses_path() {
    let found = links(r#"<a href="/icons/home"><img src="x.png"></a>"#, "https://ex.com/", None);
    assert_eq!(found, vec![("https://ex.com/icons/home".to_string(), "/icons/home".to_string())]);
}

#[test]
fn test_invalid_base_yields_nothing() {
    assert!(links(r#"<a href="/x">X</a>"#, "not a url", None).is_empty());
}
