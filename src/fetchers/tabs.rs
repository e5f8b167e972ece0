use crate::parsers::text::raw_text;
use scraper::{Html, Selector};

/// Selectors for elements that behave like tabs
pub const TAB_SELECTORS: &[&str] = &[
    r#"[role="tab"]"#,
    "[data-tab]",
    ".tab-button",
    ".tabs button",
    r#"[class*="tab"][class*="button"]"#,
    r#"button[class*="tab"]"#,
];

/// Length of the text prefix used to recognize an already known code block
const MATCH_PREFIX_CHARS: usize = 50;

/// Class of the wrapper around code blocks recovered from other tabs
pub const EXPANDED_CLASS: &str = "expanded-tab-content";

/// Merges DOM snapshots taken while clicking through tabs
///
/// The first snapshot is the base document. Every `pre` block of a later
/// snapshot whose text is not already present in the base (matched by its
/// first 50 characters) is appended to the end of the base body.
pub fn merge_snapshots(snapshots: &[String]) -> String {
    let Some((base, rest)) = snapshots.split_first() else {
        return String::new();
    };

    let mut known = code_blocks(base);
    let mut appended = String::new();

    for snapshot in rest {
        for block in code_blocks(snapshot) {
            if block.trim().is_empty() {
                continue;
            }
            let prefix = block.chars().take(MATCH_PREFIX_CHARS).collect::<String>();
            if known.iter().any(|existing| existing.contains(&prefix)) {
                continue;
            }
            appended.push_str(&format!(
                r#"<div class="{}"><pre><code>{}</code></pre></div>"#,
                EXPANDED_CLASS,
                escape_text(&block)
            ));
            known.push(block);
        }
    }

    if appended.is_empty() {
        return base.clone();
    }

    ::log::debug!("Merged code blocks from {} tab snapshots", rest.len());
    insert_before_body_end(base, &appended)
}

fn code_blocks(html: &str) -> Vec<String> {
    let doc = Html::parse_document(html);
    let Ok(selector) = Selector::parse("pre") else {
        return Vec::new();
    };
    doc.select(&selector).map(raw_text).collect()
}

fn insert_before_body_end(html: &str, fragment: &str) -> String {
    // ASCII lowercasing keeps byte offsets intact
    let lower = html.to_ascii_lowercase();
    let position = lower
        .rfind("</body>")
        .or_else(|| lower.rfind("</html>"))
        .unwrap_or(html.len());

    let mut merged = String::with_capacity(html.len() + fragment.len());
    merged.push_str(&html[..position]);
    merged.push_str(fragment);
    merged.push_str(&html[position..]);
    merged
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::html::extract_text;

    fn page(code: &str) -> String {
        format!("<html><body><h1>Install</h1><pre><code>{code}</code></pre></body></html>")
    }

    #[test]
    fn test_single_snapshot_unchanged() {
        let base = page("npm install x");
        assert_eq!(merge_snapshots(&[base.clone()]), base);
        assert_eq!(merge_snapshots(&[]), "");
    }

    #[test]
    fn test_new_code_block_appended() {
        let snapshots = vec![page("npm install x"), page("yarn add x"), page("pnpm add x")];
        let merged = merge_snapshots(&snapshots);

        assert!(merged.contains(EXPANDED_CLASS));
        let text = extract_text(&Html::parse_document(&merged));
        assert_eq!(
            text,
            "\n# Install\n\n\n```\nnpm install x\n```\n\n\n```\nyarn add x\n```\n\n\n```\npnpm add x\n```\n"
        );
    }

    #[test]
    fn test_icon_text_ignored_when_matching() {
        let with_icon = "<html><body><pre><svg><title>Copy</title></svg><code>npm install x</code></pre></body></html>";
        let merged = merge_snapshots(&[page("npm install x"), with_icon.to_string()]);
        assert!(!merged.contains(EXPANDED_CLASS));
    }

    #[test]
    fn test_known_block_not_duplicated() {
        let snapshots = vec![page("npm install x"), page("npm install x"), page("yarn add x"), page("yarn add x")];
        let merged = merge_snapshots(&snapshots);
        assert_eq!(merged.matches(EXPANDED_CLASS).count(), 1);
    }

    #[test]
    fn test_shared_prefix_counts_as_known() {
        let boilerplate = "import { something } from 'a-very-long-module-name';\n";
        let snapshots = vec![
            page(&format!("{boilerplate}first()")),
            page(&format!("{boilerplate}second()")),
        ];
        assert!(!merge_snapshots(&snapshots).contains(EXPANDED_CLASS));
    }

    #[test]
    fn test_markup_in_code_is_escaped() {
        let snapshots = vec![page("a"), page("if a &lt; b { &lt;div&gt; }")];
        let merged = merge_snapshots(&snapshots);
        assert!(merged.contains("if a &lt; b { &lt;div&gt; }"));
    }

    #[test]
    fn test_missing_body_end_appends() {
        let merged = merge_snapshots(&["<pre>a</pre>".to_string(), "<pre>b</pre>".to_string()]);
        assert!(merged.starts_with("<pre>a</pre><div"));
    }
}
