use crate::ConfigError;
use crate::config::CrawlConfig;
use regex::Regex;
use url::Url;

/// Reduces a URL to the form used for deduplication
///
/// Keeps scheme, authority, path and query; drops the fragment and any
/// trailing `/` of the path. Strings that do not parse as URLs get the same
/// treatment textually, so the function is idempotent for every input.
pub fn canonicalize(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => canonical_form(&parsed),
        Err(_) => {
            let without_fragment = url.split('#').next().unwrap_or_default();
            let (path, query) = match without_fragment.split_once('?') {
                Some((path, query)) => (path, Some(query)),
                None => (without_fragment, None),
            };
            let mut canonical = path.trim_end_matches('/').to_string();
            if let Some(query) = query.filter(|q| !q.is_empty()) {
                canonical.push('?');
                canonical.push_str(query);
            }
            canonical
        }
    }
}

/// Canonical form of an already parsed URL
pub fn canonical_form(url: &Url) -> String {
    let mut canonical = format!(
        "{}://{}{}",
        url.scheme(),
        url.authority(),
        url.path().trim_end_matches('/')
    );
    if let Some(query) = url.query().filter(|q| !q.is_empty()) {
        canonical.push('?');
        canonical.push_str(query);
    }
    canonical
}

/// Whether a path lies under a prefix
///
/// Canonical paths lose their trailing slash, so `/docs` is treated as being
/// under `/docs/`.
pub fn path_has_prefix(path: &str, prefix: &str) -> bool {
    path.starts_with(prefix) || (prefix.ends_with('/') && format!("{}/", path) == prefix)
}

/// Decides which URLs belong to a crawl: same authority as the seed, under the
/// optional path prefix, and passing the include/exclude regexes
#[derive(Debug)]
pub struct UrlFilter {
    authority: String,
    path_prefix: Option<String>,
    include_regexes: Vec<Regex>,
    exclude_regexes: Vec<Regex>,
}

impl UrlFilter {
    /// Create a filter scoped to the seed URL
    pub fn new(
        seed: &Url,
        path_prefix: Option<String>,
        include_patterns: &[String],
        exclude_patterns: &[String],
    ) -> Result<Self, ConfigError> {
        // Compile regex patterns
        let mut include_regexes = Vec::with_capacity(include_patterns.len());
        for pattern in include_patterns {
            include_regexes.push(Regex::new(pattern)?);
        }

        let mut exclude_regexes = Vec::with_capacity(exclude_patterns.len());
        for pattern in exclude_patterns {
            exclude_regexes.push(Regex::new(pattern)?);
        }

        Ok(Self {
            authority: seed.authority().to_string(),
            path_prefix: path_prefix.filter(|p| !p.is_empty()),
            include_regexes,
            exclude_regexes,
        })
    }

    /// Create a filter from a crawl configuration
    pub fn from_config(seed: &Url, config: &CrawlConfig) -> Result<Self, ConfigError> {
        Self::new(
            seed,
            config.path_prefix.clone(),
            &config.include_patterns,
            &config.exclude_patterns,
        )
    }

    pub fn path_prefix(&self) -> Option<&str> {
        self.path_prefix.as_deref()
    }

    /// Determine if a URL should be crawled based on all filtering rules
    pub fn should_crawl(&self, url: &Url) -> bool {
        if !self.is_in_domain_scope(url) || !self.is_in_path_scope(url) {
            return false;
        }

        // Exclusions take precedence over inclusions
        let url_str = url.as_str();
        if self.exclude_regexes.iter().any(|re| re.is_match(url_str)) {
            return false;
        }

        self.include_regexes.is_empty() || self.include_regexes.iter().any(|re| re.is_match(url_str))
    }

    /// Same check for a URL string; unparsable URLs are never crawled
    pub fn should_crawl_str(&self, url: &str) -> bool {
        Url::parse(url).map(|u| self.should_crawl(&u)).unwrap_or(false)
    }

    fn is_in_domain_scope(&self, url: &Url) -> bool {
        url.authority() == self.authority
    }

    fn is_in_path_scope(&self, url: &Url) -> bool {
        match &self.path_prefix {
            Some(prefix) => path_has_prefix(url.path(), prefix),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed() -> Url {
        Url::parse("https://example.com/").unwrap()
    }

    #[test]
    fn test_canonicalize_trailing_slash_and_fragment() {
        assert_eq!(canonicalize("https://a.com/x/"), canonicalize("https://a.com/x"));
        assert_eq!(canonicalize("https://a.com/x#intro"), "https://a.com/x");
        assert_eq!(canonicalize("https://a.com/"), "https://a.com");
        assert_eq!(canonicalize("https://a.com/x/?q=1#f"), "https://a.com/x?q=1");
        assert_eq!(canonicalize("https://a.com/x?"), "https://a.com/x");
    }

    #[test]
    fn test_canonicalize_is_idempotent() {
        let inputs = [
            "https://a.com",
            "https://a.com/",
            "https://A.com/Docs//",
            "http://a.com:8080/x/?y=2#z",
            "https://a.com/a%20b/",
            "not a url/",
            "relative/path/?q#frag",
        ];
        for input in inputs {
            let once = canonicalize(input);
            assert_eq!(canonicalize(&once), once, "not idempotent for {input}");
        }
    }

    #[test]
    fn test_path_has_prefix() {
        assert!(path_has_prefix("/docs/intro", "/docs/"));
        assert!(path_has_prefix("/docs", "/docs/"));
        assert!(!path_has_prefix("/blog/x", "/docs/"));
        assert!(!path_has_prefix("/docsy", "/docs/"));
        assert!(path_has_prefix("/docsy", "/docs"));
    }

    #[test]
    fn test_domain_restriction() {
        let filter = UrlFilter::new(&seed(), None, &[], &[]).unwrap();

        let correct_domain = Url::parse("https://example.com/page").unwrap();
        assert!(filter.should_crawl(&correct_domain));

        let wrong_domain = Url::parse("https://other.com/page").unwrap();
        assert!(!filter.should_crawl(&wrong_domain));

        let other_port = Url::parse("https://example.com:8443/page").unwrap();
        assert!(!filter.should_crawl(&other_port));
    }

    #[test]
    fn test_path_restriction() {
        let filter = UrlFilter::new(&seed(), Some("/docs/".to_string()), &[], &[]).unwrap();

        assert!(filter.should_crawl_str("https://example.com/docs/page"));
        assert!(filter.should_crawl_str("https://example.com/docs"));
        assert!(!filter.should_crawl_str("https://example.com/blog/post"));
    }

    #[test]
    fn test_empty_prefix_is_no_restriction() {
        let filter = UrlFilter::new(&seed(), Some(String::new()), &[], &[]).unwrap();
        assert_eq!(filter.path_prefix(), None);
        assert!(filter.should_crawl_str("https://example.com/anything"));
    }

    #[test]
    fn test_regex_patterns() {
        let filter = UrlFilter::new(
            &seed(),
            None,
            &[r"/docs/".to_string()],
            &[r"/docs/draft/".to_string()],
        )
        .unwrap();

        assert!(filter.should_crawl_str("https://example.com/docs/page"));
        assert!(!filter.should_crawl_str("https://example.com/about"));
        assert!(!filter.should_crawl_str("https://example.com/docs/draft/page"));
    }

    #[test]
    fn test_invalid_pattern() {
        let result = UrlFilter::new(&seed(), None, &["(".to_string()], &[]);
        assert!(matches!(result, Err(ConfigError::Pattern(_))));
    }

    #[test]
    fn test_unparsable_url_rejected() {
        let filter = UrlFilter::new(&seed(), None, &[], &[]).unwrap();
        assert!(!filter.should_crawl_str("::not a url"));
    }
}
