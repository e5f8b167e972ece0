//! Writing assembled documents to disk

use crate::documents::{combined_document, page_document, single_page_document};
use crate::results::{LinkRecord, PageRecord};
use crate::utils::{domain_of, page_filename, url_slug};
use chrono::NaiveDateTime;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Directory results are written to when no output path is given
pub const OUTPUT_DIR: &str = "scraper_results";

/// Timestamp format used in output file and directory names
pub const FILE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Where a run writes its results
#[derive(Debug, Clone)]
pub struct OutputTarget {
    dir: PathBuf,
    file: Option<PathBuf>,
}

impl Default for OutputTarget {
    fn default() -> Self {
        Self::new(OUTPUT_DIR)
    }
}

impl OutputTarget {
    /// Write derived file names under `dir`
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            file: None,
        }
    }

    /// Use `file` for combined and single-page documents instead of a derived name
    pub fn with_file(mut self, file: Option<PathBuf>) -> Self {
        self.file = file;
        self
    }

    /// Path of the combined crawl document
    pub fn combined_path(&self, start_url: &str, at: NaiveDateTime) -> PathBuf {
        self.file.clone().unwrap_or_else(|| {
            self.dir.join(format!(
                "{}_crawl_{}.md",
                url_slug(start_url),
                at.format(FILE_TIMESTAMP_FORMAT)
            ))
        })
    }

    /// Path of a single-page document
    pub fn single_page_path(&self, url: &str, at: NaiveDateTime) -> PathBuf {
        self.file.clone().unwrap_or_else(|| {
            self.dir
                .join(format!("{}_{}.md", url_slug(url), at.format(FILE_TIMESTAMP_FORMAT)))
        })
    }

    /// Directory holding the per-page documents of a separate-mode crawl
    pub fn separate_dir(&self, start_url: &str, at: NaiveDateTime) -> PathBuf {
        self.dir.join(format!(
            "{}_{}",
            domain_of(start_url).replace('.', "_"),
            at.format(FILE_TIMESTAMP_FORMAT)
        ))
    }

    /// Write every page into one document
    pub fn write_combined(
        &self,
        start_url: &str,
        pages: &[PageRecord],
        at: NaiveDateTime,
    ) -> io::Result<PathBuf> {
        let path = self.combined_path(start_url, at);
        write_file(&path, &combined_document(start_url, pages, at))?;
        ::log::info!("Saved {} pages to {}", pages.len(), path.display());
        Ok(path)
    }

    /// Write one document per page into a fresh directory
    pub fn write_separate(
        &self,
        start_url: &str,
        pages: &[PageRecord],
        at: NaiveDateTime,
    ) -> io::Result<Vec<PathBuf>> {
        let dir = self.separate_dir(start_url, at);
        fs::create_dir_all(&dir)?;

        let mut seen: HashMap<String, usize> = HashMap::new();
        let mut written = Vec::with_capacity(pages.len());
        for page in pages {
            let path = dir.join(unique_name(page_filename(&page.url), &mut seen));
            write_file(&path, &page_document(page, at))?;
            written.push(path);
        }

        ::log::info!("Saved {} pages to {}", written.len(), dir.display());
        Ok(written)
    }

    /// Write the document of a single scraped page
    pub fn write_single_page(
        &self,
        url: &str,
        title: &str,
        content: &str,
        links: &[LinkRecord],
        at: NaiveDateTime,
    ) -> io::Result<PathBuf> {
        let path = self.single_page_path(url, at);
        write_file(&path, &single_page_document(url, title, content, links, at))?;
        ::log::info!("Saved page to {}", path.display());
        Ok(path)
    }
}

/// Suffixes repeated file names with a counter: `a.md`, `a_2.md`, ...
fn unique_name(name: String, seen: &mut HashMap<String, usize>) -> String {
    let count = seen.entry(name.clone()).or_insert(0);
    *count += 1;
    if *count == 1 {
        return name;
    }
    let stem = name.strip_suffix(".md").unwrap_or(&name);
    format!("{}_{}.md", stem, count)
}

fn write_file(path: &Path, contents: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, contents)
}
