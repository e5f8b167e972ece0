use crate::filter::canonicalize;
use std::collections::{HashSet, VecDeque};

/// A URL waiting to be crawled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    /// Canonical URL, the identity used for deduplication
    pub url: String,
    /// URL as it was linked; fetched and used as the base for relative links
    pub location: String,
    /// Hops from the start page
    pub depth: usize,
    /// Page the link was found on
    pub referer: Option<String>,
}

/// Breadth-first work queue with the visited set
///
/// URLs are identified by their canonical form. A URL is marked visited when
/// it is taken for fetching and is never handed out again. Queued URLs are
/// tracked separately so a link is only queued once.
#[derive(Debug, Default)]
pub struct Frontier {
    queue: VecDeque<FrontierEntry>,
    queued: HashSet<String>,
    visited: HashSet<String>,
}

impl Frontier {
    /// Create a frontier holding the seed at depth 0
    pub fn new(seed: &str) -> Self {
        let mut frontier = Self::default();
        let url = canonicalize(seed);
        frontier.queued.insert(url.clone());
        frontier.queue.push_back(FrontierEntry {
            url,
            location: seed.to_string(),
            depth: 0,
            referer: None,
        });
        frontier
    }

    /// Pops entries in FIFO order until one is unvisited and accepted by
    /// `accept`, marks it visited and returns it
    ///
    /// Visited and rejected entries are discarded silently.
    pub fn next<F>(&mut self, accept: F) -> Option<FrontierEntry>
    where
        F: Fn(&str) -> bool,
    {
        while let Some(entry) = self.queue.pop_front() {
            self.queued.remove(&entry.url);

            if self.visited.contains(&entry.url) {
                ::log::trace!("Skipping already visited: {}", entry.url);
                continue;
            }
            if !accept(&entry.url) {
                ::log::trace!("Skipping out of scope: {}", entry.url);
                continue;
            }

            self.visited.insert(entry.url.clone());
            return Some(entry);
        }
        None
    }

    /// Takes up to `limit` entries, in queue order
    pub fn next_batch<F>(&mut self, limit: usize, accept: F) -> Vec<FrontierEntry>
    where
        F: Fn(&str) -> bool,
    {
        let mut batch = Vec::with_capacity(limit);
        while batch.len() < limit {
            match self.next(&accept) {
                Some(entry) => batch.push(entry),
                None => break,
            }
        }
        batch
    }

    /// Queues a discovered URL unless its canonical form was visited or is
    /// already queued
    ///
    /// Returns whether the URL was queued.
    pub fn push(&mut self, location: &str, depth: usize, referer: &str) -> bool {
        let url = canonicalize(location);
        if self.visited.contains(&url) || self.queued.contains(&url) {
            return false;
        }
        self.queued.insert(url.clone());
        self.queue.push_back(FrontierEntry {
            url,
            location: location.to_string(),
            depth,
            referer: Some(referer.to_string()),
        });
        true
    }

    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Entries still waiting
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
