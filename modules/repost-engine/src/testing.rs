//! Test doubles for the analyze pipeline, one per trait boundary:
//! [`MockScraper`] for [`BlogScraper`], [`MockBackend`] for
//! [`CommentBackend`], [`MemoryStore`] for [`KeyValueStore`]. The store
//! is stateful so tests can assert on what got written.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use anyhow::{bail, Result};
use async_trait::async_trait;

use repost_common::BlogDocument;

use crate::ai::CommentBackend;
use crate::scrape::BlogScraper;
use crate::store::KeyValueStore;

// ---------------------------------------------------------------------------
// MockScraper
// ---------------------------------------------------------------------------

/// Scraper with scripted responses per URL. Unscripted URLs produce the
/// same placeholder document the real scraper emits on a failed fetch.
#[derive(Default)]
pub struct MockScraper {
    docs: HashMap<String, BlogDocument>,
}

impl MockScraper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a healthy page at `url`.
    pub fn on_page(self, url: &str, title: &str, content: &str) -> Self {
        let doc = BlogDocument::from_scraped(title, content, url);
        self.on_doc(url, doc)
    }

    /// Script an exact document at `url`.
    pub fn on_doc(mut self, url: &str, doc: BlogDocument) -> Self {
        self.docs.insert(url.to_string(), doc);
        self
    }
}

#[async_trait]
impl BlogScraper for MockScraper {
    async fn fetch(&self, url: &str) -> BlogDocument {
        match self.docs.get(url) {
            Some(doc) => doc.clone(),
            None => BlogDocument::fetch_error(url, "no response scripted for this url"),
        }
    }
}

// ---------------------------------------------------------------------------
// MockBackend
// ---------------------------------------------------------------------------

/// Comment backend with a scripted response, or scripted failure.
/// Records every call so tests can assert on the prompts that went out.
pub struct MockBackend {
    response: Option<String>,
    calls: Mutex<Vec<(String, String)>>,
}

impl MockBackend {
    /// Backend that always answers with `response` verbatim.
    pub fn returning(response: &str) -> Self {
        Self {
            response: Some(response.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Backend that answers with a well-formed comment payload.
    pub fn with_comments(comments: &[&str]) -> Self {
        Self::returning(&serde_json::json!({ "comments": comments }).to_string())
    }

    /// Backend whose calls all fail.
    pub fn failing() -> Self {
        Self {
            response: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn last_user_prompt(&self) -> Option<String> {
        self.calls
            .lock()
            .unwrap()
            .last()
            .map(|(_, user)| user.clone())
    }
}

#[async_trait]
impl CommentBackend for MockBackend {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        self.calls
            .lock()
            .unwrap()
            .push((system_prompt.to_string(), user_prompt.to_string()));
        match &self.response {
            Some(response) => Ok(response.clone()),
            None => bail!("scripted backend failure"),
        }
    }
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

#[derive(Default)]
struct MemoryInner {
    strings: HashMap<String, String>,
    ttls: HashMap<String, u64>,
    counters: HashMap<String, i64>,
    sets: HashMap<String, HashSet<String>>,
    lists: HashMap<String, Vec<String>>,
}

/// In-memory [`KeyValueStore`]. TTLs are recorded but never expire;
/// the failure toggles make every read or write error out, for testing
/// the degraded paths.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
    fail_reads: bool,
    fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_reads(mut self) -> Self {
        self.fail_reads = true;
        self
    }

    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    /// Seed a string key, for pre-populated cache scenarios.
    pub fn with_value(self, key: &str, value: &str) -> Self {
        self.inner
            .lock()
            .unwrap()
            .strings
            .insert(key.to_string(), value.to_string());
        self
    }

    // --- assertion helpers ---

    pub fn value(&self, key: &str) -> Option<String> {
        self.inner.lock().unwrap().strings.get(key).cloned()
    }

    pub fn ttl(&self, key: &str) -> Option<u64> {
        self.inner.lock().unwrap().ttls.get(key).copied()
    }

    pub fn counter(&self, key: &str) -> i64 {
        self.inner
            .lock()
            .unwrap()
            .counters
            .get(key)
            .copied()
            .unwrap_or(0)
    }

    pub fn set_len(&self, key: &str) -> usize {
        self.inner
            .lock()
            .unwrap()
            .sets
            .get(key)
            .map(HashSet::len)
            .unwrap_or(0)
    }

    pub fn list(&self, key: &str) -> Vec<String> {
        self.inner
            .lock()
            .unwrap()
            .lists
            .get(key)
            .cloned()
            .unwrap_or_default()
    }
}

/// Resolve a Redis-style inclusive range against a list of `len`
/// elements. Negative indexes count from the end. `None` means the
/// range selects nothing.
fn range_bounds(len: usize, start: i64, stop: i64) -> Option<(usize, usize)> {
    let len = len as i64;
    let mut start = if start < 0 { len + start } else { start };
    let mut stop = if stop < 0 { len + stop } else { stop };
    if start < 0 {
        start = 0;
    }
    if stop >= len {
        stop = len - 1;
    }
    if len == 0 || start > stop || start >= len {
        return None;
    }
    Some((start as usize, (stop + 1) as usize))
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        if self.fail_reads {
            bail!("scripted read failure");
        }
        Ok(self.inner.lock().unwrap().strings.get(key).cloned())
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()> {
        if self.fail_writes {
            bail!("scripted write failure");
        }
        let mut inner = self.inner.lock().unwrap();
        inner.strings.insert(key.to_string(), value.to_string());
        inner.ttls.insert(key.to_string(), ttl_secs);
        Ok(())
    }

    async fn incr(&self, key: &str) -> Result<i64> {
        if self.fail_writes {
            bail!("scripted write failure");
        }
        let mut inner = self.inner.lock().unwrap();
        let counter = inner.counters.entry(key.to_string()).or_insert(0);
        *counter += 1;
        Ok(*counter)
    }

    async fn sadd(&self, key: &str, member: &str) -> Result<i64> {
        if self.fail_writes {
            bail!("scripted write failure");
        }
        let mut inner = self.inner.lock().unwrap();
        let added = inner
            .sets
            .entry(key.to_string())
            .or_default()
            .insert(member.to_string());
        Ok(added as i64)
    }

    async fn sunionstore(&self, dest: &str, keys: &[String]) -> Result<i64> {
        if self.fail_writes {
            bail!("scripted write failure");
        }
        let mut inner = self.inner.lock().unwrap();
        let mut union = HashSet::new();
        for key in keys {
            if let Some(set) = inner.sets.get(key) {
                union.extend(set.iter().cloned());
            }
        }
        let count = union.len() as i64;
        inner.sets.insert(dest.to_string(), union);
        Ok(count)
    }

    async fn scard(&self, key: &str) -> Result<i64> {
        if self.fail_reads {
            bail!("scripted read failure");
        }
        Ok(self.inner.lock().unwrap().sets.get(key).map(HashSet::len).unwrap_or(0) as i64)
    }

    async fn lpush(&self, key: &str, value: &str) -> Result<i64> {
        if self.fail_writes {
            bail!("scripted write failure");
        }
        let mut inner = self.inner.lock().unwrap();
        let list = inner.lists.entry(key.to_string()).or_default();
        list.insert(0, value.to_string());
        Ok(list.len() as i64)
    }

    async fn lrange(&self, key: &str, start: i64, stop: i64) -> Result<Vec<String>> {
        if self.fail_reads {
            bail!("scripted read failure");
        }
        let inner = self.inner.lock().unwrap();
        let Some(list) = inner.lists.get(key) else {
            return Ok(Vec::new());
        };
        match range_bounds(list.len(), start, stop) {
            Some((from, to)) => Ok(list[from..to].to_vec()),
            None => Ok(Vec::new()),
        }
    }

    async fn ltrim(&self, key: &str, start: i64, stop: i64) -> Result<()> {
        if self.fail_writes {
            bail!("scripted write failure");
        }
        let mut inner = self.inner.lock().unwrap();
        let Some(list) = inner.lists.get_mut(key) else {
            return Ok(());
        };
        match range_bounds(list.len(), start, stop) {
            Some((from, to)) => {
                list.truncate(to);
                list.drain(..from);
            }
            None => list.clear(),
        }
        Ok(())
    }
}
