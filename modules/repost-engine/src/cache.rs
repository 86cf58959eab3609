use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};
use url::Url;

use repost_common::{BlogDocument, CacheEntry};

use crate::store::KeyValueStore;

/// Hosts that serve Naver blog posts in desktop and mobile skins.
const NAVER_BLOG_HOSTS: &[&str] = &["blog.naver.com", "m.blog.naver.com"];

const CACHE_KEY_PREFIX: &str = "repost:cache:";

/// Extract `(blog_id, log_no)` from a Naver blog post URL.
///
/// Handles both the viewer form that carries the ids as query parameters
/// (`PostView.naver?blogId=...&logNo=...`) and the canonical path form
/// (`blog.naver.com/{blogId}/{logNo}`). Returns `None` for anything else,
/// including Naver URLs that do not point at a single post.
pub fn naver_post_ids(url: &str) -> Option<(String, String)> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    if !NAVER_BLOG_HOSTS.contains(&host) {
        return None;
    }

    let mut blog_id = None;
    let mut log_no = None;
    for (key, value) in parsed.query_pairs() {
        match key.as_ref() {
            "blogId" => blog_id = Some(value.into_owned()),
            "logNo" => log_no = Some(value.into_owned()),
            _ => {}
        }
    }
    if let (Some(blog_id), Some(log_no)) = (blog_id, log_no) {
        if !blog_id.is_empty() && !log_no.is_empty() {
            return Some((blog_id, log_no));
        }
    }

    let mut segments = parsed.path_segments()?.filter(|s| !s.is_empty());
    let blog_id = segments.next()?;
    let log_no = segments.next()?;
    // Post numbers are numeric; anything else is a viewer page or menu.
    if !log_no.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some((blog_id.to_string(), log_no.to_string()))
}

/// Normalize a URL for cache keying.
///
/// Desktop and mobile forms of the same Naver post collapse to
/// `blog.naver.com/{blogId}/{logNo}`. Other URLs keep host and path with
/// query and fragment dropped. Input that does not parse as an absolute
/// URL is returned unchanged, which also makes the function idempotent:
/// normalized output has no scheme and falls through untouched.
pub fn normalize_url(raw: &str) -> String {
    if let Some((blog_id, log_no)) = naver_post_ids(raw) {
        return format!("blog.naver.com/{blog_id}/{log_no}");
    }

    match Url::parse(raw) {
        Ok(parsed) => match parsed.host_str() {
            Some(host) => format!("{}{}", host, parsed.path().trim_end_matches('/')),
            None => raw.to_string(),
        },
        Err(_) => raw.to_string(),
    }
}

/// Cache key for a URL: a prefixed 128-bit digest of the normalized form,
/// so every variant of a post maps to the same entry.
pub fn cache_key(url: &str) -> String {
    let digest = md5::compute(normalize_url(url).as_bytes());
    format!("{CACHE_KEY_PREFIX}{digest:x}")
}

/// Cache of finished analyze responses, keyed by normalized URL.
///
/// Lookups and writes are best-effort: a broken store never breaks an
/// analyze call, it only costs a fresh scrape.
pub struct ResponseCache {
    store: Arc<dyn KeyValueStore>,
    ttl_secs: u64,
}

impl ResponseCache {
    pub fn new(store: Arc<dyn KeyValueStore>, ttl_secs: u64) -> Self {
        Self { store, ttl_secs }
    }

    /// Look up a previous response. Store errors and entries that no
    /// longer decode are treated as misses.
    pub async fn get(&self, url: &str) -> Option<CacheEntry> {
        let key = cache_key(url);
        let raw = match self.store.get(&key).await {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(key, error = %e, "Cache read failed");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(entry) => {
                debug!(key, "Cache hit");
                Some(entry)
            }
            Err(e) => {
                warn!(key, error = %e, "Discarding cache entry that does not decode");
                None
            }
        }
    }

    /// Store a finished response. Returns `false` when the write failed;
    /// the caller serves the fresh result either way.
    pub async fn set(&self, url: &str, blog: &BlogDocument, comments: &[String]) -> bool {
        let entry = CacheEntry {
            blog: blog.clone(),
            comments: comments.to_vec(),
            cached_at: Utc::now(),
        };
        let payload = match serde_json::to_string(&entry) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "Failed to serialize cache entry");
                return false;
            }
        };
        let key = cache_key(url);
        match self.store.set_ex(&key, &payload, self.ttl_secs).await {
            Ok(()) => true,
            Err(e) => {
                warn!(key, error = %e, "Cache write failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- naver_post_ids ---

    #[test]
    fn desktop_post_url_yields_ids() {
        let ids = naver_post_ids("https://blog.naver.com/foodlover/223456789012");
        assert_eq!(
            ids,
            Some(("foodlover".to_string(), "223456789012".to_string()))
        );
    }

    #[test]
    fn mobile_post_url_yields_ids() {
        let ids = naver_post_ids("https://m.blog.naver.com/foodlover/223456789012");
        assert_eq!(
            ids,
            Some(("foodlover".to_string(), "223456789012".to_string()))
        );
    }

    #[test]
    fn viewer_url_reads_query_parameters() {
        let ids = naver_post_ids(
            "https://blog.naver.com/PostView.naver?blogId=foodlover&logNo=223456789012",
        );
        assert_eq!(
            ids,
            Some(("foodlover".to_string(), "223456789012".to_string()))
        );
    }

    #[test]
    fn naver_url_without_a_post_is_rejected() {
        assert_eq!(naver_post_ids("https://blog.naver.com/foodlover"), None);
        assert_eq!(naver_post_ids("https://blog.naver.com/"), None);
        assert_eq!(
            naver_post_ids("https://blog.naver.com/PostView.naver?blogId=foodlover"),
            None
        );
    }

    #[test]
    fn non_naver_hosts_are_rejected() {
        assert_eq!(naver_post_ids("https://example.com/foodlover/12345"), None);
        assert_eq!(
            naver_post_ids("https://section.blog.naver.com/foodlover/12345"),
            None
        );
    }

    // --- normalize_url ---

    #[test]
    fn desktop_and_mobile_normalize_to_one_form() {
        let desktop = normalize_url("https://blog.naver.com/foodlover/223456789012");
        let mobile = normalize_url(
            "https://m.blog.naver.com/PostView.naver?blogId=foodlover&logNo=223456789012",
        );
        assert_eq!(desktop, "blog.naver.com/foodlover/223456789012");
        assert_eq!(desktop, mobile);
    }

    #[test]
    fn generic_urls_drop_query_and_fragment() {
        assert_eq!(
            normalize_url("https://example.com/posts/42?utm_source=share#comments"),
            "example.com/posts/42"
        );
    }

    #[test]
    fn trailing_slash_is_dropped() {
        assert_eq!(normalize_url("https://example.com/"), "example.com");
        assert_eq!(
            normalize_url("https://example.com/posts/42/"),
            "example.com/posts/42"
        );
    }

    #[test]
    fn unparseable_input_passes_through() {
        assert_eq!(normalize_url("not a url"), "not a url");
        assert_eq!(normalize_url(""), "");
    }

    #[test]
    fn normalization_is_idempotent() {
        let urls = [
            "https://blog.naver.com/foodlover/223456789012",
            "https://example.com/posts/42?q=1",
            "not a url",
        ];
        for url in urls {
            let once = normalize_url(url);
            assert_eq!(normalize_url(&once), once, "not idempotent for {url}");
        }
    }

    // --- cache_key ---

    #[test]
    fn cache_key_is_prefixed_hex_digest() {
        let key = cache_key("https://example.com/posts/42");
        assert!(key.starts_with("repost:cache:"));
        let digest = &key["repost:cache:".len()..];
        assert_eq!(digest.len(), 32);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn url_variants_share_a_cache_key() {
        let a = cache_key("https://blog.naver.com/foodlover/223456789012");
        let b = cache_key("https://m.blog.naver.com/foodlover/223456789012");
        let c = cache_key(
            "https://blog.naver.com/PostView.naver?blogId=foodlover&logNo=223456789012",
        );
        assert_eq!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn different_posts_get_different_keys() {
        let a = cache_key("https://blog.naver.com/foodlover/1");
        let b = cache_key("https://blog.naver.com/foodlover/2");
        assert_ne!(a, b);
    }
}
