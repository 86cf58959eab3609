use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::text::truncate_chars;

/// Body text kept on a scraped document, in characters.
pub const MAX_CONTENT_CHARS: usize = 1000;
/// Appended when the body was cut at `MAX_CONTENT_CHARS`.
pub const TRUNCATION_MARKER: &str = "...";

/// Placeholder title when extraction found nothing.
pub const FALLBACK_TITLE: &str = "제목 없음";
/// Placeholder body when extraction found nothing.
pub const FALLBACK_CONTENT: &str = "내용을 가져올 수 없습니다.";
/// Title of the document produced when the fetch itself failed.
pub const ERROR_TITLE: &str = "오류";

/// A scraped blog post. `title` and `content` are never empty; `content`
/// is capped at `MAX_CONTENT_CHARS` characters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogDocument {
    pub title: String,
    pub content: String,
    pub url: String,
}

impl BlogDocument {
    /// Build a document from raw scraped fields, applying the length cap
    /// and the never-empty placeholders.
    pub fn from_scraped(title: &str, content: &str, url: &str) -> Self {
        let title = title.trim();
        let content = content.trim();

        let content = if content.chars().count() > MAX_CONTENT_CHARS {
            format!("{}{}", truncate_chars(content, MAX_CONTENT_CHARS), TRUNCATION_MARKER)
        } else {
            content.to_string()
        };

        Self {
            title: if title.is_empty() { FALLBACK_TITLE.to_string() } else { title.to_string() },
            content: if content.is_empty() { FALLBACK_CONTENT.to_string() } else { content },
            url: url.to_string(),
        }
    }

    /// Document returned when the page could not be fetched at all.
    pub fn fetch_error(url: &str, error: &str) -> Self {
        Self {
            title: ERROR_TITLE.to_string(),
            content: format!("블로그 내용을 가져오는 중 오류가 발생했습니다: {error}"),
            url: url.to_string(),
        }
    }
}

/// One cached analyze response, serialized as JSON into the KV store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub blog: BlogDocument,
    pub comments: Vec<String>,
    pub cached_at: DateTime<Utc>,
}
