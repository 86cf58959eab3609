use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use scraper::{Html, Selector};
use tracing::{debug, warn};

use repost_common::BlogDocument;

use crate::cache::naver_post_ids;

/// Browser user agent. Naver serves a stripped page to unknown clients,
/// so fetches present as a desktop Chrome.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Title candidates, tried in order. `og:title` covers most skins, the
/// class selectors the Naver smart editor and legacy editor.
const TITLE_SELECTORS: &[&str] = &[
    "meta[property=\"og:title\"]",
    "title",
    ".se-title-text",
    ".pcol1",
];

/// Body candidates, tried in order, same fallback idea as the title.
const CONTENT_SELECTORS: &[&str] = &[
    "meta[property=\"og:description\"]",
    ".se-main-container",
    "#postViewArea",
    ".post-view",
    "article",
];

/// Fetches a blog post and extracts title and body.
///
/// `fetch` never fails: network and parse problems fold into a
/// placeholder document so comment generation always has something to
/// work with.
#[async_trait]
pub trait BlogScraper: Send + Sync {
    async fn fetch(&self, url: &str) -> BlogDocument;
}

/// Scraper that fetches pages over HTTP and extracts fields with CSS
/// selectors.
pub struct HttpBlogScraper {
    client: reqwest::Client,
}

impl HttpBlogScraper {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .expect("Failed to build HTTP client");
        Self { client }
    }

    async fn fetch_html(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("request to {url} failed"))?
            .error_for_status()
            .with_context(|| format!("{url} returned an error status"))?;
        response.text().await.context("failed to read response body")
    }

    async fn fetch_document(&self, url: &str) -> Result<BlogDocument> {
        let mut html = self.fetch_html(url).await?;

        // Naver blog pages are an iframe shell; the post itself lives at
        // PostView.naver, so hop there before extracting anything.
        if let Some((blog_id, log_no)) = naver_post_ids(url) {
            let post_url =
                format!("https://blog.naver.com/PostView.naver?blogId={blog_id}&logNo={log_no}");
            debug!(url, post_url, "Following Naver post frame");
            html = self.fetch_html(&post_url).await?;
        }

        let title = extract_first(&html, TITLE_SELECTORS);
        let content = extract_first(&html, CONTENT_SELECTORS);
        Ok(BlogDocument::from_scraped(
            title.as_deref().unwrap_or(""),
            content.as_deref().unwrap_or(""),
            url,
        ))
    }
}

impl Default for HttpBlogScraper {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlogScraper for HttpBlogScraper {
    async fn fetch(&self, url: &str) -> BlogDocument {
        match self.fetch_document(url).await {
            Ok(doc) => doc,
            Err(e) => {
                warn!(url, error = %e, "Blog fetch failed");
                BlogDocument::fetch_error(url, &e.to_string())
            }
        }
    }
}

/// Text of the first selector that matches an element with content.
///
/// Meta tags contribute their `content` attribute, other elements their
/// text nodes trimmed and joined. A selector whose first match is empty
/// is skipped in favor of the next one.
fn extract_first(html: &str, selectors: &[&str]) -> Option<String> {
    let doc = Html::parse_document(html);
    for raw in selectors {
        let Ok(selector) = Selector::parse(raw) else {
            continue;
        };
        let Some(element) = doc.select(&selector).next() else {
            continue;
        };
        let text = match element.value().attr("content") {
            Some(content) if !content.trim().is_empty() => content.trim().to_string(),
            _ => element
                .text()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join(" "),
        };
        if !text.is_empty() {
            return Some(text);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMART_EDITOR_PAGE: &str = r#"
        <html>
          <head>
            <meta property="og:title" content="제주도 맛집 베스트 5"/>
            <meta property="og:description" content="제주도 여행에서 꼭 가봐야 할 맛집들을 정리했습니다."/>
            <title>naver blog</title>
          </head>
          <body>
            <div class="se-main-container">본문은 여기</div>
          </body>
        </html>
    "#;

    #[test]
    fn og_tags_win_over_other_selectors() {
        assert_eq!(
            extract_first(SMART_EDITOR_PAGE, TITLE_SELECTORS).as_deref(),
            Some("제주도 맛집 베스트 5")
        );
        assert_eq!(
            extract_first(SMART_EDITOR_PAGE, CONTENT_SELECTORS).as_deref(),
            Some("제주도 여행에서 꼭 가봐야 할 맛집들을 정리했습니다.")
        );
    }

    #[test]
    fn title_tag_is_used_when_og_title_is_missing() {
        let html = "<html><head><title>일상 기록</title></head><body></body></html>";
        assert_eq!(
            extract_first(html, TITLE_SELECTORS).as_deref(),
            Some("일상 기록")
        );
    }

    #[test]
    fn empty_og_tag_falls_through_to_the_next_selector() {
        let html = r#"
            <html>
              <head><meta property="og:title" content=""/><title>후기 모음</title></head>
            </html>
        "#;
        assert_eq!(
            extract_first(html, TITLE_SELECTORS).as_deref(),
            Some("후기 모음")
        );
    }

    #[test]
    fn element_text_is_joined_across_nodes() {
        let html = r#"
            <html><body>
              <div id="postViewArea"><p>첫 문단</p><p>둘째 문단</p></div>
            </body></html>
        "#;
        assert_eq!(
            extract_first(html, CONTENT_SELECTORS).as_deref(),
            Some("첫 문단 둘째 문단")
        );
    }

    #[test]
    fn page_without_matches_yields_none() {
        let html = "<html><body><div class=\"unrelated\">x</div></body></html>";
        assert_eq!(extract_first(html, CONTENT_SELECTORS), None);
    }
}
