use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use repost_common::BlogDocument;

use crate::analytics::UsageTracker;
use crate::cache::ResponseCache;
use crate::pipeline::CommentPipeline;
use crate::scrape::BlogScraper;

/// What one analyze call produced. `cached_at` is set only when the
/// response came out of the cache.
#[derive(Debug, Clone)]
pub struct AnalyzeOutcome {
    pub blog: BlogDocument,
    pub comments: Vec<String>,
    pub from_cache: bool,
    pub cached_at: Option<DateTime<Utc>>,
}

/// Ties the pieces together: cache lookup, scrape, comment generation,
/// cache write, usage recording.
pub struct Analyzer {
    scraper: Arc<dyn BlogScraper>,
    pipeline: CommentPipeline,
    cache: ResponseCache,
    tracker: Arc<UsageTracker>,
}

impl Analyzer {
    pub fn new(
        scraper: Arc<dyn BlogScraper>,
        pipeline: CommentPipeline,
        cache: ResponseCache,
        tracker: Arc<UsageTracker>,
    ) -> Self {
        Self {
            scraper,
            pipeline,
            cache,
            tracker,
        }
    }

    /// Analyze a blog post. Infallible by construction: scrape failures
    /// become placeholder documents and the comment chain always
    /// finishes a set, so the worst case is a degraded response.
    pub async fn analyze(&self, url: &str, force_refresh: bool) -> AnalyzeOutcome {
        if !force_refresh {
            if let Some(entry) = self.cache.get(url).await {
                info!(url, "Serving cached analysis");
                self.tracker.record_analyze(true, true).await;
                return AnalyzeOutcome {
                    blog: entry.blog,
                    comments: entry.comments,
                    from_cache: true,
                    cached_at: Some(entry.cached_at),
                };
            }
        }

        let blog = self.scraper.fetch(url).await;
        let comments = self.pipeline.generate(&blog).await;
        self.cache.set(url, &blog, &comments).await;
        self.tracker.record_analyze(false, true).await;
        info!(url, comments = comments.len(), "Analysis complete");

        AnalyzeOutcome {
            blog,
            comments,
            from_cache: false,
            cached_at: None,
        }
    }
}
