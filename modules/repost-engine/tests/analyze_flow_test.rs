//! The full analyze flow wired together with test doubles: cache
//! lookups, scraping, comment generation, cache writes, and the usage
//! counters each call leaves behind.

use std::sync::Arc;

use chrono::{Days, Utc};
use repost_engine::ai::AiCommentGenerator;
use repost_engine::analytics::UsageTracker;
use repost_engine::analyzer::Analyzer;
use repost_engine::cache::{cache_key, ResponseCache};
use repost_engine::pipeline::{CommentPipeline, COMMENT_SET_SIZE};
use repost_engine::store::{KeyValueStore, NoopStore};
use repost_engine::testing::{MemoryStore, MockScraper};

const POST: &str = "https://blog.naver.com/foodlover/223456789012";
const POST_MOBILE: &str = "https://m.blog.naver.com/foodlover/223456789012";

fn food_scraper() -> MockScraper {
    MockScraper::new().on_page(POST, "제주도 맛집 추천", "흑돼지 구이 후기")
}

fn analyzer_over(scraper: MockScraper, store: Arc<MemoryStore>) -> Analyzer {
    let store: Arc<dyn KeyValueStore> = store;
    Analyzer::new(
        Arc::new(scraper),
        CommentPipeline::new(AiCommentGenerator::new(None)),
        ResponseCache::new(store.clone(), 86_400),
        Arc::new(UsageTracker::new(store)),
    )
}

// ---------------------------------------------------------------------------
// Analyze flow
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fresh_analysis_scrapes_generates_and_caches() {
    let store = Arc::new(MemoryStore::new());
    let analyzer = analyzer_over(food_scraper(), store.clone());

    let outcome = analyzer.analyze(POST, false).await;

    assert!(!outcome.from_cache);
    assert!(outcome.cached_at.is_none());
    assert_eq!(outcome.blog.title, "제주도 맛집 추천");
    assert_eq!(outcome.comments.len(), COMMENT_SET_SIZE);
    assert!(store.value(&cache_key(POST)).is_some());

    assert_eq!(store.counter("repost:stats:analyze:total"), 1);
    assert_eq!(store.counter("repost:stats:analyze:success"), 1);
    assert_eq!(store.counter("repost:stats:analyze:cache_hits"), 0);
    assert_eq!(store.counter("repost:stats:analyze:failed"), 0);
}

#[tokio::test]
async fn second_call_is_served_from_the_cache() {
    let store = Arc::new(MemoryStore::new());
    let first = analyzer_over(food_scraper(), store.clone());
    let fresh = first.analyze(POST, false).await;

    // A second analyzer with nothing scripted proves the hit never
    // reaches the scraper.
    let second = analyzer_over(MockScraper::new(), store.clone());
    let hit = second.analyze(POST, false).await;

    assert!(hit.from_cache);
    assert!(hit.cached_at.is_some());
    assert_eq!(hit.blog.title, "제주도 맛집 추천");
    assert_eq!(hit.comments, fresh.comments);

    assert_eq!(store.counter("repost:stats:analyze:total"), 2);
    assert_eq!(store.counter("repost:stats:analyze:cache_hits"), 1);
}

#[tokio::test]
async fn mobile_url_hits_the_desktop_entry() {
    let store = Arc::new(MemoryStore::new());
    analyzer_over(food_scraper(), store.clone())
        .analyze(POST, false)
        .await;

    let via_mobile = analyzer_over(MockScraper::new(), store)
        .analyze(POST_MOBILE, false)
        .await;
    assert!(via_mobile.from_cache);
    assert_eq!(via_mobile.blog.title, "제주도 맛집 추천");
}

#[tokio::test]
async fn force_refresh_skips_the_lookup_and_rewrites() {
    let store = Arc::new(MemoryStore::new());
    analyzer_over(food_scraper(), store.clone())
        .analyze(POST, false)
        .await;

    let updated =
        MockScraper::new().on_page(POST, "제주도 맛집 추천 (수정판)", "흑돼지 구이 후기");
    let refreshed = analyzer_over(updated, store.clone())
        .analyze(POST, true)
        .await;
    assert!(!refreshed.from_cache);
    assert_eq!(refreshed.blog.title, "제주도 맛집 추천 (수정판)");

    // The rewrite is what later calls see.
    let after = analyzer_over(MockScraper::new(), store).analyze(POST, false).await;
    assert!(after.from_cache);
    assert_eq!(after.blog.title, "제주도 맛집 추천 (수정판)");
}

#[tokio::test]
async fn cache_write_failure_still_serves_the_fresh_result() {
    let store = Arc::new(MemoryStore::new().failing_writes());
    let analyzer = analyzer_over(food_scraper(), store.clone());

    let outcome = analyzer.analyze(POST, false).await;
    assert!(!outcome.from_cache);
    assert_eq!(outcome.blog.title, "제주도 맛집 추천");
    assert_eq!(outcome.comments.len(), COMMENT_SET_SIZE);
    assert_eq!(store.value(&cache_key(POST)), None);
}

#[tokio::test]
async fn unscripted_url_degrades_to_a_placeholder_analysis() {
    let store = Arc::new(MemoryStore::new());
    let analyzer = analyzer_over(MockScraper::new(), store.clone());

    let outcome = analyzer.analyze("https://example.com/gone", false).await;
    assert_eq!(outcome.blog.title, "오류");
    assert_eq!(outcome.comments.len(), COMMENT_SET_SIZE);
    // Placeholder analyses are cached like any other.
    assert!(store.value(&cache_key("https://example.com/gone")).is_some());
}

#[tokio::test]
async fn noop_store_serves_every_call_fresh() {
    let analyzer = Analyzer::new(
        Arc::new(food_scraper()),
        CommentPipeline::new(AiCommentGenerator::new(None)),
        ResponseCache::new(Arc::new(NoopStore), 86_400),
        Arc::new(UsageTracker::new(Arc::new(NoopStore))),
    );

    let first = analyzer.analyze(POST, false).await;
    let second = analyzer.analyze(POST, false).await;
    assert!(!first.from_cache);
    assert!(!second.from_cache);
    assert_eq!(first.comments.len(), COMMENT_SET_SIZE);
}

// ---------------------------------------------------------------------------
// Usage tracking
// ---------------------------------------------------------------------------

#[tokio::test]
async fn record_event_touches_counter_visitors_and_event_list() {
    let store = Arc::new(MemoryStore::new());
    let tracker = UsageTracker::new(store.clone());

    tracker.record_event("Copy-Comment", Some("visitor-1")).await;

    assert_eq!(store.counter("repost:stats:event:copy-comment"), 1);
    let today = Utc::now().format("%Y-%m-%d");
    assert_eq!(store.set_len(&format!("repost:visitors:{today}")), 1);
    let events = store.list("repost:events:recent");
    assert_eq!(events.len(), 1);
    assert!(events[0].contains("copy-comment"));
}

#[tokio::test]
async fn blank_event_names_are_ignored() {
    let store = Arc::new(MemoryStore::new());
    let tracker = UsageTracker::new(store.clone());

    tracker.record_event("   ", Some("visitor-1")).await;

    let today = Utc::now().format("%Y-%m-%d");
    assert_eq!(store.set_len(&format!("repost:visitors:{today}")), 0);
    assert!(store.list("repost:events:recent").is_empty());
}

#[tokio::test]
async fn events_without_a_visitor_skip_the_visitor_set() {
    let store = Arc::new(MemoryStore::new());
    let tracker = UsageTracker::new(store.clone());

    tracker.record_event("page_view", None).await;
    tracker.record_event("page_view", Some("   ")).await;

    assert_eq!(store.counter("repost:stats:event:page_view"), 2);
    let today = Utc::now().format("%Y-%m-%d");
    assert_eq!(store.set_len(&format!("repost:visitors:{today}")), 0);
}

#[tokio::test]
async fn recent_events_come_back_newest_first() {
    let store = Arc::new(MemoryStore::new());
    let tracker = UsageTracker::new(store.clone());

    for name in ["first", "second", "third"] {
        tracker.record_event(name, None).await;
    }

    let events = tracker.recent_events(2).await;
    assert_eq!(events.len(), 2);
    assert!(events[0].contains("third"));
    assert!(events[1].contains("second"));
}

#[tokio::test]
async fn a_zero_event_limit_reads_nothing() {
    let store = Arc::new(MemoryStore::new());
    let tracker = UsageTracker::new(store.clone());

    tracker.record_event("first", None).await;
    tracker.record_event("second", None).await;

    assert!(tracker.recent_events(0).await.is_empty());
    assert!(tracker.recent_events(-1).await.is_empty());
}

#[tokio::test]
async fn unique_visitors_unions_the_daily_sets() {
    let store = Arc::new(MemoryStore::new());
    let tracker = UsageTracker::new(store.clone());

    tracker.record_event("page_view", Some("v-today")).await;
    tracker.record_event("page_view", Some("v-both")).await;

    let yesterday = Utc::now()
        .date_naive()
        .checked_sub_days(Days::new(1))
        .unwrap();
    let yesterday_key = format!("repost:visitors:{}", yesterday.format("%Y-%m-%d"));
    store.sadd(&yesterday_key, "v-both").await.unwrap();
    store.sadd(&yesterday_key, "v-yesterday").await.unwrap();

    assert_eq!(tracker.unique_visitors(1).await, 2);
    assert_eq!(tracker.unique_visitors(7).await, 3);
    assert_eq!(tracker.today_visitors().await, 2);
}

#[tokio::test]
async fn tracking_failures_stay_silent() {
    let store = Arc::new(MemoryStore::new().failing_writes());
    let tracker = UsageTracker::new(store);

    // Nothing to assert beyond not panicking and not erroring out.
    tracker.record_analyze(false, true).await;
    tracker.record_event("page_view", Some("v-1")).await;
}
