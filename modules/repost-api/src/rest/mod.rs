use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use crate::AppState;

pub mod analyze;

#[derive(Debug, Deserialize)]
pub struct TrackRequest {
    #[serde(default)]
    event: String,
    #[serde(default)]
    visitor: Option<String>,
}

/// Usage event recording. Tracking must never fail a client, so a
/// malformed payload is a silent no-op and the answer is always
/// success.
pub async fn api_track(
    State(state): State<Arc<AppState>>,
    body: Result<Json<TrackRequest>, JsonRejection>,
) -> impl IntoResponse {
    if let Ok(Json(request)) = body {
        let event = request.event.trim();
        if !event.is_empty() {
            state
                .tracker
                .record_event(event, request.visitor.as_deref())
                .await;
        }
    }
    Json(serde_json::json!({ "success": true }))
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use axum::Router;
    use tower::ServiceExt;

    use repost_engine::ai::AiCommentGenerator;
    use repost_engine::analytics::UsageTracker;
    use repost_engine::analyzer::Analyzer;
    use repost_engine::cache::ResponseCache;
    use repost_engine::pipeline::CommentPipeline;
    use repost_engine::store::KeyValueStore;
    use repost_engine::testing::{MemoryStore, MockScraper};

    use super::*;

    fn service_over(store: Arc<MemoryStore>) -> Router {
        let store: Arc<dyn KeyValueStore> = store;
        let tracker = Arc::new(UsageTracker::new(store.clone()));
        let analyzer = Analyzer::new(
            Arc::new(MockScraper::new()),
            CommentPipeline::new(AiCommentGenerator::new(None)),
            ResponseCache::new(store, 86_400),
            tracker.clone(),
        );
        crate::router(Arc::new(AppState { analyzer, tracker }))
    }

    fn track_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/track")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn response_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    // --- TrackRequest ---

    #[test]
    fn track_request_tolerates_extra_fields() {
        let request: TrackRequest =
            serde_json::from_str(r#"{"event": "page_view", "visitor": "v-1", "extra": 42}"#)
                .unwrap();
        assert_eq!(request.event, "page_view");
        assert_eq!(request.visitor.as_deref(), Some("v-1"));
    }

    #[test]
    fn track_request_defaults_missing_fields() {
        let request: TrackRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(request.event, "");
        assert_eq!(request.visitor, None);
    }

    // --- api_track ---

    #[tokio::test]
    async fn track_records_events_through_the_router() {
        let store = Arc::new(MemoryStore::new());
        let app = service_over(store.clone());

        let response = app
            .oneshot(track_request(r#"{"event": "Copy-Comment", "visitor": "v-1"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response_json(response).await,
            serde_json::json!({ "success": true })
        );

        assert_eq!(store.counter("repost:stats:event:copy-comment"), 1);
    }

    #[tokio::test]
    async fn malformed_track_bodies_are_a_silent_success() {
        let store = Arc::new(MemoryStore::new());
        let app = service_over(store.clone());

        let response = app.oneshot(track_request("깨진 본문")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response_json(response).await,
            serde_json::json!({ "success": true })
        );

        assert!(store.list("repost:events:recent").is_empty());
    }
}
