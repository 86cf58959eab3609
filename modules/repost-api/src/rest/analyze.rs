use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use repost_engine::analyzer::AnalyzeOutcome;

use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    url: String,
    #[serde(default)]
    force_refresh: bool,
}

/// Analyze a blog post URL: scrape it, generate its comment set, and
/// answer with both plus cache metadata.
pub async fn api_analyze(
    State(state): State<Arc<AppState>>,
    body: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => {
            warn!(error = %rejection, "Unreadable analyze request");
            state.tracker.record_analyze(false, false).await;
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": format!("오류가 발생했습니다: {}", rejection.body_text())
                })),
            )
                .into_response();
        }
    };

    let url = request.url.trim();
    if url.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "URL을 입력해주세요." })),
        )
            .into_response();
    }

    let outcome = state.analyzer.analyze(url, request.force_refresh).await;
    Json(response_body(&outcome)).into_response()
}

/// Success payload. `cached_at` only appears on cache hits.
fn response_body(outcome: &AnalyzeOutcome) -> Value {
    let mut body = json!({
        "success": true,
        "blog": &outcome.blog,
        "comments": &outcome.comments,
        "from_cache": outcome.from_cache,
    });
    if let Some(cached_at) = outcome.cached_at {
        body["cached_at"] = json!(cached_at.to_rfc3339());
    }
    body
}
