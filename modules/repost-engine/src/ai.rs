use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

use openai_client::OpenAiClient;
use repost_common::{strip_code_blocks, truncate_chars};

use crate::pipeline::COMMENT_SET_SIZE;

/// Sampling temperature for comment generation. High enough that eight
/// comments on the same post come out varied.
const TEMPERATURE: f32 = 0.8;

const MAX_TOKENS: u32 = 500;

/// Characters of post body shown to the model.
const CONTENT_PREVIEW_CHARS: usize = 500;

/// Fewer usable comments than this and the whole AI result is discarded.
const MIN_USABLE_COMMENTS: usize = 3;

const SYSTEM_PROMPT: &str =
    "당신은 블로그 댓글을 작성하는 친근한 한국인입니다. 자연스럽고 진심 어린 댓글을 작성합니다.";

const USER_PROMPT: &str = r#"다음은 네이버 블로그 글입니다. 이 글을 실제로 읽은 사람처럼 자연스러운 댓글 8개를 한국어로 작성해주세요.

블로그 제목: {title}
블로그 내용: {preview}

요구사항:
1. 실제 블로그 내용을 구체적으로 언급하는 댓글
2. 자연스럽고 친근한 톤
3. 이모지 적절히 사용
4. 길이: 짧은 댓글 5개(10-25자), 긴 댓글 3개(30-50자)
5. 스팸처럼 보이지 않는 진심 어린 댓글
6. 각 댓글은 서로 다른 스타일로

JSON 형식으로 응답:
{"comments": ["댓글1", "댓글2", ...]}"#;

/// A chat completion backend. The production implementation is
/// [`OpenAiBackend`]; tests script one.
#[async_trait]
pub trait CommentBackend: Send + Sync {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String>;
}

/// Backend on the OpenAI chat completions API, JSON mode.
pub struct OpenAiBackend {
    client: OpenAiClient,
}

impl OpenAiBackend {
    pub fn new(api_key: &str, model: &str) -> Self {
        Self {
            client: OpenAiClient::new(api_key, model),
        }
    }
}

#[async_trait]
impl CommentBackend for OpenAiBackend {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        Ok(self
            .client
            .complete_json(system_prompt, user_prompt, TEMPERATURE, MAX_TOKENS)
            .await?)
    }
}

#[derive(Debug, Deserialize)]
struct CommentBatch {
    #[serde(default)]
    comments: Vec<String>,
}

/// AI comment generation. Produces `None` whenever the result is not
/// worth keeping, so callers can fall through to templates without
/// caring why.
pub struct AiCommentGenerator {
    backend: Option<Arc<dyn CommentBackend>>,
}

impl AiCommentGenerator {
    pub fn new(backend: Option<Arc<dyn CommentBackend>>) -> Self {
        Self { backend }
    }

    /// Generate comments for a post. `None` when no backend is
    /// configured, the post body is blank, the call fails, or too few
    /// comments survive validation.
    pub async fn generate(&self, title: &str, content: &str) -> Option<Vec<String>> {
        let backend = self.backend.as_ref()?;
        if content.trim().is_empty() {
            return None;
        }

        let prompt = build_prompt(title, content);
        let raw = match backend.complete(SYSTEM_PROMPT, &prompt).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "AI comment generation failed");
                return None;
            }
        };
        parse_comments(&raw)
    }
}

fn build_prompt(title: &str, content: &str) -> String {
    let preview = truncate_chars(content, CONTENT_PREVIEW_CHARS).trim();
    USER_PROMPT
        .replace("{title}", title)
        .replace("{preview}", preview)
}

/// Parse a model response into comments. Entries are trimmed, blanks
/// dropped, and the batch capped at a full set. Unusable JSON or a batch
/// under the floor comes back as `None`.
fn parse_comments(raw: &str) -> Option<Vec<String>> {
    let cleaned = strip_code_blocks(raw);
    let batch: CommentBatch = match serde_json::from_str(cleaned) {
        Ok(batch) => batch,
        Err(e) => {
            warn!(error = %e, "AI response was not valid comment JSON");
            return None;
        }
    };

    let comments: Vec<String> = batch
        .comments
        .into_iter()
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .take(COMMENT_SET_SIZE)
        .collect();

    if comments.len() < MIN_USABLE_COMMENTS {
        warn!(count = comments.len(), "AI returned too few usable comments");
        return None;
    }
    Some(comments)
}
