use tracing::info;

use repost_common::BlogDocument;

use crate::ai::AiCommentGenerator;
use crate::templates::TemplateCommentGenerator;

/// Size of every finished comment set.
pub const COMMENT_SET_SIZE: usize = 8;

/// Last-resort comments, appended when AI and template output together
/// still come up short. Distinct from everything in the template pools
/// so padding can always finish the set.
pub const FILLER_COMMENTS: &[&str] = &[
    "오늘도 좋은 글 잘 보고 갑니다! 감사합니다 😊",
    "내용 정리가 깔끔해서 한눈에 들어오네요!",
    "덕분에 새로운 걸 알아가요! 감사합니다!",
    "시간 가는 줄 모르고 읽었어요! 다음 포스팅도 기대됩니다!",
    "이웃 추가하고 갑니다! 자주 들를게요!",
    "필요했던 내용인데 정리해주셔서 감사해요!",
    "글 잘 읽었습니다! 오늘 하루도 화이팅하세요!",
    "포스팅 퀄리티가 정말 높네요! 잘 보고 갑니다 👍",
];

/// Append `comment` to `comments` if it is non-blank, not already
/// present, and the list is under `cap`. First occurrence wins. Returns
/// whether the comment went in.
pub fn push_unique(comments: &mut Vec<String>, comment: String, cap: usize) -> bool {
    if comments.len() >= cap {
        return false;
    }
    let trimmed = comment.trim();
    if trimmed.is_empty() || comments.iter().any(|existing| existing == trimmed) {
        return false;
    }
    comments.push(trimmed.to_string());
    true
}

/// The comment fallback chain: AI first, keyword templates to top up or
/// replace, filler to finish. Always produces exactly
/// [`COMMENT_SET_SIZE`] distinct comments.
pub struct CommentPipeline {
    ai: AiCommentGenerator,
    templates: TemplateCommentGenerator,
}

impl CommentPipeline {
    pub fn new(ai: AiCommentGenerator) -> Self {
        Self {
            ai,
            templates: TemplateCommentGenerator,
        }
    }

    pub async fn generate(&self, blog: &BlogDocument) -> Vec<String> {
        let mut comments: Vec<String> = Vec::new();

        match self.ai.generate(&blog.title, &blog.content).await {
            Some(ai_comments) => {
                for comment in ai_comments {
                    push_unique(&mut comments, comment, COMMENT_SET_SIZE);
                }
                if comments.len() < COMMENT_SET_SIZE {
                    info!(
                        ai = comments.len(),
                        "AI set is partial, topping up from templates"
                    );
                    self.append_templates(&mut comments, blog);
                } else {
                    info!("AI comment generation succeeded");
                }
            }
            None => {
                info!("AI unavailable, using template comments");
                self.append_templates(&mut comments, blog);
            }
        }

        for filler in FILLER_COMMENTS {
            if comments.len() >= COMMENT_SET_SIZE {
                break;
            }
            push_unique(&mut comments, (*filler).to_string(), COMMENT_SET_SIZE);
        }

        comments
    }

    fn append_templates(&self, comments: &mut Vec<String>, blog: &BlogDocument) {
        for comment in self.templates.generate(&blog.title, &blog.content) {
            push_unique(comments, comment, COMMENT_SET_SIZE);
        }
    }
}
