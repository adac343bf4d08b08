use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::comment;
use crate::error::AppError;

pub const MAX_COMMENT_LENGTH: usize = 5000;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateCommentRequest {
    #[schema(example = "PUT replaces the whole resource, so repeating it is harmless.")]
    pub text: String,
    /// Comment being replied to. Must belong to the same question.
    pub parent_id: Option<i32>,
}

pub fn validate_comment(payload: &CreateCommentRequest) -> Result<(), AppError> {
    let text = payload.text.trim();
    if text.is_empty() || text.chars().count() > MAX_COMMENT_LENGTH {
        return Err(AppError::Validation(format!(
            "Comment must be 1-{MAX_COMMENT_LENGTH} characters"
        )));
    }
    Ok(())
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CommentResponse {
    pub id: i32,
    pub question_id: i32,
    pub author_id: Option<i32>,
    pub parent_id: Option<i32>,
    pub text: String,
    pub upvote_count: i32,
    pub downvote_count: i32,
    pub created_at: DateTime<Utc>,
}

impl From<comment::Model> for CommentResponse {
    fn from(m: comment::Model) -> Self {
        Self {
            id: m.id,
            question_id: m.question_id,
            author_id: m.author_id,
            parent_id: m.parent_id,
            text: m.body,
            upvote_count: m.upvote_count,
            downvote_count: m.downvote_count,
            created_at: m.created_at,
        }
    }
}
