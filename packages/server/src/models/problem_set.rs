use chrono::{DateTime, Utc};
use common::Difficulty;
use serde::{Deserialize, Serialize};

use super::question::{MAX_TAGS, QuestionResponse, TagResponse};
use super::shared::{Pagination, validate_title, validate_unique_ids};
use crate::entity::problem_set;
use crate::error::AppError;

pub const MIN_QUESTIONS: usize = 2;
pub const MAX_QUESTIONS: usize = 100;

/// Request body for creating a problem set. Costs one voucher unless the caller is an admin.
#[derive(Clone, Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateProblemSetRequest {
    #[schema(example = "HTTP basics")]
    pub title: String,
    pub description: Option<String>,
    pub difficulty: Option<Difficulty>,
    /// Member questions, in display order. At least two, all active.
    #[schema(example = json!([3, 5, 8]))]
    pub question_ids: Vec<i32>,
    #[serde(default)]
    pub tag_ids: Vec<i32>,
}

pub fn validate_problem_set_draft(draft: &CreateProblemSetRequest) -> Result<(), AppError> {
    validate_title(&draft.title)?;
    if draft.question_ids.len() < MIN_QUESTIONS {
        return Err(AppError::Validation(format!(
            "A problem set needs at least {MIN_QUESTIONS} questions"
        )));
    }
    validate_unique_ids(&draft.question_ids, "question", MAX_QUESTIONS)?;
    validate_unique_ids(&draft.tag_ids, "tag", MAX_TAGS)?;
    Ok(())
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ProblemSetResponse {
    pub id: i32,
    pub author_id: Option<i32>,
    pub title: String,
    pub description: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub upvote_count: i32,
    pub downvote_count: i32,
    pub view_count: i32,
    pub question_count: i32,
    pub is_verified: bool,
    pub verified_by: Option<i32>,
    pub verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<problem_set::Model> for ProblemSetResponse {
    fn from(m: problem_set::Model) -> Self {
        Self {
            id: m.id,
            author_id: m.author_id,
            title: m.title,
            description: m.description,
            difficulty: m.difficulty,
            upvote_count: m.upvote_count,
            downvote_count: m.downvote_count,
            view_count: m.view_count,
            question_count: m.question_count,
            is_verified: m.is_verified,
            verified_by: m.verified_by,
            verified_at: m.verified_at,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ProblemSetQuestionItem {
    pub position: i32,
    pub question: QuestionResponse,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ProblemSetDetailResponse {
    #[serde(flatten)]
    pub problem_set: ProblemSetResponse,
    /// Active member questions ordered by position.
    pub questions: Vec<ProblemSetQuestionItem>,
    pub tags: Vec<TagResponse>,
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct ProblemSetListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    /// `newest` (default), `popular` or `upvotes`.
    pub sort: Option<String>,
    pub verified: Option<bool>,
    pub author_id: Option<i32>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ProblemSetListResponse {
    pub data: Vec<ProblemSetResponse>,
    pub pagination: Pagination,
}
