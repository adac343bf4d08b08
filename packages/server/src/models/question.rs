use chrono::{DateTime, Utc};
use common::{Difficulty, QuestionType};
use serde::{Deserialize, Serialize};

use super::shared::{Pagination, validate_title, validate_unique_ids};
use crate::entity::{mcq_option, question, tag};
use crate::error::AppError;

pub const MIN_OPTIONS: usize = 2;
pub const MAX_OPTIONS: usize = 10;
pub const MAX_TAGS: usize = 10;

#[derive(Clone, Debug, Deserialize, utoipa::ToSchema)]
pub struct OptionDraft {
    #[schema(example = "PUT")]
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
}

#[derive(Clone, Debug, Deserialize, utoipa::ToSchema)]
pub struct AnswerDraft {
    #[schema(example = "ownership")]
    pub correct_answer: String,
    #[serde(default)]
    pub is_case_sensitive: bool,
}

/// Request body for creating a question. Costs one voucher unless the caller is an admin.
#[derive(Clone, Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateQuestionRequest {
    #[schema(example = "Idempotent HTTP methods")]
    pub title: String,
    #[schema(example = "Which of these HTTP methods is idempotent?")]
    pub question_text: String,
    pub question_type: QuestionType,
    pub difficulty: Option<Difficulty>,
    pub explanation: Option<String>,
    /// Required for `mcq`, forbidden for `fill_in_blank`.
    #[serde(default)]
    pub options: Vec<OptionDraft>,
    /// Required for `fill_in_blank`, forbidden for `mcq`.
    #[serde(default)]
    pub answers: Vec<AnswerDraft>,
    #[serde(default)]
    pub tag_ids: Vec<i32>,
}

pub fn validate_question_draft(draft: &CreateQuestionRequest) -> Result<(), AppError> {
    validate_title(&draft.title)?;
    if draft.question_text.trim().is_empty() {
        return Err(AppError::Validation("Question text must not be empty".into()));
    }
    validate_unique_ids(&draft.tag_ids, "tag", MAX_TAGS)?;

    match draft.question_type {
        QuestionType::Mcq => {
            if !draft.answers.is_empty() {
                return Err(AppError::Validation(
                    "MCQ questions take options, not fill-in answers".into(),
                ));
            }
            if draft.options.len() < MIN_OPTIONS || draft.options.len() > MAX_OPTIONS {
                return Err(AppError::Validation(format!(
                    "MCQ questions need {MIN_OPTIONS}-{MAX_OPTIONS} options"
                )));
            }
            if draft.options.iter().any(|o| o.text.trim().is_empty()) {
                return Err(AppError::Validation("Option text must not be empty".into()));
            }
            if !draft.options.iter().any(|o| o.is_correct) {
                return Err(AppError::Validation(
                    "At least one option must be correct".into(),
                ));
            }
        }
        QuestionType::FillInBlank => {
            if !draft.options.is_empty() {
                return Err(AppError::Validation(
                    "Fill-in-blank questions take answers, not options".into(),
                ));
            }
            if draft.answers.is_empty() {
                return Err(AppError::Validation(
                    "Fill-in-blank questions need at least one answer".into(),
                ));
            }
            if draft.answers.iter().any(|a| a.correct_answer.trim().is_empty()) {
                return Err(AppError::Validation("Answers must not be empty".into()));
            }
        }
    }
    Ok(())
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct QuestionResponse {
    #[schema(example = 1)]
    pub id: i32,
    pub author_id: Option<i32>,
    pub title: String,
    pub question_text: String,
    pub question_type: QuestionType,
    pub difficulty: Option<Difficulty>,
    pub upvote_count: i32,
    pub downvote_count: i32,
    pub view_count: i32,
    pub is_verified: bool,
    pub verified_at: Option<DateTime<Utc>>,
    /// Provider name for imported questions.
    pub source: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<question::Model> for QuestionResponse {
    fn from(m: question::Model) -> Self {
        Self {
            id: m.id,
            author_id: m.author_id,
            title: m.title,
            question_text: m.question_text,
            question_type: m.question_type,
            difficulty: m.difficulty,
            upvote_count: m.upvote_count,
            downvote_count: m.downvote_count,
            view_count: m.view_count,
            is_verified: m.is_verified,
            verified_at: m.verified_at,
            source: m.source,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// An MCQ option as shown to someone answering. Correctness is not revealed.
#[derive(Serialize, utoipa::ToSchema)]
pub struct OptionResponse {
    pub id: i32,
    pub text: String,
    pub position: i32,
}

impl From<mcq_option::Model> for OptionResponse {
    fn from(m: mcq_option::Model) -> Self {
        Self {
            id: m.id,
            text: m.option_text,
            position: m.position,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct TagResponse {
    pub id: i32,
    pub name: String,
}

impl From<tag::Model> for TagResponse {
    fn from(m: tag::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct QuestionDetailResponse {
    #[serde(flatten)]
    pub question: QuestionResponse,
    pub options: Vec<OptionResponse>,
    pub tags: Vec<TagResponse>,
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct QuestionListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    /// `newest` (default), `popular` or `upvotes`.
    pub sort: Option<String>,
    pub verified: Option<bool>,
    pub author_id: Option<i32>,
    pub difficulty: Option<Difficulty>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct QuestionListResponse {
    pub data: Vec<QuestionResponse>,
    pub pagination: Pagination,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct SubmitAnswerRequest {
    /// Option id for MCQ questions, free text for fill-in-blank.
    #[schema(example = "17")]
    pub answer: String,
    /// Seconds spent on the question.
    pub time_taken: Option<i32>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct SubmitAnswerResponse {
    pub attempt_id: i32,
    pub is_correct: bool,
    pub explanation: Option<String>,
    /// Option texts (MCQ) or accepted answers (fill-in-blank).
    pub correct_answers: Vec<String>,
    /// Reputation granted by this attempt; only the first correct attempt earns any.
    #[schema(example = 1)]
    pub reputation_awarded: i32,
}
