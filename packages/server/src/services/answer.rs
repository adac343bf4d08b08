use chrono::Utc;
use common::{QuestionType, ReferenceType, ReputationReason};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use tracing::{info, instrument};

use super::find_active_user_for_update;
use super::reputation::ReputationLedger;
use crate::entity::{fill_blank_answer, mcq_option, question, user_answer};
use crate::error::AppError;

/// Reputation for the first correct answer to a question.
pub const FIRST_CORRECT_ANSWER_POINTS: i32 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub attempt_id: i32,
    pub is_correct: bool,
    pub explanation: Option<String>,
    pub correct_answers: Vec<String>,
    pub reputation_awarded: i32,
}

/// Whether a free-text answer matches any accepted `(answer, case_sensitive)` pair.
/// Surrounding whitespace never matters.
pub fn matches_accepted<'s>(
    submitted: &str,
    accepted: impl IntoIterator<Item = (&'s str, bool)>,
) -> bool {
    let submitted = submitted.trim();
    accepted.into_iter().any(|(answer, case_sensitive)| {
        let answer = answer.trim();
        if case_sensitive {
            answer == submitted
        } else {
            answer.to_lowercase() == submitted.to_lowercase()
        }
    })
}

/// Parse an MCQ submission, which must be the id of one of the question's options.
pub fn parse_option_id(submitted: &str) -> Result<i32, AppError> {
    submitted
        .trim()
        .parse()
        .map_err(|_| AppError::Validation("MCQ answers must be an option id".into()))
}

pub struct AnswerService<'a> {
    conn: &'a DatabaseTransaction,
}

impl<'a> AnswerService<'a> {
    pub fn new(conn: &'a DatabaseTransaction) -> Self {
        Self { conn }
    }

    /// Grade and log one attempt. Only the first correct attempt per (user, question)
    /// earns reputation; the user row is locked before that check.
    #[instrument(skip(self, submitted))]
    pub async fn submit_answer(
        &self,
        user_id: i32,
        question_id: i32,
        submitted: &str,
        time_taken: Option<i32>,
    ) -> Result<AnswerOutcome, AppError> {
        if submitted.trim().is_empty() {
            return Err(AppError::Validation("Answer must not be empty".into()));
        }
        if time_taken.is_some_and(|t| t < 0) {
            return Err(AppError::Validation("time_taken must be >= 0".into()));
        }

        let question = question::Entity::find_by_id(question_id)
            .filter(question::Column::IsActive.eq(true))
            .one(self.conn)
            .await?
            .ok_or_else(|| AppError::NotFound("Question not found".into()))?;

        find_active_user_for_update(self.conn, user_id).await?;

        let (is_correct, correct_answers) = match question.question_type {
            QuestionType::Mcq => {
                let option_id = parse_option_id(submitted)?;
                let options = mcq_option::Entity::find()
                    .filter(mcq_option::Column::QuestionId.eq(question_id))
                    .order_by_asc(mcq_option::Column::Position)
                    .all(self.conn)
                    .await?;
                let is_correct = options.iter().any(|o| o.id == option_id && o.is_correct);
                let correct = options
                    .into_iter()
                    .filter(|o| o.is_correct)
                    .map(|o| o.option_text)
                    .collect();
                (is_correct, correct)
            }
            QuestionType::FillInBlank => {
                let answers = fill_blank_answer::Entity::find()
                    .filter(fill_blank_answer::Column::QuestionId.eq(question_id))
                    .order_by_asc(fill_blank_answer::Column::Id)
                    .all(self.conn)
                    .await?;
                let is_correct = matches_accepted(
                    submitted,
                    answers
                        .iter()
                        .map(|a| (a.correct_answer.as_str(), a.is_case_sensitive)),
                );
                let correct = answers.into_iter().map(|a| a.correct_answer).collect();
                (is_correct, correct)
            }
        };

        let previously_correct = user_answer::Entity::find()
            .filter(user_answer::Column::UserId.eq(user_id))
            .filter(user_answer::Column::QuestionId.eq(question_id))
            .filter(user_answer::Column::IsCorrect.eq(true))
            .count(self.conn)
            .await?
            > 0;

        let attempt = user_answer::ActiveModel {
            user_id: Set(user_id),
            question_id: Set(question_id),
            submitted_answer: Set(submitted.trim().to_string()),
            is_correct: Set(is_correct),
            time_taken: Set(time_taken),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.conn)
        .await?;

        let mut reputation_awarded = 0;
        if is_correct && !previously_correct {
            ReputationLedger::new(self.conn)
                .apply_delta(
                    user_id,
                    FIRST_CORRECT_ANSWER_POINTS,
                    ReputationReason::QuestionAnswered,
                    Some(attempt.id),
                    Some(ReferenceType::Answer),
                )
                .await?;
            reputation_awarded = FIRST_CORRECT_ANSWER_POINTS;
            info!(user_id, question_id, "first correct answer");
        }

        Ok(AnswerOutcome {
            attempt_id: attempt.id,
            is_correct,
            explanation: question.explanation,
            correct_answers,
            reputation_awarded,
        })
    }
}
