use common::{Difficulty, QuestionType};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "question")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// NULL when the author is gone; the question outlives its author.
    pub author_id: Option<i32>,
    #[sea_orm(belongs_to, from = "author_id", to = "id")]
    pub author: HasOne<super::user::Entity>,

    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub question_text: String,
    pub question_type: QuestionType,
    pub difficulty: Option<Difficulty>,
    #[sea_orm(column_type = "Text", nullable)]
    pub explanation: Option<String>,

    // Written only by the vote engine.
    #[sea_orm(default_value = 0)]
    pub upvote_count: i32,
    #[sea_orm(default_value = 0)]
    pub downvote_count: i32,

    #[sea_orm(default_value = 0)]
    pub view_count: i32,

    #[sea_orm(default_value = false, indexed)]
    pub is_verified: bool,
    pub verified_at: Option<DateTimeUtc>,

    /// Soft-delete flag. Inactive questions are invisible to reads and votes.
    #[sea_orm(default_value = true, indexed)]
    pub is_active: bool,

    /// Import provenance: provider name and the provider's id.
    #[sea_orm(unique_key = "question_source")]
    pub source: Option<String>,
    #[sea_orm(unique_key = "question_source")]
    pub external_id: Option<String>,

    #[sea_orm(has_many)]
    pub options: HasMany<super::mcq_option::Entity>,

    #[sea_orm(has_many)]
    pub fill_blank_answers: HasMany<super::fill_blank_answer::Entity>,

    #[sea_orm(has_many)]
    pub comments: HasMany<super::comment::Entity>,

    #[sea_orm(has_many)]
    pub answers: HasMany<super::user_answer::Entity>,

    #[sea_orm(has_many, via = "question_tag")]
    pub tags: HasMany<super::tag::Entity>,

    #[sea_orm(has_many, via = "problem_set_question")]
    pub problem_sets: HasMany<super::problem_set::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
