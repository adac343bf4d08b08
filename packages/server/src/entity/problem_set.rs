use common::Difficulty;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "problem_set")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub author_id: Option<i32>,
    #[sea_orm(belongs_to, from = "author_id", to = "id")]
    pub author: HasOne<super::user::Entity>,

    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub difficulty: Option<Difficulty>,

    #[sea_orm(default_value = 0)]
    pub upvote_count: i32,
    #[sea_orm(default_value = 0)]
    pub downvote_count: i32,
    #[sea_orm(default_value = 0)]
    pub view_count: i32,

    /// Denormalized size of the `problem_set_question` membership.
    #[sea_orm(default_value = 0)]
    pub question_count: i32,

    /// Changed only by explicit admin action, never by votes.
    #[sea_orm(default_value = false, indexed)]
    pub is_verified: bool,
    pub verified_by: Option<i32>,
    pub verified_at: Option<DateTimeUtc>,

    #[sea_orm(default_value = true, indexed)]
    pub is_active: bool,

    #[sea_orm(has_many, via = "problem_set_question")]
    pub questions: HasMany<super::question::Entity>,

    #[sea_orm(has_many, via = "problem_set_tag")]
    pub tags: HasMany<super::tag::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
