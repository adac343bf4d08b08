use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "comment")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub question_id: i32,
    #[sea_orm(belongs_to, from = "question_id", to = "id")]
    pub question: HasOne<super::question::Entity>,

    pub author_id: Option<i32>,
    #[sea_orm(belongs_to, from = "author_id", to = "id")]
    pub author: HasOne<super::user::Entity>,

    /// Reply target. Always an active comment on the same question at creation time.
    #[sea_orm(indexed)]
    pub parent_id: Option<i32>,

    #[sea_orm(column_type = "Text")]
    pub body: String,

    #[sea_orm(default_value = 0)]
    pub upvote_count: i32,
    #[sea_orm(default_value = 0)]
    pub downvote_count: i32,

    #[sea_orm(default_value = true)]
    pub is_active: bool,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
