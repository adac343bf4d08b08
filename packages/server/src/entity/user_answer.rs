use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_answer")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub user_id: i32,
    #[sea_orm(belongs_to, from = "user_id", to = "id")]
    pub user: HasOne<super::user::Entity>,

    pub question_id: i32,
    #[sea_orm(belongs_to, from = "question_id", to = "id")]
    pub question: HasOne<super::question::Entity>,

    #[sea_orm(column_type = "Text")]
    pub submitted_answer: String,
    pub is_correct: bool,

    /// Seconds, as reported by the client.
    pub time_taken: Option<i32>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
