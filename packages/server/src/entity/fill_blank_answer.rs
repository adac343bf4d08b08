use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "fill_blank_answer")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub question_id: i32,
    #[sea_orm(belongs_to, from = "question_id", to = "id")]
    pub question: HasOne<super::question::Entity>,

    pub correct_answer: String,
    #[sea_orm(default_value = false)]
    pub is_case_sensitive: bool,
}

impl ActiveModelBehavior for ActiveModel {}
