use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "problem_set_question")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub problem_set_id: i32,
    #[sea_orm(primary_key)]
    pub question_id: i32,
    #[sea_orm(belongs_to, from = "problem_set_id", to = "id")]
    pub problem_set: Option<super::problem_set::Entity>,
    #[sea_orm(belongs_to, from = "question_id", to = "id")]
    pub question: Option<super::question::Entity>,

    /// 1-based order within the set.
    pub position: i32,
}

impl ActiveModelBehavior for ActiveModel {}
