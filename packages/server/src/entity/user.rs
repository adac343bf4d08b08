use common::Role;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub username: String,
    #[sea_orm(unique)]
    pub email: String,
    pub password: String,

    pub role: Role,

    /// Cached result of the reputation ledger. Clamped at zero on every write.
    #[sea_orm(default_value = 0)]
    pub reputation_score: i32,
    #[sea_orm(default_value = 0)]
    pub question_vouchers: i32,

    /// Deactivated accounts can neither vote nor author content.
    #[sea_orm(default_value = true)]
    pub is_active: bool,

    #[sea_orm(has_many)]
    pub questions: HasMany<super::question::Entity>,

    #[sea_orm(has_many)]
    pub problem_sets: HasMany<super::problem_set::Entity>,

    #[sea_orm(has_many)]
    pub comments: HasMany<super::comment::Entity>,

    #[sea_orm(has_many)]
    pub votes: HasMany<super::vote::Entity>,

    #[sea_orm(has_many)]
    pub reputation_entries: HasMany<super::reputation_entry::Entity>,

    #[sea_orm(has_many)]
    pub answers: HasMany<super::user_answer::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
