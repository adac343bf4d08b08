use common::{ReferenceType, ReputationReason};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Append-only audit row. Never updated or deleted.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reputation_entry")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub user_id: i32,
    #[sea_orm(belongs_to, from = "user_id", to = "id")]
    pub user: HasOne<super::user::Entity>,

    /// The raw requested delta, even when the cached score was clamped.
    pub points_delta: i32,
    pub reason: ReputationReason,

    pub reference_id: Option<i32>,
    pub reference_type: Option<ReferenceType>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
