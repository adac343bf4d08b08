use common::{VoteTarget, VoteType};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A user's current vote on one piece of content.
///
/// The composite unique key guarantees at most one row per (target, user),
/// even when two requests race between lookup and insert.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vote")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique_key = "vote_target_user")]
    pub target_type: VoteTarget,
    #[sea_orm(unique_key = "vote_target_user")]
    pub target_id: i32,
    #[sea_orm(unique_key = "vote_target_user")]
    pub user_id: i32,
    #[sea_orm(belongs_to, from = "user_id", to = "id")]
    pub user: HasOne<super::user::Entity>,

    pub vote_type: VoteType,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
