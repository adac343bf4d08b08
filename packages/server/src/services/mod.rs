//! Transactional core: votes, reputation, voucher-gated issuance, verification.
//!
//! Write services borrow a `DatabaseTransaction` and never commit it themselves,
//! except [`vote::VoteEngine`], which owns its retries, and
//! [`reputation::apply_reputation_delta`].

pub mod answer;
pub mod ingest;
pub mod issuance;
pub mod reputation;
pub mod verification;
pub mod vote;

use sea_orm::{ConnectionTrait, EntityTrait, QuerySelect, sea_query::LockType};

use crate::entity::user;
use crate::error::AppError;

/// Lock an active user row for the rest of the transaction.
pub(crate) async fn find_active_user_for_update<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
) -> Result<user::Model, AppError> {
    user::Entity::find_by_id(user_id)
        .lock(LockType::Update)
        .one(conn)
        .await?
        .filter(|u| u.is_active)
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}

/// Only active admins may perform moderation and import actions.
pub(crate) async fn require_admin<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
) -> Result<user::Model, AppError> {
    match user::Entity::find_by_id(user_id).one(conn).await? {
        Some(u) if u.is_active && u.role.is_admin() => Ok(u),
        _ => Err(AppError::PermissionDenied),
    }
}
