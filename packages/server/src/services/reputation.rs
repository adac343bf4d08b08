use chrono::Utc;
use common::reputation::{clamped_reputation, next_voucher_at, vouchers_earned};
use common::{ReferenceType, ReputationReason};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set, sea_query::LockType,
};
use tracing::{info, instrument};

use crate::database;
use crate::entity::{reputation_entry, user};
use crate::error::AppError;

pub const DEFAULT_HISTORY_LIMIT: u64 = 50;
pub const MAX_HISTORY_LIMIT: u64 = 200;

/// Effect of a single [`ReputationLedger::apply_delta`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReputationChange {
    pub new_reputation: i32,
    pub vouchers_earned: i32,
    pub current_vouchers: i32,
}

/// Read model derived from the cached user row only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReputationSummary {
    pub user_id: i32,
    pub reputation_score: i32,
    pub question_vouchers: i32,
    pub next_voucher_at: i32,
    pub points_to_next_voucher: i32,
}

impl ReputationSummary {
    fn new(user_id: i32, reputation_score: i32, question_vouchers: i32) -> Self {
        let next = next_voucher_at(reputation_score);
        Self {
            user_id,
            reputation_score,
            question_vouchers,
            next_voucher_at: next,
            points_to_next_voucher: next - reputation_score,
        }
    }
}

/// Append-only reputation history plus the cached score and voucher balance on `user`.
///
/// Reads work on any connection; [`ReputationLedger::apply_delta`] only exists on a
/// transaction so the user row lock and the entry insert commit together.
pub struct ReputationLedger<'a, C: ConnectionTrait> {
    conn: &'a C,
}

/// Apply a reputation delta in its own transaction.
///
/// Used when the change is not part of a larger write (votes, answers and
/// verification apply their deltas inside their own transactions).
pub async fn apply_reputation_delta(
    db: &DatabaseConnection,
    statement_timeout_ms: u64,
    user_id: i32,
    points: i32,
    reason: ReputationReason,
    reference_id: Option<i32>,
    reference_type: Option<ReferenceType>,
) -> Result<ReputationChange, AppError> {
    let txn = database::begin(db, statement_timeout_ms).await?;
    let change = ReputationLedger::new(&txn)
        .apply_delta(user_id, points, reason, reference_id, reference_type)
        .await?;
    txn.commit().await?;
    Ok(change)
}

impl ReputationLedger<'_, DatabaseTransaction> {
    /// Apply `points` to a user, granting vouchers for every milestone newly crossed.
    ///
    /// The user row is locked for the rest of the transaction. The score is clamped
    /// at zero; the logged entry keeps the raw `points`. A voucher grant is logged as
    /// a separate zero-point entry whose `reference_id` is the number of vouchers granted.
    #[instrument(skip(self))]
    pub async fn apply_delta(
        &self,
        user_id: i32,
        points: i32,
        reason: ReputationReason,
        reference_id: Option<i32>,
        reference_type: Option<ReferenceType>,
    ) -> Result<ReputationChange, AppError> {
        let user = user::Entity::find_by_id(user_id)
            .lock(LockType::Update)
            .one(self.conn)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".into()))?;

        let old = user.reputation_score;
        let new = clamped_reputation(old, points);
        let earned = vouchers_earned(old, new);
        let current_vouchers = user.question_vouchers + earned;

        let mut active: user::ActiveModel = user.into();
        active.reputation_score = Set(new);
        active.question_vouchers = Set(current_vouchers);
        active.update(self.conn).await?;

        let now = Utc::now();
        reputation_entry::ActiveModel {
            user_id: Set(user_id),
            points_delta: Set(points),
            reason: Set(reason),
            reference_id: Set(reference_id),
            reference_type: Set(reference_type),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(self.conn)
        .await?;

        if earned > 0 {
            reputation_entry::ActiveModel {
                user_id: Set(user_id),
                points_delta: Set(0),
                reason: Set(ReputationReason::VoucherEarned),
                reference_id: Set(Some(earned)),
                reference_type: Set(Some(ReferenceType::Voucher)),
                created_at: Set(now),
                ..Default::default()
            }
            .insert(self.conn)
            .await?;
            info!(user_id, earned, current_vouchers, "voucher granted");
        }

        Ok(ReputationChange {
            new_reputation: new,
            vouchers_earned: earned,
            current_vouchers,
        })
    }
}

impl<'a, C: ConnectionTrait> ReputationLedger<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn get_user_reputation(&self, user_id: i32) -> Result<ReputationSummary, AppError> {
        let user = user::Entity::find_by_id(user_id)
            .one(self.conn)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".into()))?;
        Ok(ReputationSummary::new(
            user.id,
            user.reputation_score,
            user.question_vouchers,
        ))
    }

    /// Newest-first history. `limit` defaults to 50 and is capped at 200.
    pub async fn get_history(
        &self,
        user_id: i32,
        limit: Option<u64>,
    ) -> Result<Vec<reputation_entry::Model>, AppError> {
        if user::Entity::find_by_id(user_id)
            .one(self.conn)
            .await?
            .is_none()
        {
            return Err(AppError::NotFound("User not found".into()));
        }

        let limit = limit
            .unwrap_or(DEFAULT_HISTORY_LIMIT)
            .clamp(1, MAX_HISTORY_LIMIT);

        Ok(reputation_entry::Entity::find()
            .filter(reputation_entry::Column::UserId.eq(user_id))
            .order_by_desc(reputation_entry::Column::CreatedAt)
            .order_by_desc(reputation_entry::Column::Id)
            .limit(limit)
            .all(self.conn)
            .await?)
    }
}
