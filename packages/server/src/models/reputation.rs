use chrono::{DateTime, Utc};
use common::{ReferenceType, ReputationReason};
use serde::{Deserialize, Serialize};

use crate::entity::reputation_entry;
use crate::services::reputation::ReputationSummary;

#[derive(Serialize, utoipa::ToSchema)]
pub struct ReputationResponse {
    #[schema(example = 42)]
    pub user_id: i32,
    #[schema(example = 45)]
    pub reputation_score: i32,
    #[schema(example = 2)]
    pub question_vouchers: i32,
    /// Next multiple of 20 strictly above the current score: a score of exactly 20
    /// reports 40, so `points_to_next_voucher` is never 0.
    #[schema(example = 60)]
    pub next_voucher_at: i32,
    #[schema(example = 15)]
    pub points_to_next_voucher: i32,
}

impl From<ReputationSummary> for ReputationResponse {
    fn from(s: ReputationSummary) -> Self {
        Self {
            user_id: s.user_id,
            reputation_score: s.reputation_score,
            question_vouchers: s.question_vouchers,
            next_voucher_at: s.next_voucher_at,
            points_to_next_voucher: s.points_to_next_voucher,
        }
    }
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct HistoryQuery {
    /// Maximum entries to return (1-200, default 50).
    pub limit: Option<u64>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ReputationEntryResponse {
    pub id: i32,
    /// Raw requested delta. May be negative even when the score was clamped at zero.
    #[schema(example = 1)]
    pub points_delta: i32,
    pub reason: ReputationReason,
    pub reference_id: Option<i32>,
    pub reference_type: Option<ReferenceType>,
    pub created_at: DateTime<Utc>,
}

impl From<reputation_entry::Model> for ReputationEntryResponse {
    fn from(m: reputation_entry::Model) -> Self {
        Self {
            id: m.id,
            points_delta: m.points_delta,
            reason: m.reason,
            reference_id: m.reference_id,
            reference_type: m.reference_type,
            created_at: m.created_at,
        }
    }
}
