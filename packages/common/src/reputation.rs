#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::vote::VoteTarget;

/// Reputation points needed per question voucher.
pub const VOUCHER_MILESTONE: i32 = 20;

/// Why a reputation entry was written.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "snake_case")]
pub enum ReputationReason {
    /// First correct answer to a question.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "question_answered"))]
    QuestionAnswered,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "question_upvoted"))]
    QuestionUpvoted,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "question_upvoted_removed"))]
    QuestionUpvotedRemoved,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "comment_upvoted"))]
    CommentUpvoted,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "comment_upvoted_removed"))]
    CommentUpvotedRemoved,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "problemset_upvoted"))]
    #[serde(rename = "problemset_upvoted")]
    ProblemSetUpvoted,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "problemset_upvoted_removed"))]
    #[serde(rename = "problemset_upvoted_removed")]
    ProblemSetUpvotedRemoved,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "problemset_verified"))]
    #[serde(rename = "problemset_verified")]
    ProblemSetVerified,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "problemset_unverified"))]
    #[serde(rename = "problemset_unverified")]
    ProblemSetUnverified,
    /// Synthetic zero-point entry recording a voucher grant.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "voucher_earned"))]
    VoucherEarned,
}

impl ReputationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::QuestionAnswered => "question_answered",
            Self::QuestionUpvoted => "question_upvoted",
            Self::QuestionUpvotedRemoved => "question_upvoted_removed",
            Self::CommentUpvoted => "comment_upvoted",
            Self::CommentUpvotedRemoved => "comment_upvoted_removed",
            Self::ProblemSetUpvoted => "problemset_upvoted",
            Self::ProblemSetUpvotedRemoved => "problemset_upvoted_removed",
            Self::ProblemSetVerified => "problemset_verified",
            Self::ProblemSetUnverified => "problemset_unverified",
            Self::VoucherEarned => "voucher_earned",
        }
    }

    /// Reason recorded when an upvote credit on `target` is granted (`granted == true`)
    /// or reversed.
    pub fn for_vote_credit(target: VoteTarget, granted: bool) -> Self {
        match (target, granted) {
            (VoteTarget::Question, true) => Self::QuestionUpvoted,
            (VoteTarget::Question, false) => Self::QuestionUpvotedRemoved,
            (VoteTarget::Comment, true) => Self::CommentUpvoted,
            (VoteTarget::Comment, false) => Self::CommentUpvotedRemoved,
            (VoteTarget::ProblemSet, true) => Self::ProblemSetUpvoted,
            (VoteTarget::ProblemSet, false) => Self::ProblemSetUpvotedRemoved,
        }
    }
}

impl fmt::Display for ReputationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a reputation entry's `reference_id` points at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceType {
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "question"))]
    Question,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "comment"))]
    Comment,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "problemset"))]
    #[serde(rename = "problemset")]
    ProblemSet,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "answer"))]
    Answer,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "voucher"))]
    Voucher,
}

impl From<VoteTarget> for ReferenceType {
    fn from(target: VoteTarget) -> Self {
        match target {
            VoteTarget::Question => Self::Question,
            VoteTarget::Comment => Self::Comment,
            VoteTarget::ProblemSet => Self::ProblemSet,
        }
    }
}

/// Reputation after applying `points` to `current`. Never drops below zero.
pub fn clamped_reputation(current: i32, points: i32) -> i32 {
    current.saturating_add(points).max(0)
}

/// Number of vouchers a score has "unlocked" in total.
pub fn voucher_count(score: i32) -> i32 {
    score.max(0) / VOUCHER_MILESTONE
}

/// Vouchers to grant when reputation moves from `old` to `new`.
///
/// Only upward milestone crossings grant; a drop never claws vouchers back.
pub fn vouchers_earned(old: i32, new: i32) -> i32 {
    (voucher_count(new) - voucher_count(old)).max(0)
}

/// The next milestone strictly above `score`.
pub fn next_voucher_at(score: i32) -> i32 {
    (voucher_count(score) + 1) * VOUCHER_MILESTONE
}

/// Replay a ledger of raw deltas with clamp-on-each-step.
pub fn replay<I: IntoIterator<Item = i32>>(deltas: I) -> i32 {
    deltas.into_iter().fold(0, clamped_reputation)
}
