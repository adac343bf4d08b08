use chrono::{DateTime, Utc};
use common::{ReferenceType, ReputationReason};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter, QuerySelect, Set,
    sea_query::LockType,
};
use tracing::{info, instrument};

use super::reputation::ReputationLedger;
use super::require_admin;
use crate::entity::{problem_set, question};
use crate::error::AppError;

/// Net upvotes at which a question verifies itself.
pub const AUTO_VERIFY_THRESHOLD: i32 = 10;

/// Verification flag of a question after a vote.
///
/// One-way: a verified question stays verified no matter how the votes move.
pub fn verified_after_vote(upvotes: i32, downvotes: i32, is_verified: bool) -> bool {
    is_verified || upvotes - downvotes >= AUTO_VERIFY_THRESHOLD
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationChange {
    pub id: i32,
    pub is_verified: bool,
    pub verified_at: Option<DateTime<Utc>>,
    pub author_reputation_delta: i32,
}

/// Explicit admin verify/unverify actions.
pub struct VerificationService<'a> {
    conn: &'a DatabaseTransaction,
}

impl<'a> VerificationService<'a> {
    pub fn new(conn: &'a DatabaseTransaction) -> Self {
        Self { conn }
    }

    /// Verify or unverify a question. No reputation effect.
    #[instrument(skip(self))]
    pub async fn set_question_verified(
        &self,
        admin_id: i32,
        question_id: i32,
        verified: bool,
    ) -> Result<VerificationChange, AppError> {
        require_admin(self.conn, admin_id).await?;

        let question = question::Entity::find_by_id(question_id)
            .filter(question::Column::IsActive.eq(true))
            .lock(LockType::Update)
            .one(self.conn)
            .await?
            .ok_or_else(|| AppError::NotFound("Question not found".into()))?;

        if question.is_verified == verified {
            return Err(AppError::Conflict(already(verified, "Question")));
        }

        let now = Utc::now();
        let verified_at = verified.then_some(now);
        let mut active: question::ActiveModel = question.into();
        active.is_verified = Set(verified);
        active.verified_at = Set(verified_at);
        active.updated_at = Set(now);
        active.update(self.conn).await?;

        info!(question_id, verified, "question verification changed by admin");

        Ok(VerificationChange {
            id: question_id,
            is_verified: verified,
            verified_at,
            author_reputation_delta: 0,
        })
    }

    /// Verify or unverify a problem set, crediting or revoking one point for its author.
    ///
    /// The author is not credited when they are the acting admin.
    #[instrument(skip(self))]
    pub async fn set_problem_set_verified(
        &self,
        admin_id: i32,
        problem_set_id: i32,
        verified: bool,
    ) -> Result<VerificationChange, AppError> {
        require_admin(self.conn, admin_id).await?;

        let set = problem_set::Entity::find_by_id(problem_set_id)
            .filter(problem_set::Column::IsActive.eq(true))
            .lock(LockType::Update)
            .one(self.conn)
            .await?
            .ok_or_else(|| AppError::NotFound("Problem set not found".into()))?;

        if set.is_verified == verified {
            return Err(AppError::Conflict(already(verified, "Problem set")));
        }

        let author_id = set.author_id;
        let now = Utc::now();
        let verified_at = verified.then_some(now);
        let mut active: problem_set::ActiveModel = set.into();
        active.is_verified = Set(verified);
        active.verified_by = Set(verified.then_some(admin_id));
        active.verified_at = Set(verified_at);
        active.updated_at = Set(now);
        active.update(self.conn).await?;

        let mut delta = 0;
        if let Some(author_id) = author_id
            && author_id != admin_id
        {
            let (points, reason) = if verified {
                (1, ReputationReason::ProblemSetVerified)
            } else {
                (-1, ReputationReason::ProblemSetUnverified)
            };
            ReputationLedger::new(self.conn)
                .apply_delta(
                    author_id,
                    points,
                    reason,
                    Some(problem_set_id),
                    Some(ReferenceType::ProblemSet),
                )
                .await?;
            delta = points;
        }

        info!(problem_set_id, verified, delta, "problem set verification changed by admin");

        Ok(VerificationChange {
            id: problem_set_id,
            is_verified: verified,
            verified_at,
            author_reputation_delta: delta,
        })
    }
}

fn already(verified: bool, what: &str) -> String {
    if verified {
        format!("{what} is already verified")
    } else {
        format!("{what} is not verified")
    }
}
