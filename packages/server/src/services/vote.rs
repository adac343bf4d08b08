use chrono::{DateTime, Utc};
use common::{ReputationReason, VoteTarget, VoteType};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set, SqlErr, Unchanged,
    sea_query::LockType,
};
use tracing::{debug, info, instrument, warn};

use super::reputation::ReputationLedger;
use super::verification::verified_after_vote;
use crate::database;
use crate::entity::{comment, problem_set, question, user, vote};
use crate::error::AppError;

/// Attempts per vote request before a unique-key race is reported as a conflict.
pub const MAX_VOTE_ATTEMPTS: u32 = 3;

/// What one vote request does to a (target, user) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// The user's vote afterwards. `None` when the request toggled it off.
    pub next: Option<VoteType>,
    pub upvote_delta: i32,
    pub downvote_delta: i32,
    /// Change to the author's reputation. Only upvotes carry credit, so a
    /// downvote is never penalised and removing one restores nothing.
    pub reputation_delta: i32,
}

/// Requesting the vote the user already holds removes it; anything else replaces it.
pub fn transition(current: Option<VoteType>, requested: VoteType) -> Transition {
    let next = if current == Some(requested) {
        None
    } else {
        Some(requested)
    };
    let holds = |vote: Option<VoteType>, kind: VoteType| i32::from(vote == Some(kind));
    let upvote_delta = holds(next, VoteType::Upvote) - holds(current, VoteType::Upvote);

    Transition {
        next,
        upvote_delta,
        downvote_delta: holds(next, VoteType::Downvote) - holds(current, VoteType::Downvote),
        reputation_delta: upvote_delta,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteOutcome {
    pub upvote_count: i32,
    pub downvote_count: i32,
    pub user_vote: Option<VoteType>,
    pub is_verified: bool,
    pub reputation_delta: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteState {
    pub upvote_count: i32,
    pub downvote_count: i32,
    pub user_vote: Option<VoteType>,
}

/// The votable fields shared by questions, comments and problem sets.
struct TargetRow {
    author_id: Option<i32>,
    upvote_count: i32,
    downvote_count: i32,
    is_verified: bool,
}

pub struct VoteEngine<'a> {
    db: &'a DatabaseConnection,
    statement_timeout_ms: u64,
}

impl<'a> VoteEngine<'a> {
    pub fn new(db: &'a DatabaseConnection, statement_timeout_ms: u64) -> Self {
        Self {
            db,
            statement_timeout_ms,
        }
    }

    /// Apply a vote request atomically: vote row, counters, author reputation and
    /// auto-verification commit together or not at all.
    ///
    /// A unique-key violation on the vote insert means another request for the same
    /// (target, user) won the race; the whole transaction is retried from scratch.
    #[instrument(skip(self))]
    pub async fn cast_vote(
        &self,
        target: VoteTarget,
        target_id: i32,
        user_id: i32,
        vote_type: VoteType,
    ) -> Result<VoteOutcome, AppError> {
        let mut attempt = 1;
        loop {
            let txn = database::begin(self.db, self.statement_timeout_ms).await?;
            match apply_vote(&txn, target, target_id, user_id, vote_type).await {
                Ok(outcome) => {
                    txn.commit().await?;
                    info!(
                        upvotes = outcome.upvote_count,
                        downvotes = outcome.downvote_count,
                        user_vote = ?outcome.user_vote,
                        "vote applied"
                    );
                    return Ok(outcome);
                }
                Err(err) => {
                    txn.rollback().await?;
                    match err {
                        AppError::Conflict(_) if attempt < MAX_VOTE_ATTEMPTS => {
                            warn!(attempt, "concurrent vote on the same target; retrying");
                            attempt += 1;
                        }
                        other => return Err(other),
                    }
                }
            }
        }
    }

    /// Current counters of an active target and, when `user_id` is given, that user's vote.
    pub async fn get_vote_state(
        &self,
        target: VoteTarget,
        target_id: i32,
        user_id: Option<i32>,
    ) -> Result<VoteState, AppError> {
        let row = find_target(self.db, target, target_id, false).await?;
        let user_vote = match user_id {
            Some(user_id) => find_vote(self.db, target, target_id, user_id)
                .await?
                .map(|v| v.vote_type),
            None => None,
        };
        Ok(VoteState {
            upvote_count: row.upvote_count,
            downvote_count: row.downvote_count,
            user_vote,
        })
    }

    /// A user's current votes, most recently changed first.
    pub async fn list_user_votes(
        &self,
        user_id: i32,
        target: Option<VoteTarget>,
    ) -> Result<Vec<vote::Model>, AppError> {
        let mut select = vote::Entity::find().filter(vote::Column::UserId.eq(user_id));
        if let Some(target) = target {
            select = select.filter(vote::Column::TargetType.eq(target));
        }
        Ok(select
            .order_by_desc(vote::Column::UpdatedAt)
            .order_by_desc(vote::Column::Id)
            .all(self.db)
            .await?)
    }
}

/// One attempt of [`VoteEngine::cast_vote`] inside an open transaction.
///
/// Lock order is the target row, then (through the ledger) the author's user row.
async fn apply_vote(
    conn: &DatabaseTransaction,
    target: VoteTarget,
    target_id: i32,
    user_id: i32,
    vote_type: VoteType,
) -> Result<VoteOutcome, AppError> {
    let row = find_target(conn, target, target_id, true).await?;
    if row.author_id == Some(user_id) {
        return Err(AppError::SelfVote);
    }

    let voter = user::Entity::find_by_id(user_id).one(conn).await?;
    if !voter.is_some_and(|u| u.is_active) {
        return Err(AppError::NotFound("User not found".into()));
    }

    let existing = find_vote(conn, target, target_id, user_id).await?;
    let step = transition(existing.as_ref().map(|v| v.vote_type), vote_type);
    debug!(?step, "vote transition");

    let now = Utc::now();
    match (existing, step.next) {
        (None, Some(next)) => {
            vote::ActiveModel {
                target_type: Set(target),
                target_id: Set(target_id),
                user_id: Set(user_id),
                vote_type: Set(next),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(conn)
            .await
            .map_err(|e| match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => {
                    AppError::Conflict("Vote changed concurrently, please retry".into())
                }
                _ => AppError::from(e),
            })?;
        }
        (Some(existing), None) => {
            vote::Entity::delete_by_id(existing.id).exec(conn).await?;
        }
        (Some(existing), Some(next)) => {
            let mut active: vote::ActiveModel = existing.into();
            active.vote_type = Set(next);
            active.updated_at = Set(now);
            active.update(conn).await?;
        }
        // A request never clears a vote that does not exist.
        (None, None) => {}
    }

    let upvotes = row.upvote_count + step.upvote_delta;
    let downvotes = row.downvote_count + step.downvote_delta;
    let is_verified = match target {
        VoteTarget::Question => verified_after_vote(upvotes, downvotes, row.is_verified),
        _ => row.is_verified,
    };
    let newly_verified = is_verified && !row.is_verified;

    write_counters(conn, target, target_id, upvotes, downvotes, newly_verified, now).await?;
    if newly_verified {
        info!(question_id = target_id, upvotes, downvotes, "question auto-verified");
    }

    if step.reputation_delta != 0
        && let Some(author_id) = row.author_id
    {
        ReputationLedger::new(conn)
            .apply_delta(
                author_id,
                step.reputation_delta,
                ReputationReason::for_vote_credit(target, step.reputation_delta > 0),
                Some(target_id),
                Some(target.into()),
            )
            .await?;
    }

    Ok(VoteOutcome {
        upvote_count: upvotes,
        downvote_count: downvotes,
        user_vote: step.next,
        is_verified,
        reputation_delta: step.reputation_delta,
    })
}

async fn find_vote<C: ConnectionTrait>(
    conn: &C,
    target: VoteTarget,
    target_id: i32,
    user_id: i32,
) -> Result<Option<vote::Model>, AppError> {
    Ok(vote::Entity::find()
        .filter(vote::Column::TargetType.eq(target))
        .filter(vote::Column::TargetId.eq(target_id))
        .filter(vote::Column::UserId.eq(user_id))
        .one(conn)
        .await?)
}

/// Load an active target, optionally locking it `FOR UPDATE`.
async fn find_target<C: ConnectionTrait>(
    conn: &C,
    target: VoteTarget,
    id: i32,
    for_update: bool,
) -> Result<TargetRow, AppError> {
    let row = match target {
        VoteTarget::Question => {
            let mut select = question::Entity::find_by_id(id)
                .filter(question::Column::IsActive.eq(true));
            if for_update {
                select = select.lock(LockType::Update);
            }
            select.one(conn).await?.map(|q| TargetRow {
                author_id: q.author_id,
                upvote_count: q.upvote_count,
                downvote_count: q.downvote_count,
                is_verified: q.is_verified,
            })
        }
        VoteTarget::Comment => {
            let mut select =
                comment::Entity::find_by_id(id).filter(comment::Column::IsActive.eq(true));
            if for_update {
                select = select.lock(LockType::Update);
            }
            select.one(conn).await?.map(|c| TargetRow {
                author_id: c.author_id,
                upvote_count: c.upvote_count,
                downvote_count: c.downvote_count,
                is_verified: false,
            })
        }
        VoteTarget::ProblemSet => {
            let mut select = problem_set::Entity::find_by_id(id)
                .filter(problem_set::Column::IsActive.eq(true));
            if for_update {
                select = select.lock(LockType::Update);
            }
            select.one(conn).await?.map(|p| TargetRow {
                author_id: p.author_id,
                upvote_count: p.upvote_count,
                downvote_count: p.downvote_count,
                is_verified: p.is_verified,
            })
        }
    };
    row.ok_or_else(|| AppError::NotFound(format!("{} not found", target.label())))
}

async fn write_counters<C: ConnectionTrait>(
    conn: &C,
    target: VoteTarget,
    id: i32,
    upvotes: i32,
    downvotes: i32,
    newly_verified: bool,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    match target {
        VoteTarget::Question => {
            let mut active = question::ActiveModel {
                id: Unchanged(id),
                upvote_count: Set(upvotes),
                downvote_count: Set(downvotes),
                ..Default::default()
            };
            if newly_verified {
                active.is_verified = Set(true);
                active.verified_at = Set(Some(now));
            }
            active.update(conn).await?;
        }
        VoteTarget::Comment => {
            comment::ActiveModel {
                id: Unchanged(id),
                upvote_count: Set(upvotes),
                downvote_count: Set(downvotes),
                ..Default::default()
            }
            .update(conn)
            .await?;
        }
        VoteTarget::ProblemSet => {
            problem_set::ActiveModel {
                id: Unchanged(id),
                upvote_count: Set(upvotes),
                downvote_count: Set(downvotes),
                ..Default::default()
            }
            .update(conn)
            .await?;
        }
    }
    Ok(())
}
