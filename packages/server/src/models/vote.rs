use chrono::{DateTime, Utc};
use common::{VoteTarget, VoteType};
use serde::{Deserialize, Serialize};

use crate::entity::vote;
use crate::services::vote::{VoteOutcome, VoteState};

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CastVoteRequest {
    pub target_type: VoteTarget,
    #[schema(example = 12)]
    pub target_id: i32,
    pub vote_type: VoteType,
}

/// Counters and the caller's vote after a vote request commits.
#[derive(Serialize, utoipa::ToSchema)]
pub struct CastVoteResponse {
    pub target_type: VoteTarget,
    pub target_id: i32,
    #[schema(example = 10)]
    pub upvote_count: i32,
    #[schema(example = 0)]
    pub downvote_count: i32,
    /// `null` when the request toggled the caller's vote off.
    pub user_vote: Option<VoteType>,
    /// Current verification flag of the target (always false for comments).
    pub is_verified: bool,
}

impl CastVoteResponse {
    pub fn new(target_type: VoteTarget, target_id: i32, outcome: VoteOutcome) -> Self {
        Self {
            target_type,
            target_id,
            upvote_count: outcome.upvote_count,
            downvote_count: outcome.downvote_count,
            user_vote: outcome.user_vote,
            is_verified: outcome.is_verified,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct VoteStateResponse {
    pub target_type: VoteTarget,
    pub target_id: i32,
    pub upvote_count: i32,
    pub downvote_count: i32,
    pub user_vote: Option<VoteType>,
}

impl VoteStateResponse {
    pub fn new(target_type: VoteTarget, target_id: i32, state: VoteState) -> Self {
        Self {
            target_type,
            target_id,
            upvote_count: state.upvote_count,
            downvote_count: state.downvote_count,
            user_vote: state.user_vote,
        }
    }
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct UserVotesQuery {
    /// Restrict to one target type.
    pub target_type: Option<VoteTarget>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct UserVoteItem {
    pub target_type: VoteTarget,
    pub target_id: i32,
    pub vote_type: VoteType,
    pub updated_at: DateTime<Utc>,
}

impl From<vote::Model> for UserVoteItem {
    fn from(m: vote::Model) -> Self {
        Self {
            target_type: m.target_type,
            target_id: m.target_id,
            vote_type: m.vote_type,
            updated_at: m.updated_at,
        }
    }
}
