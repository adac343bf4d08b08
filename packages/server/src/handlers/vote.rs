use axum::{
    Json,
    extract::{Path, Query, State},
};
use common::VoteTarget;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::vote::{
    CastVoteRequest, CastVoteResponse, UserVoteItem, UserVotesQuery, VoteStateResponse,
};
use crate::services::vote::VoteEngine;
use crate::state::AppState;

fn engine(state: &AppState) -> VoteEngine<'_> {
    VoteEngine::new(&state.db, state.config.database.statement_timeout_ms)
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Votes",
    operation_id = "castVote",
    summary = "Cast, switch or remove a vote",
    description = "Repeating the vote you already hold removes it; the other type switches it. \
        Upvotes credit the author one reputation point, downvotes carry no penalty. \
        A question reaching 10 net upvotes is verified automatically.",
    request_body = CastVoteRequest,
    responses(
        (status = 200, description = "Vote applied", body = CastVoteResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Voting on own content (SELF_VOTE_FORBIDDEN)", body = ErrorBody),
        (status = 404, description = "Target not found or inactive (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Concurrent vote retries exhausted (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id, target = %payload.target_type, target_id = payload.target_id))]
pub async fn cast_vote(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CastVoteRequest>,
) -> Result<Json<CastVoteResponse>, AppError> {
    let outcome = engine(&state)
        .cast_vote(
            payload.target_type,
            payload.target_id,
            auth_user.user_id,
            payload.vote_type,
        )
        .await?;

    Ok(Json(CastVoteResponse::new(
        payload.target_type,
        payload.target_id,
        outcome,
    )))
}

#[utoipa::path(
    get,
    path = "/{target_type}/{target_id}",
    tag = "Votes",
    operation_id = "getVoteState",
    summary = "Vote counters and, when signed in, the caller's vote on a target",
    params(
        ("target_type" = VoteTarget, Path, description = "question, comment or problemset"),
        ("target_id" = i32, Path, description = "Target ID"),
    ),
    responses(
        (status = 200, description = "Vote state", body = VoteStateResponse),
        (status = 401, description = "Malformed token (TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Target not found or inactive (NOT_FOUND)", body = ErrorBody),
    ),
    security((), ("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.as_ref().map(|u| u.user_id)))]
pub async fn get_vote_state(
    auth_user: Option<AuthUser>,
    State(state): State<AppState>,
    Path((target_type, target_id)): Path<(VoteTarget, i32)>,
) -> Result<Json<VoteStateResponse>, AppError> {
    let vote_state = engine(&state)
        .get_vote_state(target_type, target_id, auth_user.map(|u| u.user_id))
        .await?;
    Ok(Json(VoteStateResponse::new(
        target_type,
        target_id,
        vote_state,
    )))
}

#[utoipa::path(
    get,
    path = "/me",
    tag = "Votes",
    operation_id = "listMyVotes",
    summary = "The caller's current votes",
    params(UserVotesQuery),
    responses(
        (status = 200, description = "Votes, most recently changed first", body = Vec<UserVoteItem>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(user_id = auth_user.user_id))]
pub async fn list_my_votes(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<UserVotesQuery>,
) -> Result<Json<Vec<UserVoteItem>>, AppError> {
    let votes = engine(&state)
        .list_user_votes(auth_user.user_id, query.target_type)
        .await?;
    Ok(Json(votes.into_iter().map(UserVoteItem::from).collect()))
}
