use axum::{
    Json,
    extract::{Path, Query, State},
};
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::models::reputation::{HistoryQuery, ReputationEntryResponse, ReputationResponse};
use crate::services::reputation::ReputationLedger;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/me/reputation",
    tag = "Reputation",
    operation_id = "getMyReputation",
    summary = "The caller's reputation and voucher balance",
    responses(
        (status = 200, description = "Reputation summary", body = ReputationResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn get_my_reputation(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ReputationResponse>, AppError> {
    let summary = ReputationLedger::new(&state.db)
        .get_user_reputation(auth_user.user_id)
        .await?;
    Ok(Json(summary.into()))
}

#[utoipa::path(
    get,
    path = "/{id}/reputation",
    tag = "Reputation",
    operation_id = "getUserReputation",
    summary = "A user's reputation and voucher balance",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "Reputation summary", body = ReputationResponse),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_user_reputation(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ReputationResponse>, AppError> {
    let summary = ReputationLedger::new(&state.db)
        .get_user_reputation(id)
        .await?;
    Ok(Json(summary.into()))
}

#[utoipa::path(
    get,
    path = "/{id}/reputation/history",
    tag = "Reputation",
    operation_id = "getReputationHistory",
    summary = "A user's reputation entries, newest first",
    params(("id" = i32, Path, description = "User ID"), HistoryQuery),
    responses(
        (status = 200, description = "Ledger entries", body = Vec<ReputationEntryResponse>),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query))]
pub async fn get_reputation_history(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<ReputationEntryResponse>>, AppError> {
    let entries = ReputationLedger::new(&state.db)
        .get_history(id, query.limit)
        .await?;
    Ok(Json(
        entries
            .into_iter()
            .map(ReputationEntryResponse::from)
            .collect(),
    ))
}
