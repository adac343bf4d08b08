use axum::{
    Json,
    extract::{Path, State},
};
use common::ingest::StaticSource;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::admin::*;
use crate::services::ingest::IngestService;
use crate::services::verification::VerificationService;
use crate::state::AppState;

#[utoipa::path(
    put,
    path = "/questions/{id}/verification",
    tag = "Admin",
    operation_id = "setQuestionVerification",
    summary = "Verify or unverify a question",
    description = "Has no reputation effect on the author. Requires the admin role.",
    params(("id" = i32, Path, description = "Question ID")),
    request_body = SetVerifiedRequest,
    responses(
        (status = 200, description = "Verification updated", body = VerificationResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Question not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Already in the requested state (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(admin_id = auth_user.user_id, verified = payload.verified))]
pub async fn set_question_verified(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<SetVerifiedRequest>,
) -> Result<Json<VerificationResponse>, AppError> {
    let txn = state.begin().await?;
    let change = VerificationService::new(&txn)
        .set_question_verified(auth_user.user_id, id, payload.verified)
        .await?;
    txn.commit().await?;

    Ok(Json(change.into()))
}

#[utoipa::path(
    put,
    path = "/problem-sets/{id}/verification",
    tag = "Admin",
    operation_id = "setProblemSetVerification",
    summary = "Verify or unverify a problem set",
    description = "Awards the author +1 reputation on verification and -1 on unverification, unless the admin is the author. Requires the admin role.",
    params(("id" = i32, Path, description = "Problem set ID")),
    request_body = SetVerifiedRequest,
    responses(
        (status = 200, description = "Verification updated", body = VerificationResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Problem set not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Already in the requested state (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(admin_id = auth_user.user_id, verified = payload.verified))]
pub async fn set_problem_set_verified(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<SetVerifiedRequest>,
) -> Result<Json<VerificationResponse>, AppError> {
    let txn = state.begin().await?;
    let change = VerificationService::new(&txn)
        .set_problem_set_verified(auth_user.user_id, id, payload.verified)
        .await?;
    txn.commit().await?;

    Ok(Json(change.into()))
}

#[utoipa::path(
    post,
    path = "/questions/import",
    tag = "Admin",
    operation_id = "importQuestions",
    summary = "Import normalized questions from an external provider",
    description = "Imported questions have no author and spend no vouchers. Records already imported from the same source are skipped. Requires the admin role.",
    request_body = ImportQuestionsRequest,
    responses(
        (status = 200, description = "Import report", body = ImportQuestionsResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(admin_id = auth_user.user_id, source = %payload.source, records = payload.questions.len()))]
pub async fn import_questions(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<ImportQuestionsRequest>,
) -> Result<Json<ImportQuestionsResponse>, AppError> {
    validate_import_request(&payload)?;

    let limit = payload.questions.len();
    let source = StaticSource::new(payload.source.trim(), payload.questions);

    let txn = state.begin().await?;
    let report = IngestService::new(&txn)
        .import_questions(auth_user.user_id, &source, limit, payload.auto_verify)
        .await?;
    txn.commit().await?;

    Ok(Json(report.into()))
}
