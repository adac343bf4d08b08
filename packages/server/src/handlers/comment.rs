use axum::extract::{Path, State};
use axum::http::StatusCode;
use sea_orm::*;
use tracing::{info, instrument};

use crate::entity::comment;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::state::AppState;

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Comments",
    operation_id = "deleteComment",
    summary = "Soft-delete a comment",
    description = "Allowed for the author and admins. Replies stay visible.",
    params(("id" = i32, Path, description = "Comment ID")),
    responses(
        (status = 204, description = "Comment deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Comment not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn delete_comment(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    use sea_orm::sea_query::LockType;

    let txn = state.begin().await?;
    let existing = comment::Entity::find_by_id(id)
        .filter(comment::Column::IsActive.eq(true))
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Comment not found".into()))?;
    if existing.author_id != Some(auth_user.user_id) {
        auth_user.require_admin()?;
    }

    let mut active: comment::ActiveModel = existing.into();
    active.is_active = Set(false);
    active.updated_at = Set(chrono::Utc::now());
    active.update(&txn).await?;
    txn.commit().await?;

    info!(comment_id = id, "comment soft-deleted");
    Ok(StatusCode::NO_CONTENT)
}
