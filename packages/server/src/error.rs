use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde::Serialize;

/// Structured error response returned by all endpoints on failure.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code. One of: `VALIDATION_ERROR`, `INVALID_MEMBERSHIP`,
    /// `TOKEN_MISSING`, `TOKEN_INVALID`, `INVALID_CREDENTIALS`, `PERMISSION_DENIED`,
    /// `SELF_VOTE_FORBIDDEN`, `INSUFFICIENT_VOUCHERS`, `NOT_FOUND`, `CONFLICT`,
    /// `USERNAME_TAKEN`, `INTERNAL_ERROR`.
    #[schema(example = "VALIDATION_ERROR")]
    pub code: &'static str,
    /// Human-readable error description.
    #[schema(example = "Title must be 1-255 characters")]
    pub message: String,
}

/// Application-level error type.
///
/// Every core operation runs in a transaction; returning any of these aborts
/// it, so a failed call leaves no partial state behind.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    /// Problem set members missing, inactive or too few.
    #[error("{0}")]
    InvalidMembership(String),
    #[error("Authentication required")]
    TokenMissing,
    #[error("Invalid or expired token")]
    TokenInvalid,
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("Insufficient permissions")]
    PermissionDenied,
    #[error("You cannot vote on your own content")]
    SelfVote,
    #[error("No question vouchers left. Earn more by gaining reputation")]
    InsufficientVouchers,
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("Username is already taken")]
    UsernameTaken,
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::InvalidMembership(_) => "INVALID_MEMBERSHIP",
            AppError::TokenMissing => "TOKEN_MISSING",
            AppError::TokenInvalid => "TOKEN_INVALID",
            AppError::InvalidCredentials => "INVALID_CREDENTIALS",
            AppError::PermissionDenied => "PERMISSION_DENIED",
            AppError::SelfVote => "SELF_VOTE_FORBIDDEN",
            AppError::InsufficientVouchers => "INSUFFICIENT_VOUCHERS",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::UsernameTaken => "USERNAME_TAKEN",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::InvalidMembership(_) => StatusCode::BAD_REQUEST,
            AppError::TokenMissing | AppError::TokenInvalid | AppError::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }
            AppError::PermissionDenied | AppError::SelfVote | AppError::InsufficientVouchers => {
                StatusCode::FORBIDDEN
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) | AppError::UsernameTaken => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        let status = self.status();
        let code = self.code();
        let message = match self {
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                "An unexpected error occurred".to_string()
            }
            other => other.to_string(),
        };
        (status, ErrorBody { code, message })
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::Internal(err.to_string())
    }
}
