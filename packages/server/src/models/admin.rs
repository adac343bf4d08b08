use chrono::{DateTime, Utc};
use common::NormalizedQuestion;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::services::ingest::ImportReport;
use crate::services::verification::VerificationChange;

pub const MAX_IMPORT_BATCH: usize = 500;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct SetVerifiedRequest {
    pub verified: bool,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct VerificationResponse {
    pub id: i32,
    pub is_verified: bool,
    pub verified_at: Option<DateTime<Utc>>,
    /// Reputation applied to the author by this action.
    #[schema(example = 1)]
    pub author_reputation_delta: i32,
}

impl From<VerificationChange> for VerificationResponse {
    fn from(c: VerificationChange) -> Self {
        Self {
            id: c.id,
            is_verified: c.is_verified,
            verified_at: c.verified_at,
            author_reputation_delta: c.author_reputation_delta,
        }
    }
}

/// Already-normalized records handed over by an external quiz provider.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct ImportQuestionsRequest {
    /// Provider name, stored with every imported question.
    #[schema(example = "opentdb")]
    pub source: String,
    pub questions: Vec<NormalizedQuestion>,
    /// Mark imported questions as verified.
    #[serde(default)]
    pub auto_verify: bool,
}

pub fn validate_import_request(payload: &ImportQuestionsRequest) -> Result<(), AppError> {
    let source = payload.source.trim();
    if source.is_empty() || source.chars().count() > 64 {
        return Err(AppError::Validation(
            "Source must be 1-64 characters".into(),
        ));
    }
    if payload.questions.len() > MAX_IMPORT_BATCH {
        return Err(AppError::Validation(format!(
            "Too many questions: max {MAX_IMPORT_BATCH}"
        )));
    }
    Ok(())
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct SkippedRecordResponse {
    #[schema(example = "842")]
    pub source_id: String,
    #[schema(example = "already imported")]
    pub reason: String,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ImportQuestionsResponse {
    /// Ids of the questions created by this import.
    pub imported: Vec<i32>,
    pub skipped: Vec<SkippedRecordResponse>,
}

impl From<ImportReport> for ImportQuestionsResponse {
    fn from(report: ImportReport) -> Self {
        Self {
            imported: report.imported,
            skipped: report
                .skipped
                .into_iter()
                .map(|s| SkippedRecordResponse {
                    source_id: s.source_id,
                    reason: s.reason,
                })
                .collect(),
        }
    }
}
