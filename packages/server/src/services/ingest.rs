use std::collections::HashSet;

use chrono::Utc;
use common::{NormalizedQuestion, QuestionSource, QuestionType, SourceError};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter, Set,
    sea_query::OnConflict,
};
use tracing::{debug, info, instrument};

use super::issuance::{Provenance, insert_question};
use super::require_admin;
use crate::entity::{question, tag};
use crate::error::AppError;
use crate::models::question::{
    AnswerDraft, CreateQuestionRequest, MAX_TAGS, OptionDraft, validate_question_draft,
};

pub const MAX_TAG_NAME_LENGTH: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    pub source_id: String,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct ImportReport {
    pub imported: Vec<i32>,
    pub skipped: Vec<SkippedRecord>,
}

impl ImportReport {
    fn skip(&mut self, source_id: &str, reason: impl Into<String>) {
        let reason = reason.into();
        debug!(source_id, %reason, "import record skipped");
        self.skipped.push(SkippedRecord {
            source_id: source_id.to_string(),
            reason,
        });
    }
}

/// Translate a normalized record into a question draft without tags.
///
/// MCQ correctness comes from matching option texts against `correct_answers`;
/// fill-in-blank answers are accepted case-insensitively.
pub fn draft_from_normalized(record: &NormalizedQuestion) -> CreateQuestionRequest {
    let (options, answers) = match record.question_type {
        QuestionType::Mcq => (
            record
                .options
                .iter()
                .enumerate()
                .map(|(i, text)| OptionDraft {
                    text: text.clone(),
                    is_correct: record.is_correct_option(i),
                })
                .collect(),
            vec![],
        ),
        QuestionType::FillInBlank => (
            vec![],
            record
                .correct_answers
                .iter()
                .map(|answer| AnswerDraft {
                    correct_answer: answer.clone(),
                    is_case_sensitive: false,
                })
                .collect(),
        ),
    };

    CreateQuestionRequest {
        title: record.title.clone(),
        question_text: record.text.clone(),
        question_type: record.question_type,
        difficulty: record.difficulty,
        explanation: record.explanation.clone(),
        options,
        answers,
        tag_ids: vec![],
    }
}

/// Trimmed, de-duplicated tag names, capped at the per-question tag limit.
pub fn normalize_tag_names(names: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .iter()
        .map(|n| n.trim().to_lowercase())
        .filter(|n| !n.is_empty() && n.chars().count() <= MAX_TAG_NAME_LENGTH)
        .filter(|n| seen.insert(n.clone()))
        .take(MAX_TAGS)
        .collect()
}

/// Voucher-free bulk creation of questions handed over by an external provider.
pub struct IngestService<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> IngestService<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Import up to `limit` records from `source`.
    ///
    /// Records already imported from the same source, duplicated within the batch, or
    /// failing draft validation are skipped with a reason instead of failing the batch.
    #[instrument(skip(self, source), fields(source = source.name()))]
    pub async fn import_questions(
        &self,
        admin_id: i32,
        source: &dyn QuestionSource,
        limit: usize,
        auto_verify: bool,
    ) -> Result<ImportReport, AppError> {
        require_admin(self.conn, admin_id).await?;

        let source_name = source.name().trim().to_string();
        let records = source.fetch(limit).await.map_err(|e| match e {
            SourceError::Malformed(msg) => AppError::Validation(msg),
            SourceError::Unavailable(msg) => AppError::Internal(msg),
        })?;

        let mut report = ImportReport::default();
        let mut seen = HashSet::new();

        for record in &records {
            let source_id = record.source_id.trim();
            if source_id.is_empty() {
                report.skip(source_id, "missing source id");
                continue;
            }
            if !seen.insert(source_id.to_string()) {
                report.skip(source_id, "duplicate within batch");
                continue;
            }

            let already_imported = question::Entity::find()
                .filter(question::Column::Source.eq(source_name.as_str()))
                .filter(question::Column::ExternalId.eq(source_id))
                .count(self.conn)
                .await?
                > 0;
            if already_imported {
                report.skip(source_id, "already imported");
                continue;
            }

            let mut draft = draft_from_normalized(record);
            if let Err(e) = validate_question_draft(&draft) {
                report.skip(source_id, e.to_string());
                continue;
            }
            draft.tag_ids = self.resolve_tags(&normalize_tag_names(&record.tags)).await?;

            let created = insert_question(
                self.conn,
                None,
                &draft,
                Some(Provenance {
                    source: &source_name,
                    external_id: source_id,
                }),
                auto_verify,
            )
            .await?;
            report.imported.push(created.id);
        }

        info!(
            imported = report.imported.len(),
            skipped = report.skipped.len(),
            "import finished"
        );
        Ok(report)
    }

    /// Ids for the given tag names, creating the missing ones.
    async fn resolve_tags(&self, names: &[String]) -> Result<Vec<i32>, AppError> {
        let mut ids = Vec::with_capacity(names.len());
        for name in names {
            let result = tag::Entity::insert(tag::ActiveModel {
                name: Set(name.clone()),
                created_at: Set(Utc::now()),
                ..Default::default()
            })
            .on_conflict(OnConflict::column(tag::Column::Name).do_nothing().to_owned())
            .exec_without_returning(self.conn)
            .await;

            match result {
                Ok(_) | Err(DbErr::RecordNotInserted) => {}
                Err(e) => return Err(e.into()),
            }

            let tag = tag::Entity::find()
                .filter(tag::Column::Name.eq(name.as_str()))
                .one(self.conn)
                .await?
                .ok_or_else(|| AppError::Internal(format!("tag '{name}' vanished after upsert")))?;
            ids.push(tag.id);
        }
        Ok(ids)
    }
}
