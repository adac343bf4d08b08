use std::collections::HashSet;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QuerySelect, Set, sea_query::LockType,
};
use tracing::{debug, info, instrument};

use crate::entity::{
    fill_blank_answer, mcq_option, problem_set, problem_set_question, problem_set_tag, question,
    question_tag, tag, user,
};
use crate::error::AppError;
use crate::models::problem_set::{CreateProblemSetRequest, validate_problem_set_draft};
use crate::models::question::{CreateQuestionRequest, validate_question_draft};

/// Where an imported question came from: provider name and provider id.
pub struct Provenance<'s> {
    pub source: &'s str,
    pub external_id: &'s str,
}

/// Voucher-gated content creation.
///
/// Every method expects to run inside the caller's transaction; a failure at any
/// step leaves the voucher balance untouched once the transaction is dropped.
pub struct IssuanceGate<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> IssuanceGate<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Lock the author and spend one voucher.
    ///
    /// Admins hold the unlimited-authoring capability and skip the gate; the
    /// return value is the remaining balance, or `None` for admins.
    pub async fn reserve_voucher(&self, author_id: i32) -> Result<Option<i32>, AppError> {
        let author = user::Entity::find_by_id(author_id)
            .lock(LockType::Update)
            .one(self.conn)
            .await?
            .filter(|u| u.is_active)
            .ok_or_else(|| AppError::NotFound("Author not found".into()))?;

        if author.role.is_admin() {
            debug!(author_id, "admin is exempt from the voucher gate");
            return Ok(None);
        }
        self.consume_voucher(author).await.map(Some)
    }

    async fn consume_voucher(&self, author: user::Model) -> Result<i32, AppError> {
        if author.question_vouchers <= 0 {
            return Err(AppError::InsufficientVouchers);
        }
        let user_id = author.id;
        let remaining = author.question_vouchers - 1;

        let mut active: user::ActiveModel = author.into();
        active.question_vouchers = Set(remaining);
        active.update(self.conn).await?;

        info!(user_id, remaining, "voucher consumed");
        Ok(remaining)
    }

    #[instrument(skip(self, draft), fields(title = %draft.title))]
    pub async fn create_question(
        &self,
        author_id: i32,
        draft: &CreateQuestionRequest,
    ) -> Result<question::Model, AppError> {
        validate_question_draft(draft)?;
        self.reserve_voucher(author_id).await?;
        insert_question(self.conn, Some(author_id), draft, None, false).await
    }

    #[instrument(skip(self, draft), fields(title = %draft.title))]
    pub async fn create_problem_set(
        &self,
        author_id: i32,
        draft: &CreateProblemSetRequest,
    ) -> Result<problem_set::Model, AppError> {
        validate_problem_set_draft(draft)?;
        self.reserve_voucher(author_id).await?;

        let found: HashSet<i32> = question::Entity::find()
            .select_only()
            .column(question::Column::Id)
            .filter(question::Column::Id.is_in(draft.question_ids.clone()))
            .filter(question::Column::IsActive.eq(true))
            .into_tuple::<i32>()
            .all(self.conn)
            .await?
            .into_iter()
            .collect();
        let missing: Vec<i32> = draft
            .question_ids
            .iter()
            .copied()
            .filter(|id| !found.contains(id))
            .collect();
        if !missing.is_empty() {
            return Err(AppError::InvalidMembership(format!(
                "Questions not found or inactive: {missing:?}"
            )));
        }
        ensure_tags_exist(self.conn, &draft.tag_ids).await?;

        let now = Utc::now();
        let set = problem_set::ActiveModel {
            author_id: Set(Some(author_id)),
            title: Set(draft.title.trim().to_string()),
            description: Set(draft.description.clone()),
            difficulty: Set(draft.difficulty),
            upvote_count: Set(0),
            downvote_count: Set(0),
            view_count: Set(0),
            question_count: Set(draft.question_ids.len() as i32),
            is_verified: Set(false),
            verified_by: Set(None),
            verified_at: Set(None),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(self.conn)
        .await?;

        let members = draft
            .question_ids
            .iter()
            .enumerate()
            .map(|(i, &question_id)| problem_set_question::ActiveModel {
                problem_set_id: Set(set.id),
                question_id: Set(question_id),
                position: Set(i as i32 + 1),
            });
        problem_set_question::Entity::insert_many(members)
            .exec_without_returning(self.conn)
            .await?;

        if !draft.tag_ids.is_empty() {
            let tags = draft.tag_ids.iter().map(|&tag_id| problem_set_tag::ActiveModel {
                problem_set_id: Set(set.id),
                tag_id: Set(tag_id),
            });
            problem_set_tag::Entity::insert_many(tags)
                .exec_without_returning(self.conn)
                .await?;
        }

        info!(problem_set_id = set.id, author_id, "problem set created");
        Ok(set)
    }
}

/// Insert a validated question with its options, answers and tag links.
///
/// Shared by voucher-gated creation and voucher-free imports.
pub(crate) async fn insert_question<C: ConnectionTrait>(
    conn: &C,
    author_id: Option<i32>,
    draft: &CreateQuestionRequest,
    provenance: Option<Provenance<'_>>,
    verified: bool,
) -> Result<question::Model, AppError> {
    ensure_tags_exist(conn, &draft.tag_ids).await?;

    let now = Utc::now();
    let (source, external_id) = match provenance {
        Some(p) => (Some(p.source.to_string()), Some(p.external_id.to_string())),
        None => (None, None),
    };
    let created = question::ActiveModel {
        author_id: Set(author_id),
        title: Set(draft.title.trim().to_string()),
        question_text: Set(draft.question_text.trim().to_string()),
        question_type: Set(draft.question_type),
        difficulty: Set(draft.difficulty),
        explanation: Set(draft.explanation.clone()),
        upvote_count: Set(0),
        downvote_count: Set(0),
        view_count: Set(0),
        is_verified: Set(verified),
        verified_at: Set(verified.then_some(now)),
        is_active: Set(true),
        source: Set(source),
        external_id: Set(external_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(conn)
    .await?;

    if !draft.options.is_empty() {
        let options = draft
            .options
            .iter()
            .enumerate()
            .map(|(i, o)| mcq_option::ActiveModel {
                question_id: Set(created.id),
                option_text: Set(o.text.trim().to_string()),
                is_correct: Set(o.is_correct),
                position: Set(i as i32 + 1),
                ..Default::default()
            });
        mcq_option::Entity::insert_many(options)
            .exec_without_returning(conn)
            .await?;
    }

    if !draft.answers.is_empty() {
        let answers = draft.answers.iter().map(|a| fill_blank_answer::ActiveModel {
            question_id: Set(created.id),
            correct_answer: Set(a.correct_answer.trim().to_string()),
            is_case_sensitive: Set(a.is_case_sensitive),
            ..Default::default()
        });
        fill_blank_answer::Entity::insert_many(answers)
            .exec_without_returning(conn)
            .await?;
    }

    if !draft.tag_ids.is_empty() {
        let links = draft.tag_ids.iter().map(|&tag_id| question_tag::ActiveModel {
            question_id: Set(created.id),
            tag_id: Set(tag_id),
        });
        question_tag::Entity::insert_many(links)
            .exec_without_returning(conn)
            .await?;
    }

    info!(question_id = created.id, ?author_id, "question created");
    Ok(created)
}

async fn ensure_tags_exist<C: ConnectionTrait>(conn: &C, tag_ids: &[i32]) -> Result<(), AppError> {
    if tag_ids.is_empty() {
        return Ok(());
    }
    let found = tag::Entity::find()
        .filter(tag::Column::Id.is_in(tag_ids.to_vec()))
        .count(conn)
        .await?;
    if found != tag_ids.len() as u64 {
        return Err(AppError::NotFound("Tag not found".into()));
    }
    Ok(())
}
