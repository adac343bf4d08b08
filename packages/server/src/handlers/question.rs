use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::prelude::Expr;
use sea_orm::*;
use tracing::{info, instrument};

use crate::entity::{comment, mcq_option, question, question_tag, tag};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::comment::{CommentResponse, CreateCommentRequest, validate_comment};
use crate::models::question::*;
use crate::models::shared::{ContentSort, Pagination, page_params};
use crate::services::answer::AnswerService;
use crate::services::issuance::IssuanceGate;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/",
    tag = "Questions",
    operation_id = "createQuestion",
    summary = "Create a question",
    description = "Spends one question voucher. Admins are exempt. The voucher is only spent if the question and all its options, answers and tag links are created.",
    request_body = CreateQuestionRequest,
    responses(
        (status = 201, description = "Question created", body = QuestionDetailResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "No vouchers left (INSUFFICIENT_VOUCHERS)", body = ErrorBody),
        (status = 404, description = "Author or tag not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id, title = %payload.title))]
pub async fn create_question(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_question_draft(&payload)?;

    let txn = state.begin().await?;
    let created = IssuanceGate::new(&txn)
        .create_question(auth_user.user_id, &payload)
        .await?;
    let detail = load_question_detail(&txn, created).await?;
    txn.commit().await?;

    Ok((StatusCode::CREATED, Json(detail)))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Questions",
    operation_id = "listQuestions",
    summary = "List active questions",
    description = "Sort by `newest` (default), `popular` (net votes) or `upvotes`.",
    params(QuestionListQuery),
    responses(
        (status = 200, description = "List of questions", body = QuestionListResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_questions(
    State(state): State<AppState>,
    Query(query): Query<QuestionListQuery>,
) -> Result<Json<QuestionListResponse>, AppError> {
    let (page, per_page) = page_params(query.page, query.per_page);
    let sort = ContentSort::parse(query.sort.as_deref())?;

    let mut select = question::Entity::find().filter(question::Column::IsActive.eq(true));
    if let Some(verified) = query.verified {
        select = select.filter(question::Column::IsVerified.eq(verified));
    }
    if let Some(author_id) = query.author_id {
        select = select.filter(question::Column::AuthorId.eq(author_id));
    }
    if let Some(difficulty) = query.difficulty {
        select = select.filter(question::Column::Difficulty.eq(difficulty));
    }

    let total = select.clone().count(&state.db).await?;

    select = match sort {
        ContentSort::Newest => select.order_by_desc(question::Column::CreatedAt),
        ContentSort::Popular => select.order_by_desc(
            Expr::col(question::Column::UpvoteCount)
                .sub(Expr::col(question::Column::DownvoteCount)),
        ),
        ContentSort::Upvotes => select.order_by_desc(question::Column::UpvoteCount),
    };

    let data = select
        .order_by_desc(question::Column::Id)
        .offset(Some((page - 1) * per_page))
        .limit(Some(per_page))
        .all(&state.db)
        .await?
        .into_iter()
        .map(QuestionResponse::from)
        .collect();

    Ok(Json(QuestionListResponse {
        data,
        pagination: Pagination::new(page, per_page, total),
    }))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Questions",
    operation_id = "getQuestion",
    summary = "Get a question with its options and tags",
    params(("id" = i32, Path, description = "Question ID")),
    responses(
        (status = 200, description = "Question details", body = QuestionDetailResponse),
        (status = 404, description = "Question not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_question(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<QuestionDetailResponse>, AppError> {
    let model = find_active_question(&state.db, id).await?;
    Ok(Json(load_question_detail(&state.db, model).await?))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Questions",
    operation_id = "deleteQuestion",
    summary = "Soft-delete a question",
    description = "Allowed for the author and admins. Votes and reputation history are kept.",
    params(("id" = i32, Path, description = "Question ID")),
    responses(
        (status = 204, description = "Question deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Question not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn delete_question(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let txn = state.begin().await?;
    let existing = find_active_question_for_update(&txn, id).await?;
    if existing.author_id != Some(auth_user.user_id) {
        auth_user.require_admin()?;
    }

    let mut active: question::ActiveModel = existing.into();
    active.is_active = Set(false);
    active.updated_at = Set(chrono::Utc::now());
    active.update(&txn).await?;
    txn.commit().await?;

    info!(question_id = id, "question soft-deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/{id}/view",
    tag = "Questions",
    operation_id = "recordQuestionView",
    summary = "Count a view",
    params(("id" = i32, Path, description = "Question ID")),
    responses(
        (status = 204, description = "View recorded"),
        (status = 404, description = "Question not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn record_view(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let result = question::Entity::update_many()
        .col_expr(
            question::Column::ViewCount,
            Expr::col(question::Column::ViewCount).add(1),
        )
        .filter(question::Column::Id.eq(id))
        .filter(question::Column::IsActive.eq(true))
        .exec(&state.db)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Question not found".into()));
    }
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/{id}/answers",
    tag = "Questions",
    operation_id = "submitAnswer",
    summary = "Answer a question",
    description = "MCQ answers are an option id; fill-in-blank answers are free text. The first correct answer earns one reputation point.",
    params(("id" = i32, Path, description = "Question ID")),
    request_body = SubmitAnswerRequest,
    responses(
        (status = 200, description = "Graded attempt", body = SubmitAnswerResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Question not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn submit_answer(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<SubmitAnswerRequest>,
) -> Result<Json<SubmitAnswerResponse>, AppError> {
    let txn = state.begin().await?;
    let outcome = AnswerService::new(&txn)
        .submit_answer(auth_user.user_id, id, &payload.answer, payload.time_taken)
        .await?;
    txn.commit().await?;

    Ok(Json(SubmitAnswerResponse {
        attempt_id: outcome.attempt_id,
        is_correct: outcome.is_correct,
        explanation: outcome.explanation,
        correct_answers: outcome.correct_answers,
        reputation_awarded: outcome.reputation_awarded,
    }))
}

#[utoipa::path(
    get,
    path = "/{id}/comments",
    tag = "Comments",
    operation_id = "listComments",
    summary = "Active comments on a question, oldest first",
    params(("id" = i32, Path, description = "Question ID")),
    responses(
        (status = 200, description = "Comments", body = Vec<CommentResponse>),
        (status = 404, description = "Question not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn list_comments(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<CommentResponse>>, AppError> {
    find_active_question(&state.db, id).await?;

    let comments = comment::Entity::find()
        .filter(comment::Column::QuestionId.eq(id))
        .filter(comment::Column::IsActive.eq(true))
        .order_by_asc(comment::Column::CreatedAt)
        .order_by_asc(comment::Column::Id)
        .all(&state.db)
        .await?;

    Ok(Json(comments.into_iter().map(CommentResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/{id}/comments",
    tag = "Comments",
    operation_id = "createComment",
    summary = "Comment on a question or reply to a comment",
    params(("id" = i32, Path, description = "Question ID")),
    request_body = CreateCommentRequest,
    responses(
        (status = 201, description = "Comment created", body = CommentResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Question or parent not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn create_comment(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<CreateCommentRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_comment(&payload)?;

    let txn = state.begin().await?;
    find_active_question(&txn, id).await?;

    if let Some(parent_id) = payload.parent_id {
        comment::Entity::find_by_id(parent_id)
            .filter(comment::Column::QuestionId.eq(id))
            .filter(comment::Column::IsActive.eq(true))
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Parent comment not found".into()))?;
    }

    let now = chrono::Utc::now();
    let created = comment::ActiveModel {
        question_id: Set(id),
        author_id: Set(Some(auth_user.user_id)),
        parent_id: Set(payload.parent_id),
        body: Set(payload.text.trim().to_string()),
        upvote_count: Set(0),
        downvote_count: Set(0),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    Ok((StatusCode::CREATED, Json(CommentResponse::from(created))))
}

async fn find_active_question<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<question::Model, AppError> {
    question::Entity::find_by_id(id)
        .filter(question::Column::IsActive.eq(true))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Question not found".into()))
}

async fn find_active_question_for_update(
    txn: &DatabaseTransaction,
    id: i32,
) -> Result<question::Model, AppError> {
    use sea_orm::sea_query::LockType;
    question::Entity::find_by_id(id)
        .filter(question::Column::IsActive.eq(true))
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Question not found".into()))
}

/// Tags linked to a question, ordered by name.
async fn question_tags<C: ConnectionTrait>(
    db: &C,
    question_id: i32,
) -> Result<Vec<tag::Model>, DbErr> {
    let tag_ids: Vec<i32> = question_tag::Entity::find()
        .select_only()
        .column(question_tag::Column::TagId)
        .filter(question_tag::Column::QuestionId.eq(question_id))
        .into_tuple()
        .all(db)
        .await?;
    if tag_ids.is_empty() {
        return Ok(vec![]);
    }
    tag::Entity::find()
        .filter(tag::Column::Id.is_in(tag_ids))
        .order_by_asc(tag::Column::Name)
        .all(db)
        .await
}

async fn load_question_detail<C: ConnectionTrait>(
    db: &C,
    model: question::Model,
) -> Result<QuestionDetailResponse, AppError> {
    let options = mcq_option::Entity::find()
        .filter(mcq_option::Column::QuestionId.eq(model.id))
        .order_by_asc(mcq_option::Column::Position)
        .all(db)
        .await?;
    let tags = question_tags(db, model.id).await?;

    Ok(QuestionDetailResponse {
        question: model.into(),
        options: options.into_iter().map(OptionResponse::from).collect(),
        tags: tags.into_iter().map(TagResponse::from).collect(),
    })
}
