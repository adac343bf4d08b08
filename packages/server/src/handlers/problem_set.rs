use std::collections::HashMap;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::prelude::Expr;
use sea_orm::*;
use tracing::{info, instrument};

use crate::entity::{problem_set, problem_set_question, problem_set_tag, question, tag};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::problem_set::*;
use crate::models::question::{QuestionResponse, TagResponse};
use crate::models::shared::{ContentSort, Pagination, page_params};
use crate::services::issuance::IssuanceGate;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/",
    tag = "Problem Sets",
    operation_id = "createProblemSet",
    summary = "Create a problem set",
    description = "Bundles at least two active questions. Spends one question voucher unless the caller is an admin.",
    request_body = CreateProblemSetRequest,
    responses(
        (status = 201, description = "Problem set created", body = ProblemSetDetailResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR, INVALID_MEMBERSHIP)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "No vouchers left (INSUFFICIENT_VOUCHERS)", body = ErrorBody),
        (status = 404, description = "Author or tag not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id, title = %payload.title))]
pub async fn create_problem_set(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateProblemSetRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_problem_set_draft(&payload)?;

    let txn = state.begin().await?;
    let created = IssuanceGate::new(&txn)
        .create_problem_set(auth_user.user_id, &payload)
        .await?;
    let detail = load_problem_set_detail(&txn, created).await?;
    txn.commit().await?;

    Ok((StatusCode::CREATED, Json(detail)))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Problem Sets",
    operation_id = "listProblemSets",
    summary = "List active problem sets",
    description = "Sort by `newest` (default), `popular` (net votes) or `upvotes`.",
    params(ProblemSetListQuery),
    responses(
        (status = 200, description = "List of problem sets", body = ProblemSetListResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_problem_sets(
    State(state): State<AppState>,
    Query(query): Query<ProblemSetListQuery>,
) -> Result<Json<ProblemSetListResponse>, AppError> {
    let (page, per_page) = page_params(query.page, query.per_page);
    let sort = ContentSort::parse(query.sort.as_deref())?;

    let mut select =
        problem_set::Entity::find().filter(problem_set::Column::IsActive.eq(true));
    if let Some(verified) = query.verified {
        select = select.filter(problem_set::Column::IsVerified.eq(verified));
    }
    if let Some(author_id) = query.author_id {
        select = select.filter(problem_set::Column::AuthorId.eq(author_id));
    }

    let total = select.clone().count(&state.db).await?;

    select = match sort {
        ContentSort::Newest => select.order_by_desc(problem_set::Column::CreatedAt),
        ContentSort::Popular => select.order_by_desc(
            Expr::col(problem_set::Column::UpvoteCount)
                .sub(Expr::col(problem_set::Column::DownvoteCount)),
        ),
        ContentSort::Upvotes => select.order_by_desc(problem_set::Column::UpvoteCount),
    };

    let data = select
        .order_by_desc(problem_set::Column::Id)
        .offset(Some((page - 1) * per_page))
        .limit(Some(per_page))
        .all(&state.db)
        .await?
        .into_iter()
        .map(ProblemSetResponse::from)
        .collect();

    Ok(Json(ProblemSetListResponse {
        data,
        pagination: Pagination::new(page, per_page, total),
    }))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Problem Sets",
    operation_id = "getProblemSet",
    summary = "Get a problem set with its ordered questions",
    params(("id" = i32, Path, description = "Problem set ID")),
    responses(
        (status = 200, description = "Problem set details", body = ProblemSetDetailResponse),
        (status = 404, description = "Problem set not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_problem_set(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ProblemSetDetailResponse>, AppError> {
    let model = problem_set::Entity::find_by_id(id)
        .filter(problem_set::Column::IsActive.eq(true))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Problem set not found".into()))?;
    Ok(Json(load_problem_set_detail(&state.db, model).await?))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Problem Sets",
    operation_id = "deleteProblemSet",
    summary = "Soft-delete a problem set",
    description = "Allowed for the author and admins.",
    params(("id" = i32, Path, description = "Problem set ID")),
    responses(
        (status = 204, description = "Problem set deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Problem set not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn delete_problem_set(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    use sea_orm::sea_query::LockType;

    let txn = state.begin().await?;
    let existing = problem_set::Entity::find_by_id(id)
        .filter(problem_set::Column::IsActive.eq(true))
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Problem set not found".into()))?;
    if existing.author_id != Some(auth_user.user_id) {
        auth_user.require_admin()?;
    }

    let mut active: problem_set::ActiveModel = existing.into();
    active.is_active = Set(false);
    active.updated_at = Set(chrono::Utc::now());
    active.update(&txn).await?;
    txn.commit().await?;

    info!(problem_set_id = id, "problem set soft-deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/{id}/view",
    tag = "Problem Sets",
    operation_id = "recordProblemSetView",
    summary = "Count a view",
    params(("id" = i32, Path, description = "Problem set ID")),
    responses(
        (status = 204, description = "View recorded"),
        (status = 404, description = "Problem set not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn record_view(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let result = problem_set::Entity::update_many()
        .col_expr(
            problem_set::Column::ViewCount,
            Expr::col(problem_set::Column::ViewCount).add(1),
        )
        .filter(problem_set::Column::Id.eq(id))
        .filter(problem_set::Column::IsActive.eq(true))
        .exec(&state.db)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Problem set not found".into()));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Active member questions in position order, plus tags.
async fn load_problem_set_detail<C: ConnectionTrait>(
    db: &C,
    model: problem_set::Model,
) -> Result<ProblemSetDetailResponse, AppError> {
    let members = problem_set_question::Entity::find()
        .filter(problem_set_question::Column::ProblemSetId.eq(model.id))
        .order_by_asc(problem_set_question::Column::Position)
        .all(db)
        .await?;

    let mut questions: HashMap<i32, question::Model> = question::Entity::find()
        .filter(question::Column::Id.is_in(members.iter().map(|m| m.question_id)))
        .filter(question::Column::IsActive.eq(true))
        .all(db)
        .await?
        .into_iter()
        .map(|q| (q.id, q))
        .collect();

    let items = members
        .into_iter()
        .filter_map(|m| {
            questions
                .remove(&m.question_id)
                .map(|q| ProblemSetQuestionItem {
                    position: m.position,
                    question: QuestionResponse::from(q),
                })
        })
        .collect();

    let tag_ids: Vec<i32> = problem_set_tag::Entity::find()
        .select_only()
        .column(problem_set_tag::Column::TagId)
        .filter(problem_set_tag::Column::ProblemSetId.eq(model.id))
        .into_tuple()
        .all(db)
        .await?;
    let tags = if tag_ids.is_empty() {
        vec![]
    } else {
        tag::Entity::find()
            .filter(tag::Column::Id.is_in(tag_ids))
            .order_by_asc(tag::Column::Name)
            .all(db)
            .await?
    };

    Ok(ProblemSetDetailResponse {
        problem_set: model.into(),
        questions: items,
        tags: tags.into_iter().map(TagResponse::from).collect(),
    })
}
