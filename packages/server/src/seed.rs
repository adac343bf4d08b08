use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Index, PostgresQueryBuilder};
use sea_orm::*;
use tracing::{info, warn};

use common::Role;

use crate::entity::{reputation_entry, user, user_answer, vote};

/// Ensure required database indexes exist.
///
/// SeaORM's schema-sync doesn't support composite non-unique indexes,
/// so we create them manually on startup.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Reputation history: newest entries of one user.
    let history = Index::create()
        .if_not_exists()
        .name("idx_reputation_entry_user_created")
        .table(reputation_entry::Entity)
        .col(reputation_entry::Column::UserId)
        .col(reputation_entry::Column::CreatedAt)
        .to_string(PostgresQueryBuilder);

    // Vote state lookups by target.
    let votes = Index::create()
        .if_not_exists()
        .name("idx_vote_target")
        .table(vote::Entity)
        .col(vote::Column::TargetType)
        .col(vote::Column::TargetId)
        .to_string(PostgresQueryBuilder);

    // First-correct-answer checks.
    let answers = Index::create()
        .if_not_exists()
        .name("idx_user_answer_user_question")
        .table(user_answer::Entity)
        .col(user_answer::Column::UserId)
        .col(user_answer::Column::QuestionId)
        .to_string(PostgresQueryBuilder);

    for (name, stmt) in [
        ("idx_reputation_entry_user_created", history),
        ("idx_vote_target", votes),
        ("idx_user_answer_user_question", answers),
    ] {
        match db.execute_unprepared(&stmt).await {
            Ok(_) => info!("Ensured index {} exists", name),
            Err(e) => warn!("Failed to create index {}: {}", name, e),
        }
    }

    Ok(())
}

/// Promote the configured usernames to admin.
///
/// Unknown usernames are ignored, so the list can name accounts that register later.
pub async fn promote_admins(db: &DatabaseConnection, usernames: &[String]) -> Result<(), DbErr> {
    if usernames.is_empty() {
        return Ok(());
    }

    let result = user::Entity::update_many()
        .col_expr(user::Column::Role, Expr::value(Role::Admin.as_str()))
        .filter(user::Column::Username.is_in(usernames.iter().cloned()))
        .filter(user::Column::Role.ne(Role::Admin))
        .exec(db)
        .await?;

    if result.rows_affected > 0 {
        info!("Promoted {} users to admin", result.rows_affected);
    }
    Ok(())
}
