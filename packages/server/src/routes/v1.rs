use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers;
use crate::state::AppState;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/auth", auth_routes())
        .nest("/questions", question_routes())
        .nest("/problem-sets", problem_set_routes())
        .nest("/comments", comment_routes())
        .nest("/votes", vote_routes())
        .nest("/users", user_routes())
        .nest("/admin", admin_routes())
}

fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::auth::register))
        .routes(routes!(handlers::auth::login))
        .routes(routes!(handlers::auth::me))
}

fn question_routes() -> OpenApiRouter<AppState> {
    use handlers::question::*;

    OpenApiRouter::new()
        .routes(routes!(list_questions, create_question))
        .routes(routes!(get_question, delete_question))
        .routes(routes!(record_view))
        .routes(routes!(submit_answer))
        .routes(routes!(list_comments, create_comment))
}

fn problem_set_routes() -> OpenApiRouter<AppState> {
    use handlers::problem_set::*;

    OpenApiRouter::new()
        .routes(routes!(list_problem_sets, create_problem_set))
        .routes(routes!(get_problem_set, delete_problem_set))
        .routes(routes!(record_view))
}

fn comment_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(handlers::comment::delete_comment))
}

fn vote_routes() -> OpenApiRouter<AppState> {
    use handlers::vote::*;

    OpenApiRouter::new()
        .routes(routes!(cast_vote))
        .routes(routes!(list_my_votes))
        .routes(routes!(get_vote_state))
}

fn user_routes() -> OpenApiRouter<AppState> {
    use handlers::reputation::*;

    OpenApiRouter::new()
        .routes(routes!(get_my_reputation))
        .routes(routes!(get_user_reputation))
        .routes(routes!(get_reputation_history))
}

fn admin_routes() -> OpenApiRouter<AppState> {
    use handlers::admin::*;

    OpenApiRouter::new()
        .routes(routes!(set_question_verified))
        .routes(routes!(set_problem_set_verified))
        .routes(routes!(import_questions))
}
