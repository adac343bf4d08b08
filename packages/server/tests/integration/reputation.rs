use common::reputation::replay;
use common::{ReferenceType, ReputationReason};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde_json::json;
use tokio::task::JoinSet;

use server::entity::reputation_entry;
use server::services::reputation::apply_reputation_delta;

use crate::common::{STATEMENT_TIMEOUT_MS, TestApp, routes};

/// Option id of the correct answer ("PUT") of a question made by `create_question`.
async fn correct_option(app: &TestApp, question_id: i32) -> i64 {
    let detail = app.get_without_token(&routes::question(question_id)).await;
    detail.body["options"]
        .as_array()
        .unwrap()
        .iter()
        .find(|o| o["text"] == "PUT")
        .and_then(|o| o["id"].as_i64())
        .expect("question should have a PUT option")
}

#[tokio::test]
async fn answer_upvote_switch_and_removal_walkthrough() {
    let app = TestApp::spawn().await;
    let a = app.create_author("user_a", 1).await;
    let b = app.create_user("user_b").await;
    let q = app.create_question(&a.token, "Walkthrough").await;

    let option = correct_option(&app, q).await;
    let answered = app
        .post_with_token(
            &routes::question_answers(q),
            &json!({"answer": option.to_string()}),
            &a.token,
        )
        .await;
    assert_eq!(answered.status, 200, "{}", answered.text);
    assert_eq!(app.reputation_of(a.id).await, 1);

    app.vote(&b.token, "question", q, "upvote").await;
    assert_eq!(app.reputation_of(a.id).await, 2);

    app.vote(&b.token, "question", q, "downvote").await;
    assert_eq!(app.reputation_of(a.id).await, 1);

    let removed = app.vote(&b.token, "question", q, "downvote").await;
    assert!(removed.body["user_vote"].is_null());
    assert_eq!(app.reputation_of(a.id).await, 1);
}

#[tokio::test]
async fn crossing_twenty_grants_exactly_one_voucher() {
    let app = TestApp::spawn().await;
    let user = app.create_user("climber").await;

    for _ in 0..19 {
        app.apply_reputation(user.id, 1, ReputationReason::QuestionAnswered, None)
            .await;
    }
    let before = app.find_user(user.id).await;
    assert_eq!((before.reputation_score, before.question_vouchers), (19, 0));

    let change = app
        .apply_reputation(user.id, 1, ReputationReason::QuestionAnswered, None)
        .await;
    assert_eq!(change.new_reputation, 20);
    assert_eq!(change.vouchers_earned, 1);
    assert_eq!(change.current_vouchers, 1);

    let res = app.get_without_token(&routes::reputation(user.id)).await;
    assert_eq!(res.body["reputation_score"], 20);
    assert_eq!(res.body["question_vouchers"], 1);
    assert_eq!(res.body["next_voucher_at"], 40);
}

#[tokio::test]
async fn large_jump_grants_every_crossed_milestone() {
    let app = TestApp::spawn().await;
    let user = app.create_user("jumper").await;

    let change = app
        .apply_reputation(user.id, 45, ReputationReason::ProblemSetVerified, None)
        .await;

    assert_eq!(change.new_reputation, 45);
    assert_eq!(change.vouchers_earned, 2);
    assert_eq!(app.find_user(user.id).await.question_vouchers, 2);

    let grant = reputation_entry::Entity::find()
        .filter(reputation_entry::Column::UserId.eq(user.id))
        .filter(reputation_entry::Column::Reason.eq(ReputationReason::VoucherEarned))
        .one(&app.db)
        .await
        .unwrap()
        .expect("voucher grant should be logged");
    assert_eq!(grant.points_delta, 0);
    assert_eq!(grant.reference_id, Some(2));
    assert_eq!(grant.reference_type, Some(ReferenceType::Voucher));
}

#[tokio::test]
async fn concurrent_deltas_on_one_user_are_all_applied() {
    let app = TestApp::spawn().await;
    let user = app.create_user("popular").await;

    let mut tasks = JoinSet::new();
    for _ in 0..20 {
        let db = app.db.clone();
        let user_id = user.id;
        tasks.spawn(async move {
            apply_reputation_delta(
                &db,
                STATEMENT_TIMEOUT_MS,
                user_id,
                1,
                ReputationReason::QuestionAnswered,
                None,
                None,
            )
            .await
        });
    }
    while let Some(joined) = tasks.join_next().await {
        joined.unwrap().unwrap();
    }

    let stored = app.find_user(user.id).await;
    assert_eq!(stored.reputation_score, 20);
    assert_eq!(stored.question_vouchers, 1);

    let entries = reputation_entry::Entity::find()
        .filter(reputation_entry::Column::UserId.eq(user.id))
        .all(&app.db)
        .await
        .unwrap();
    let deltas: Vec<i32> = entries.iter().map(|e| e.points_delta).collect();
    assert_eq!(entries.len(), 21);
    assert_eq!(replay(deltas), stored.reputation_score);
}

#[tokio::test]
async fn oscillating_across_a_milestone_grants_on_each_upward_crossing() {
    let app = TestApp::spawn().await;
    let user = app.create_user("yoyo").await;

    for delta in [20, -1, 1] {
        app.apply_reputation(user.id, delta, ReputationReason::QuestionUpvoted, None)
            .await;
    }

    let stored = app.find_user(user.id).await;
    assert_eq!(stored.reputation_score, 20);
    assert_eq!(stored.question_vouchers, 2);
}

#[tokio::test]
async fn score_is_clamped_but_history_keeps_raw_deltas() {
    let app = TestApp::spawn().await;
    let user = app.create_user("clamped").await;

    for delta in [2, -5, 3] {
        app.apply_reputation(user.id, delta, ReputationReason::QuestionUpvoted, None)
            .await;
    }

    let entries = reputation_entry::Entity::find()
        .filter(reputation_entry::Column::UserId.eq(user.id))
        .order_by_asc(reputation_entry::Column::Id)
        .all(&app.db)
        .await
        .unwrap();
    let deltas: Vec<i32> = entries.iter().map(|e| e.points_delta).collect();
    assert_eq!(deltas, vec![2, -5, 3]);

    let cached = app.find_user(user.id).await.reputation_score;
    assert_eq!(cached, 3);
    assert_eq!(replay(deltas), cached);
}

#[tokio::test]
async fn history_is_newest_first_and_records_voucher_grants() {
    let app = TestApp::spawn().await;
    let user = app.create_user("historian").await;

    app.apply_reputation(
        user.id,
        1,
        ReputationReason::QuestionAnswered,
        Some((7, ReferenceType::Answer)),
    )
    .await;
    app.apply_reputation(
        user.id,
        19,
        ReputationReason::ProblemSetVerified,
        Some((3, ReferenceType::ProblemSet)),
    )
    .await;

    let res = app.get_without_token(&routes::reputation_history(user.id)).await;
    assert_eq!(res.status, 200, "{}", res.text);

    let entries = res.body.as_array().unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0]["reason"], "voucher_earned");
    assert_eq!(entries[0]["points_delta"], 0);
    assert_eq!(entries[0]["reference_id"], 1);
    assert_eq!(entries[1]["reason"], "problemset_verified");
    assert_eq!(entries[1]["reference_type"], "problemset");
    assert_eq!(entries[2]["reason"], "question_answered");
    assert_eq!(entries[2]["reference_id"], 7);

    let limited = app
        .get_without_token(&format!("{}?limit=1", routes::reputation_history(user.id)))
        .await;
    assert_eq!(limited.body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn reputation_of_unknown_user_is_not_found() {
    let app = TestApp::spawn().await;

    let res = app.get_without_token(&routes::reputation(9999)).await;

    assert_eq!(res.status, 404);
    assert_eq!(res.body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn my_reputation_requires_a_token() {
    let app = TestApp::spawn().await;
    let user = app.create_user("me").await;

    assert_eq!(app.get_without_token(routes::MY_REPUTATION).await.status, 401);

    let res = app.get_with_token(routes::MY_REPUTATION, &user.token).await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["user_id"], user.id);
    assert_eq!(res.body["points_to_next_voucher"], 20);
}
