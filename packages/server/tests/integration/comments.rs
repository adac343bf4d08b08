use serde_json::json;

use crate::common::{TestApp, routes};

async fn comment(app: &TestApp, token: &str, question_id: i32, body: serde_json::Value) -> i32 {
    let res = app
        .post_with_token(&routes::question_comments(question_id), &body, token)
        .await;
    assert_eq!(res.status, 201, "{}", res.text);
    res.id()
}

#[tokio::test]
async fn replies_thread_under_their_parent() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin("admin").await;
    let user = app.create_user("commenter").await;
    let q = app.create_question(&admin.token, "Discussed").await;

    let root = comment(&app, &user.token, q, json!({"text": "Why PUT?"})).await;
    let reply = comment(
        &app,
        &admin.token,
        q,
        json!({"text": "Because it replaces.", "parent_id": root}),
    )
    .await;

    let res = app.get_without_token(&routes::question_comments(q)).await;
    assert_eq!(res.status, 200, "{}", res.text);
    let listed = res.body.as_array().unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0]["id"], root);
    assert_eq!(listed[1]["id"], reply);
    assert_eq!(listed[1]["parent_id"], root);
}

#[tokio::test]
async fn parent_must_belong_to_the_same_question() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin("admin").await;
    let first = app.create_question(&admin.token, "First").await;
    let second = app.create_question(&admin.token, "Second").await;
    let root = comment(&app, &admin.token, first, json!({"text": "On the first"})).await;

    let res = app
        .post_with_token(
            &routes::question_comments(second),
            &json!({"text": "Misplaced", "parent_id": root}),
            &admin.token,
        )
        .await;

    assert_eq!(res.status, 404);
}

#[tokio::test]
async fn comment_upvotes_credit_the_commenter() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin("admin").await;
    let commenter = app.create_user("commenter").await;
    let voter = app.create_user("voter").await;
    let q = app.create_question(&admin.token, "Discussed").await;
    let c = comment(&app, &commenter.token, q, json!({"text": "Good one"})).await;

    let res = app.vote(&voter.token, "comment", c, "upvote").await;

    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["is_verified"], false);
    assert_eq!(app.reputation_of(commenter.id).await, 1);
}

#[tokio::test]
async fn deleted_comments_disappear_and_only_authors_or_admins_delete() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin("admin").await;
    let commenter = app.create_user("commenter").await;
    let other = app.create_user("other").await;
    let q = app.create_question(&admin.token, "Discussed").await;
    let c = comment(&app, &commenter.token, q, json!({"text": "Soon gone"})).await;

    let denied = app.delete_with_token(&routes::comment(c), &other.token).await;
    assert_eq!(denied.status, 403);

    let res = app.delete_with_token(&routes::comment(c), &commenter.token).await;
    assert_eq!(res.status, 204);

    let listed = app.get_without_token(&routes::question_comments(q)).await;
    assert!(listed.body.as_array().unwrap().is_empty());

    let vote = app.vote(&other.token, "comment", c, "upvote").await;
    assert_eq!(vote.status, 404);
}

#[tokio::test]
async fn empty_comment_is_rejected() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin("admin").await;
    let q = app.create_question(&admin.token, "Quiet").await;

    let res = app
        .post_with_token(&routes::question_comments(q), &json!({"text": "   "}), &admin.token)
        .await;

    assert_eq!(res.status, 400);
    assert_eq!(res.body["code"], "VALIDATION_ERROR");
}
