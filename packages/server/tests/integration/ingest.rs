use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde_json::{Value, json};

use server::entity::{question, tag};

use crate::common::{TestApp, routes};

fn record(source_id: &str, title: &str) -> Value {
    json!({
        "title": title,
        "text": "What is the capital of France?",
        "question_type": "mcq",
        "difficulty": "easy",
        "options": ["Lyon", "Paris", "Nice"],
        "correct_answers": ["paris"],
        "tags": [" Geography ", "geography", "Europe"],
        "source_id": source_id,
    })
}

#[tokio::test]
async fn import_creates_authorless_questions_and_tags() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin("admin").await;

    let res = app
        .post_with_token(
            routes::IMPORT,
            &json!({"source": "opentdb", "questions": [record("1", "Capital"), record("2", "Capital again")]}),
            &admin.token,
        )
        .await;

    assert_eq!(res.status, 200, "{}", res.text);
    let imported = res.body["imported"].as_array().unwrap();
    assert_eq!(imported.len(), 2);
    assert!(res.body["skipped"].as_array().unwrap().is_empty());

    let id = imported[0].as_i64().unwrap() as i32;
    let detail = app.get_without_token(&routes::question(id)).await;
    assert!(detail.body["author_id"].is_null());
    assert_eq!(detail.body["source"], "opentdb");
    let tags: Vec<&str> = detail.body["tags"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(tags, vec!["europe", "geography"]);

    assert_eq!(tag::Entity::find().count(&app.db).await.unwrap(), 2);
    assert_eq!(app.find_user(admin.id).await.question_vouchers, 0);
}

#[tokio::test]
async fn reimport_and_batch_duplicates_are_skipped() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin("admin").await;
    let body = json!({"source": "opentdb", "questions": [record("7", "Once")]});

    let first = app.post_with_token(routes::IMPORT, &body, &admin.token).await;
    assert_eq!(first.body["imported"].as_array().unwrap().len(), 1);

    let second = app
        .post_with_token(
            routes::IMPORT,
            &json!({"source": "opentdb", "questions": [record("7", "Once"), record("8", "Twice"), record("8", "Twice")]}),
            &admin.token,
        )
        .await;
    assert_eq!(second.status, 200, "{}", second.text);
    assert_eq!(second.body["imported"].as_array().unwrap().len(), 1);

    let reasons: Vec<&str> = second.body["skipped"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["reason"].as_str().unwrap())
        .collect();
    assert_eq!(reasons, vec!["already imported", "duplicate within batch"]);

    // The same provider id from another source is a different question.
    let other = app
        .post_with_token(
            routes::IMPORT,
            &json!({"source": "trivia", "questions": [record("7", "Elsewhere")]}),
            &admin.token,
        )
        .await;
    assert_eq!(other.body["imported"].as_array().unwrap().len(), 1);

    let from_opentdb = question::Entity::find()
        .filter(question::Column::Source.eq("opentdb"))
        .count(&app.db)
        .await
        .unwrap();
    assert_eq!(from_opentdb, 2);
}

#[tokio::test]
async fn invalid_records_are_skipped_not_fatal() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin("admin").await;
    let mut unanswerable = record("9", "No match");
    unanswerable["correct_answers"] = json!(["Marseille"]);

    let res = app
        .post_with_token(
            routes::IMPORT,
            &json!({"source": "opentdb", "questions": [unanswerable, record("10", "Fine")], "auto_verify": true}),
            &admin.token,
        )
        .await;

    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["imported"].as_array().unwrap().len(), 1);
    assert_eq!(res.body["skipped"][0]["source_id"], "9");

    let id = res.body["imported"][0].as_i64().unwrap() as i32;
    let detail = app.get_without_token(&routes::question(id)).await;
    assert_eq!(detail.body["is_verified"], true);
}

#[tokio::test]
async fn only_admins_may_import() {
    let app = TestApp::spawn().await;
    let user = app.create_user("user").await;

    let res = app
        .post_with_token(
            routes::IMPORT,
            &json!({"source": "opentdb", "questions": [record("1", "Capital")]}),
            &user.token,
        )
        .await;

    assert_eq!(res.status, 403);
    assert_eq!(res.body["code"], "PERMISSION_DENIED");
    assert_eq!(question::Entity::find().count(&app.db).await.unwrap(), 0);
}
