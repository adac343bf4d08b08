use serde_json::json;

use crate::common::{TestApp, routes};

async fn fill_in_blank(app: &TestApp, token: &str, answers: serde_json::Value) -> i32 {
    let res = app
        .post_with_token(
            routes::QUESTIONS,
            &json!({
                "title": "Fill it in",
                "question_text": "The Rust type for a growable array is ____.",
                "question_type": "fill_in_blank",
                "explanation": "Vec<T> owns a heap buffer.",
                "answers": answers,
            }),
            token,
        )
        .await;
    assert_eq!(res.status, 201, "{}", res.text);
    res.id()
}

async fn answer(app: &TestApp, token: &str, question_id: i32, text: &str) -> serde_json::Value {
    let res = app
        .post_with_token(
            &routes::question_answers(question_id),
            &json!({"answer": text, "time_taken": 12}),
            token,
        )
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    res.body
}

#[tokio::test]
async fn only_the_first_correct_answer_earns_reputation() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin("admin").await;
    let student = app.create_user("student").await;
    let q = fill_in_blank(&app, &admin.token, json!([{"correct_answer": "Vec"}])).await;

    let wrong = answer(&app, &student.token, q, "array").await;
    assert_eq!(wrong["is_correct"], false);
    assert_eq!(wrong["reputation_awarded"], 0);
    assert_eq!(wrong["correct_answers"], json!(["Vec"]));

    let first = answer(&app, &student.token, q, "vec").await;
    assert_eq!(first["is_correct"], true);
    assert_eq!(first["reputation_awarded"], 1);
    assert_eq!(first["explanation"], "Vec<T> owns a heap buffer.");

    let again = answer(&app, &student.token, q, "Vec").await;
    assert_eq!(again["is_correct"], true);
    assert_eq!(again["reputation_awarded"], 0);

    assert_eq!(app.reputation_of(student.id).await, 1);
}

#[tokio::test]
async fn case_sensitive_answers_must_match_exactly() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin("admin").await;
    let student = app.create_user("student").await;
    let q = fill_in_blank(
        &app,
        &admin.token,
        json!([{"correct_answer": "Vec", "is_case_sensitive": true}]),
    )
    .await;

    assert_eq!(answer(&app, &student.token, q, "vec").await["is_correct"], false);
    assert_eq!(answer(&app, &student.token, q, " Vec ").await["is_correct"], true);
}

#[tokio::test]
async fn mcq_answers_are_option_ids() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin("admin").await;
    let student = app.create_user("student").await;
    let q = app.create_question(&admin.token, "Methods").await;

    let detail = app.get_without_token(&routes::question(q)).await;
    let options = detail.body["options"].as_array().unwrap();
    let post = options[0]["id"].as_i64().unwrap();
    let put = options[1]["id"].as_i64().unwrap();

    let wrong = answer(&app, &student.token, q, &post.to_string()).await;
    assert_eq!(wrong["is_correct"], false);
    assert_eq!(wrong["correct_answers"], json!(["PUT"]));

    let right = answer(&app, &student.token, q, &put.to_string()).await;
    assert_eq!(right["is_correct"], true);

    let res = app
        .post_with_token(
            &routes::question_answers(q),
            &json!({"answer": "PUT"}),
            &student.token,
        )
        .await;
    assert_eq!(res.status, 400);
}

#[tokio::test]
async fn answering_a_missing_question_is_not_found() {
    let app = TestApp::spawn().await;
    let student = app.create_user("student").await;

    let res = app
        .post_with_token(
            &routes::question_answers(9999),
            &json!({"answer": "1"}),
            &student.token,
        )
        .await;

    assert_eq!(res.status, 404);
}
