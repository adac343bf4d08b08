use serde_json::json;

use crate::common::{TestApp, routes};

mod auto_verification {
    use super::*;

    async fn upvote_from_new_users(app: &TestApp, question_id: i32, prefix: &str, count: usize) {
        for i in 0..count {
            let voter = app.create_user(&format!("{prefix}{i}")).await;
            let res = app.vote(&voter.token, "question", question_id, "upvote").await;
            assert_eq!(res.status, 200, "{}", res.text);
        }
    }

    #[tokio::test]
    async fn question_is_verified_at_ten_net_upvotes() {
        let app = TestApp::spawn().await;
        let author = app.create_author("author", 1).await;
        let q = app.create_question(&author.token, "Rising").await;

        upvote_from_new_users(&app, q, "early", 9).await;
        let res = app.get_without_token(&routes::question(q)).await;
        assert_eq!(res.body["is_verified"], false);

        upvote_from_new_users(&app, q, "late", 1).await;
        let res = app.get_without_token(&routes::question(q)).await;
        assert_eq!(res.body["is_verified"], true);
        assert!(res.body["verified_at"].is_string());
    }

    #[tokio::test]
    async fn downvotes_count_against_the_threshold() {
        let app = TestApp::spawn().await;
        let author = app.create_author("author", 1).await;
        let q = app.create_question(&author.token, "Divisive").await;

        let critic = app.create_user("critic").await;
        app.vote(&critic.token, "question", q, "downvote").await;
        upvote_from_new_users(&app, q, "voter", 10).await;

        let res = app.get_without_token(&routes::question(q)).await;
        assert_eq!(res.body["upvote_count"], 10);
        assert_eq!(res.body["is_verified"], false);
    }

    #[tokio::test]
    async fn auto_verification_is_sticky() {
        let app = TestApp::spawn().await;
        let author = app.create_author("author", 1).await;
        let q = app.create_question(&author.token, "Sticky").await;
        upvote_from_new_users(&app, q, "voter", 10).await;

        let critic = app.create_user("critic").await;
        let res = app.vote(&critic.token, "question", q, "downvote").await;

        assert_eq!(res.body["is_verified"], true);
    }
}

mod admin_verification {
    use super::*;

    async fn problem_set_by(app: &TestApp, author_token: &str, admin_token: &str) -> i32 {
        let ids = [
            app.create_question(admin_token, "A").await,
            app.create_question(admin_token, "B").await,
        ];
        let res = app
            .post_with_token(
                routes::PROBLEM_SETS,
                &json!({"title": "Pair", "question_ids": ids}),
                author_token,
            )
            .await;
        assert_eq!(res.status, 201, "{}", res.text);
        res.id()
    }

    #[tokio::test]
    async fn verifying_a_problem_set_awards_and_unverifying_reverses() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("admin").await;
        let author = app.create_author("author", 1).await;
        let set_id = problem_set_by(&app, &author.token, &admin.token).await;

        let res = app
            .put_with_token(
                &routes::problem_set_verification(set_id),
                &json!({"verified": true}),
                &admin.token,
            )
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["is_verified"], true);
        assert_eq!(res.body["author_reputation_delta"], 1);
        assert_eq!(app.reputation_of(author.id).await, 1);

        let res = app
            .put_with_token(
                &routes::problem_set_verification(set_id),
                &json!({"verified": false}),
                &admin.token,
            )
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["author_reputation_delta"], -1);
        assert_eq!(app.reputation_of(author.id).await, 0);
    }

    #[tokio::test]
    async fn verifying_twice_is_a_conflict() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("admin").await;
        let author = app.create_author("author", 1).await;
        let set_id = problem_set_by(&app, &author.token, &admin.token).await;
        let path = routes::problem_set_verification(set_id);

        app.put_with_token(&path, &json!({"verified": true}), &admin.token)
            .await;
        let res = app
            .put_with_token(&path, &json!({"verified": true}), &admin.token)
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "CONFLICT");
        assert_eq!(app.reputation_of(author.id).await, 1);
    }

    #[tokio::test]
    async fn admin_verifying_own_set_earns_nothing() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("admin").await;
        let set_id = problem_set_by(&app, &admin.token, &admin.token).await;

        let res = app
            .put_with_token(
                &routes::problem_set_verification(set_id),
                &json!({"verified": true}),
                &admin.token,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["author_reputation_delta"], 0);
        assert_eq!(app.reputation_of(admin.id).await, 0);
    }

    #[tokio::test]
    async fn question_verification_has_no_reputation_effect() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("admin").await;
        let author = app.create_author("author", 1).await;
        let q = app.create_question(&author.token, "Checked").await;

        let res = app
            .put_with_token(
                &routes::question_verification(q),
                &json!({"verified": true}),
                &admin.token,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["is_verified"], true);
        assert_eq!(app.reputation_of(author.id).await, 0);
    }

    #[tokio::test]
    async fn regular_users_cannot_verify() {
        let app = TestApp::spawn().await;
        let author = app.create_author("author", 1).await;
        let q = app.create_question(&author.token, "Self-approved").await;

        let res = app
            .put_with_token(
                &routes::question_verification(q),
                &json!({"verified": true}),
                &author.token,
            )
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
    }
}
