use serde_json::json;

use crate::common::{PASSWORD, TestApp, routes};

mod registration {
    use super::*;

    #[tokio::test]
    async fn new_user_starts_with_zero_reputation_and_vouchers() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::REGISTER,
                &json!({"username": "alice", "email": "Alice@Example.com", "password": PASSWORD}),
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["username"], "alice");
        assert_eq!(res.body["question_vouchers"], 0);

        let stored = app.find_user(res.id()).await;
        assert_eq!(stored.email, "alice@example.com");
        assert_eq!(stored.reputation_score, 0);
    }

    #[tokio::test]
    async fn cannot_register_with_an_already_taken_username() {
        let app = TestApp::spawn().await;
        app.create_user("alice").await;

        let res = app
            .post_without_token(
                routes::REGISTER,
                &json!({"username": "alice", "email": "other@example.com", "password": PASSWORD}),
            )
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "USERNAME_TAKEN");
    }

    #[tokio::test]
    async fn cannot_register_with_an_already_used_email() {
        let app = TestApp::spawn().await;
        app.create_user("alice").await;

        let res = app
            .post_without_token(
                routes::REGISTER,
                &json!({"username": "bob", "email": "alice@example.com", "password": PASSWORD}),
            )
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn cannot_register_with_a_password_that_is_too_short() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::REGISTER,
                &json!({"username": "alice", "email": "alice@example.com", "password": "short"}),
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}

mod login {
    use super::*;

    #[tokio::test]
    async fn registered_user_can_login_and_receives_token() {
        let app = TestApp::spawn().await;
        let user = app.create_user("alice").await;

        let res = app.get_with_token(routes::ME, &user.token).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["id"], user.id);
        assert_eq!(res.body["username"], "alice");
        assert_eq!(res.body["role"], "user");
    }

    #[tokio::test]
    async fn cannot_login_with_wrong_password() {
        let app = TestApp::spawn().await;
        app.create_user("alice").await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({"username": "alice", "password": "wrong-password"}),
            )
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "INVALID_CREDENTIALS");
    }

    #[tokio::test]
    async fn deactivated_user_cannot_login() {
        let app = TestApp::spawn().await;
        let user = app.create_user("alice").await;
        app.deactivate_user(user.id).await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({"username": "alice", "password": PASSWORD}),
            )
            .await;

        assert_eq!(res.status, 401);
    }
}

mod authenticated_access {
    use super::*;

    #[tokio::test]
    async fn request_without_token_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(routes::ME).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
    }

    #[tokio::test]
    async fn request_with_malformed_token_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app.get_with_token(routes::ME, "not-a-jwt").await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_INVALID");
    }
}
