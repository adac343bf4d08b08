use common::{VoteTarget, VoteType};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use tokio::task::JoinSet;

use server::entity::{question, vote};

use crate::common::{TestApp, routes};

/// Number of stored vote rows of `vote_type` on a question.
async fn vote_rows(app: &TestApp, question_id: i32, vote_type: VoteType) -> u64 {
    vote::Entity::find()
        .filter(vote::Column::TargetType.eq(VoteTarget::Question))
        .filter(vote::Column::TargetId.eq(question_id))
        .filter(vote::Column::VoteType.eq(vote_type))
        .count(&app.db)
        .await
        .unwrap()
}

mod transitions {
    use super::*;

    #[tokio::test]
    async fn upvote_then_upvote_again_removes_the_vote() {
        let app = TestApp::spawn().await;
        let author = app.create_author("author", 1).await;
        let voter = app.create_user("voter").await;
        let q = app.create_question(&author.token, "Toggle").await;

        let first = app.vote(&voter.token, "question", q, "upvote").await;
        assert_eq!(first.status, 200, "{}", first.text);
        assert_eq!(first.body["upvote_count"], 1);
        assert_eq!(first.body["user_vote"], "upvote");

        let second = app.vote(&voter.token, "question", q, "upvote").await;
        assert_eq!(second.status, 200, "{}", second.text);
        assert_eq!(second.body["upvote_count"], 0);
        assert!(second.body["user_vote"].is_null());

        assert_eq!(app.reputation_of(author.id).await, 0);
    }

    #[tokio::test]
    async fn switching_direction_moves_one_count_between_counters() {
        let app = TestApp::spawn().await;
        let author = app.create_author("author", 1).await;
        let voter = app.create_user("voter").await;
        let q = app.create_question(&author.token, "Switch").await;

        app.vote(&voter.token, "question", q, "upvote").await;
        let res = app.vote(&voter.token, "question", q, "downvote").await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["upvote_count"], 0);
        assert_eq!(res.body["downvote_count"], 1);
        assert_eq!(res.body["user_vote"], "downvote");
        assert_eq!(app.reputation_of(author.id).await, 0);
    }

    #[tokio::test]
    async fn vote_state_reports_counters_and_the_callers_vote() {
        let app = TestApp::spawn().await;
        let author = app.create_author("author", 1).await;
        let voter = app.create_user("voter").await;
        let q = app.create_question(&author.token, "State").await;
        app.vote(&voter.token, "question", q, "downvote").await;

        let anonymous = app
            .get_without_token(&routes::vote_state(VoteTarget::Question, q))
            .await;
        assert_eq!(anonymous.status, 200, "{}", anonymous.text);
        assert_eq!(anonymous.body["downvote_count"], 1);
        assert!(anonymous.body["user_vote"].is_null());

        let mine = app
            .get_with_token(&routes::vote_state(VoteTarget::Question, q), &voter.token)
            .await;
        assert_eq!(mine.body["user_vote"], "downvote");

        let forged = app
            .get_with_token(&routes::vote_state(VoteTarget::Question, q), "not-a-jwt")
            .await;
        assert_eq!(forged.status, 401);
        assert_eq!(forged.body["code"], "TOKEN_INVALID");

        let listed = app.get_with_token(routes::MY_VOTES, &voter.token).await;
        assert_eq!(listed.status, 200, "{}", listed.text);
        let items = listed.body.as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["target_id"], q);
        assert_eq!(items[0]["vote_type"], "downvote");
    }

    #[tokio::test]
    async fn downvotes_never_cost_the_author_reputation() {
        let app = TestApp::spawn().await;
        let author = app.create_author("author", 1).await;
        let q = app.create_question(&author.token, "Unpopular").await;

        for i in 0..3 {
            let voter = app.create_user(&format!("voter{i}")).await;
            let res = app.vote(&voter.token, "question", q, "downvote").await;
            assert_eq!(res.status, 200, "{}", res.text);
        }

        assert_eq!(app.reputation_of(author.id).await, 0);
    }
}

mod rejections {
    use super::*;

    #[tokio::test]
    async fn author_cannot_vote_on_own_question() {
        let app = TestApp::spawn().await;
        let author = app.create_author("author", 1).await;
        let q = app.create_question(&author.token, "Mine").await;

        let res = app.vote(&author.token, "question", q, "upvote").await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "SELF_VOTE_FORBIDDEN");
        assert_eq!(app.reputation_of(author.id).await, 0);
    }

    #[tokio::test]
    async fn voting_on_a_deleted_question_is_not_found() {
        let app = TestApp::spawn().await;
        let author = app.create_author("author", 1).await;
        let voter = app.create_user("voter").await;
        let q = app.create_question(&author.token, "Gone").await;

        let deleted = app.delete_with_token(&routes::question(q), &author.token).await;
        assert_eq!(deleted.status, 204, "{}", deleted.text);

        let res = app.vote(&voter.token, "question", q, "upvote").await;
        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn deactivated_voter_is_rejected() {
        let app = TestApp::spawn().await;
        let author = app.create_author("author", 1).await;
        let voter = app.create_user("voter").await;
        let q = app.create_question(&author.token, "Closed").await;
        app.deactivate_user(voter.id).await;

        let res = app.vote(&voter.token, "question", q, "upvote").await;

        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn unknown_vote_type_is_a_validation_error() {
        let app = TestApp::spawn().await;
        let author = app.create_author("author", 1).await;
        let voter = app.create_user("voter").await;
        let q = app.create_question(&author.token, "Sideways").await;

        let res = app.vote(&voter.token, "question", q, "sideways").await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}

mod concurrency {
    use super::*;

    #[tokio::test]
    async fn simultaneous_upvotes_are_all_counted() {
        let app = TestApp::spawn().await;
        let author = app.create_author("author", 1).await;
        let q = app.create_question(&author.token, "Popular").await;

        let mut tokens = Vec::new();
        for i in 0..20 {
            tokens.push(app.create_user(&format!("voter{i}")).await.token);
        }

        let mut tasks = JoinSet::new();
        for token in tokens {
            let client = app.client.clone();
            let url = format!("http://{}{}", app.addr, routes::VOTES);
            tasks.spawn(async move {
                client
                    .post(url)
                    .header("Authorization", format!("Bearer {token}"))
                    .json(&serde_json::json!({
                        "target_type": "question",
                        "target_id": q,
                        "vote_type": "upvote",
                    }))
                    .send()
                    .await
                    .expect("Failed to send vote")
                    .status()
                    .as_u16()
            });
        }
        while let Some(status) = tasks.join_next().await {
            assert_eq!(status.unwrap(), 200);
        }

        let state = app
            .get_without_token(&routes::vote_state(VoteTarget::Question, q))
            .await;
        assert_eq!(state.body["upvote_count"], 20);
        assert_eq!(app.reputation_of(author.id).await, 20);

        let rep = app.get_without_token(&routes::reputation(author.id)).await;
        assert_eq!(rep.body["question_vouchers"], 1);
    }

    #[tokio::test]
    async fn simultaneous_requests_from_one_voter_leave_a_single_vote() {
        let app = TestApp::spawn().await;
        let author = app.create_author("author", 1).await;
        let voter = app.create_user("voter").await;
        let q = app.create_question(&author.token, "Racy").await;

        let mut tasks = JoinSet::new();
        for _ in 0..2 {
            let client = app.client.clone();
            let url = format!("http://{}{}", app.addr, routes::VOTES);
            let token = voter.token.clone();
            tasks.spawn(async move {
                client
                    .post(url)
                    .header("Authorization", format!("Bearer {token}"))
                    .json(&serde_json::json!({
                        "target_type": "question",
                        "target_id": q,
                        "vote_type": "upvote",
                    }))
                    .send()
                    .await
                    .expect("Failed to send vote")
                    .status()
                    .as_u16()
            });
        }
        while let Some(status) = tasks.join_next().await {
            assert_eq!(status.unwrap(), 200);
        }

        // Serialized, the two requests toggle the vote on and back off.
        let state = app
            .get_with_token(&routes::vote_state(VoteTarget::Question, q), &voter.token)
            .await;
        assert_eq!(state.body["upvote_count"], 0);
        assert!(state.body["user_vote"].is_null());
        assert_eq!(app.reputation_of(author.id).await, 0);
    }

    #[tokio::test]
    async fn counters_match_vote_rows_after_mixed_concurrent_traffic() {
        let app = TestApp::spawn().await;
        let author = app.create_author("author", 1).await;
        let q = app.create_question(&author.token, "Contested").await;

        let mut tokens = Vec::new();
        for i in 0..8 {
            tokens.push(app.create_user(&format!("voter{i}")).await.token);
        }

        // Each voter fires a burst at once, including repeats of the same request.
        let bursts: [&[&str]; 4] = [
            &["upvote", "downvote", "upvote"],
            &["downvote", "downvote"],
            &["upvote", "upvote", "upvote"],
            &["downvote", "upvote"],
        ];
        let mut tasks = JoinSet::new();
        for (i, token) in tokens.iter().enumerate() {
            for vote_type in bursts[i % bursts.len()] {
                let client = app.client.clone();
                let url = format!("http://{}{}", app.addr, routes::VOTES);
                let token = token.clone();
                let vote_type = vote_type.to_string();
                tasks.spawn(async move {
                    client
                        .post(url)
                        .header("Authorization", format!("Bearer {token}"))
                        .json(&serde_json::json!({
                            "target_type": "question",
                            "target_id": q,
                            "vote_type": vote_type,
                        }))
                        .send()
                        .await
                        .expect("Failed to send vote")
                        .status()
                        .as_u16()
                });
            }
        }
        while let Some(status) = tasks.join_next().await {
            assert_eq!(status.unwrap(), 200);
        }

        let stored = question::Entity::find_by_id(q)
            .one(&app.db)
            .await
            .unwrap()
            .expect("question should exist");
        let upvotes = vote_rows(&app, q, VoteType::Upvote).await;
        let downvotes = vote_rows(&app, q, VoteType::Downvote).await;
        assert_eq!(stored.upvote_count as u64, upvotes);
        assert_eq!(stored.downvote_count as u64, downvotes);

        let all_rows = vote::Entity::find()
            .filter(vote::Column::TargetType.eq(VoteTarget::Question))
            .filter(vote::Column::TargetId.eq(q))
            .all(&app.db)
            .await
            .unwrap();
        assert_eq!(all_rows.len() as u64, upvotes + downvotes);
        let mut voters: Vec<i32> = all_rows.iter().map(|v| v.user_id).collect();
        voters.sort_unstable();
        voters.dedup();
        assert_eq!(voters.len(), all_rows.len(), "at most one vote per voter");

        // Downvotes carry no penalty, so the author's score tracks live upvotes.
        assert_eq!(app.reputation_of(author.id).await, upvotes as i64);
    }
}
