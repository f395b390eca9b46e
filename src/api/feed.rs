use chrono::Utc;
use rocket::{serde::json::Json, Route, State};

use super::body::Body;
use crate::error::Result;
use crate::model::{
    api::{
        question::QuestionView,
        request::{FeedRequest, UserRequest},
    },
    ops,
    question::Question,
    store::Questions,
};
use crate::Config;

pub fn routes() -> Vec<Route> {
    routes![feed, statistics, voted]
}

/// Unseen questions for the user to vote on next.
#[post("/feed", data = "<request>")]
pub async fn feed(
    request: Body<FeedRequest>,
    questions: Questions,
    config: &State<Config>,
) -> Result<Json<Vec<QuestionView>>> {
    let selected = ops::select_feed(
        &*questions,
        &request.user,
        &request.language,
        Utc::now(),
        config.feed_policy(),
    )
    .await?;
    Ok(views(selected))
}

/// The user's own questions with their tallies.
#[post("/statistics", data = "<request>")]
pub async fn statistics(
    request: Body<UserRequest>,
    questions: Questions,
) -> Result<Json<Vec<QuestionView>>> {
    let authored = ops::statistics(&*questions, &request.user).await?;
    Ok(views(authored))
}

/// The questions the user has voted on, with their tallies.
#[post("/voted", data = "<request>")]
pub async fn voted(
    request: Body<UserRequest>,
    questions: Questions,
) -> Result<Json<Vec<QuestionView>>> {
    let questions_voted = ops::voted(&*questions, &request.user).await?;
    Ok(views(questions_voted))
}

fn views(questions: Vec<Question>) -> Json<Vec<QuestionView>> {
    Json(questions.into_iter().map(Into::into).collect())
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration};
    use rocket::{
        http::{ContentType, Status},
        local::asynchronous::Client,
        serde::json::{json, Value},
    };

    use crate::model::{
        question::{Interaction, NewQuestion},
        store::{MemoryStore, QuestionStore},
    };

    use super::*;

    async fn insert(store: &MemoryStore, question: NewQuestion) -> Question {
        store.insert(question).await.unwrap()
    }

    async fn fetch(client: &Client, path: &'static str, body: Value) -> Vec<QuestionView> {
        let response = client
            .post(path)
            .header(ContentType::JSON)
            .body(body.to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        response.into_json().await.unwrap()
    }

    async fn feed_for(client: &Client, user: &str) -> Vec<QuestionView> {
        fetch(client, "/feed", json!({"user": user, "language": "en"})).await
    }

    #[backend_test]
    async fn feed_skips_own_and_foreign_language(client: Client, store: MemoryStore) {
        let now = Utc::now();
        let wanted = insert(&store, NewQuestion::example("alice", now, Duration::hours(2))).await;
        insert(&store, NewQuestion::example("bob", now, Duration::hours(1))).await;
        let mut german = NewQuestion::example("alice", now, Duration::hours(1));
        german.language = "de".to_string();
        insert(&store, german).await;

        let shown = feed_for(&client, "bob").await;
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].id, wanted.id.to_string());
        assert_eq!(shown[0].author, "alice");
    }

    #[backend_test]
    async fn feed_is_ordered_and_capped(client: Client, store: MemoryStore) {
        let now = Utc::now();
        for minutes in (1..=30).rev() {
            insert(&store, NewQuestion::example("alice", now, Duration::minutes(minutes))).await;
        }

        let shown = feed_for(&client, "bob").await;
        assert_eq!(shown.len(), 25);
        let times: Vec<DateTime<Utc>> = shown.iter().map(|q| q.created_at).collect();
        assert!(times.windows(2).all(|pair| pair[0] <= pair[1]));
    }

    #[backend_test]
    async fn feed_drops_stale_and_heavily_reported(client: Client, store: MemoryStore) {
        let now = Utc::now();
        insert(&store, NewQuestion::example("alice", now, Duration::days(11))).await;
        insert(
            &store,
            NewQuestion::example("alice", now, Duration::hours(1))
                .with_users(Interaction::Report, 10),
        )
        .await;
        let tolerated = insert(
            &store,
            NewQuestion::example("alice", now, Duration::hours(1))
                .with_users(Interaction::Report, 10)
                .with_users(Interaction::ChoiceA, 200)
                .with_users(Interaction::ChoiceB, 189),
        )
        .await;

        let shown = feed_for(&client, "bob").await;
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].id, tolerated.id.to_string());
        assert_eq!(shown[0].report_count, 10);
        assert_eq!(shown[0].choice_a_count, 200);
        assert_eq!(shown[0].choice_b_count, 189);
    }

    #[backend_test]
    async fn acting_on_a_question_removes_it_from_the_feed(client: Client, store: MemoryStore) {
        let question = insert(&store, NewQuestion::example("alice", Utc::now(), Duration::zero())).await;
        assert_eq!(feed_for(&client, "bob").await.len(), 1);

        let response = client
            .post("/skip")
            .header(ContentType::JSON)
            .body(json!({"user": "bob", "question": question.id.to_string()}).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());

        assert!(feed_for(&client, "bob").await.is_empty());
        assert_eq!(feed_for(&client, "carol").await.len(), 1);
    }

    #[backend_test]
    async fn feed_requires_a_language(client: Client) {
        let response = client
            .post(uri!(feed))
            .header(ContentType::JSON)
            .body(json!({"user": "bob", "language": ""}).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::BadRequest, response.status());
    }

    #[backend_test]
    async fn statistics_lists_own_questions(client: Client, store: MemoryStore) {
        let now = Utc::now();
        let mine = insert(
            &store,
            NewQuestion::example("alice", now, Duration::days(400))
                .with_users(Interaction::ChoiceB, 3)
                .with_users(Interaction::Skip, 2),
        )
        .await;
        insert(&store, NewQuestion::example("bob", now, Duration::zero())).await;

        let stats = fetch(&client, "/statistics", json!({"user": "alice"})).await;
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].id, mine.id.to_string());
        assert_eq!(stats[0].choice_b_count, 3);
        assert_eq!(stats[0].skip_count, 2);
    }

    #[backend_test]
    async fn voted_lists_voted_questions_only(client: Client, store: MemoryStore) {
        let now = Utc::now();
        let first = insert(&store, NewQuestion::example("alice", now, Duration::zero())).await;
        let second = insert(&store, NewQuestion::example("alice", now, Duration::zero())).await;
        store
            .add_user(first.id, Interaction::ChoiceA, "bob")
            .await
            .unwrap();
        store
            .add_user(second.id, Interaction::Report, "bob")
            .await
            .unwrap();

        let listed = fetch(&client, "/voted", json!({"user": "bob"})).await;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, first.id.to_string());
        assert_eq!(listed[0].choice_a_count, 1);
    }
}
