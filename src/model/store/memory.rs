use std::sync::Arc;

use rocket::tokio::sync::RwLock;

use crate::error::{Error, Result};
use crate::model::{
    feed::FeedQuery,
    mongodb::Id,
    question::{Interaction, NewQuestion, Question},
};

use super::QuestionStore;

/// Questions kept in process memory, in insertion order.
///
/// Used by the test suite and for running the server without a database.
/// Clones share the same questions.
#[derive(Clone, Default)]
pub struct MemoryStore {
    questions: Arc<RwLock<Vec<Question>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a single question.
    pub async fn get(&self, id: Id) -> Option<Question> {
        self.questions
            .read()
            .await
            .iter()
            .find(|question| question.id == id)
            .cloned()
    }

    /// Number of stored questions.
    pub async fn len(&self) -> usize {
        self.questions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn matching(&self, predicate: impl Fn(&Question) -> bool) -> Vec<Question> {
        self.questions
            .read()
            .await
            .iter()
            .filter(|question| predicate(question))
            .cloned()
            .collect()
    }
}

#[rocket::async_trait]
impl QuestionStore for MemoryStore {
    async fn insert(&self, question: NewQuestion) -> Result<Question> {
        let question = Question::new(Id::new(), question);
        self.questions.write().await.push(question.clone());
        Ok(question)
    }

    async fn feed(&self, query: &FeedQuery<'_>) -> Result<Vec<Question>> {
        let mut feed = self.matching(|question| query.admits(question)).await;
        // Stable, so equal timestamps keep insertion order.
        feed.sort_by_key(|question| question.created_at);
        feed.truncate(query.policy.batch_size as usize);
        Ok(feed)
    }

    async fn authored_by(&self, user: &str) -> Result<Vec<Question>> {
        Ok(self.matching(|question| question.author == user).await)
    }

    async fn voted_by(&self, user: &str) -> Result<Vec<Question>> {
        Ok(self.matching(|question| question.has_voted(user)).await)
    }

    async fn add_user(&self, id: Id, interaction: Interaction, user: &str) -> Result<()> {
        let mut questions = self.questions.write().await;
        let question = questions
            .iter_mut()
            .find(|question| question.id == id)
            .ok_or_else(|| Error::not_found(format!("Question with ID '{id}'")))?;
        question.record(interaction, user);
        Ok(())
    }

    async fn clear(&self) -> Result<u64> {
        let mut questions = self.questions.write().await;
        let removed = questions.len() as u64;
        questions.clear();
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{DateTime, Duration, TimeZone, Utc};

    use crate::model::feed::FeedPolicy;

    fn now() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    fn query(user: &str) -> FeedQuery<'_> {
        FeedQuery::new(user, "en", now(), FeedPolicy::default())
    }

    async fn insert_aged(store: &MemoryStore, author: &str, hours: i64) -> Question {
        store
            .insert(NewQuestion::example(author, now(), Duration::hours(hours)))
            .await
            .unwrap()
    }

    #[rocket::async_test]
    async fn insert_assigns_distinct_ids() {
        let store = MemoryStore::new();
        let first = insert_aged(&store, "alice", 1).await;
        let second = insert_aged(&store, "alice", 1).await;
        assert_ne!(first.id, second.id);
        assert_eq!(store.get(first.id).await, Some(first));
        assert_eq!(store.len().await, 2);
    }

    #[rocket::async_test]
    async fn feed_is_oldest_first() {
        let store = MemoryStore::new();
        for hours in [3, 30, 1, 12, 7] {
            insert_aged(&store, "alice", hours).await;
        }

        let feed = store.feed(&query("bob")).await.unwrap();
        assert_eq!(feed.len(), 5);
        assert!(feed
            .windows(2)
            .all(|pair| pair[0].created_at <= pair[1].created_at));
        assert_eq!(feed[0].created_at, now() - Duration::hours(30));
    }

    #[rocket::async_test]
    async fn feed_is_capped_at_the_batch_size() {
        let store = MemoryStore::new();
        for hours in 0..40 {
            insert_aged(&store, "alice", hours).await;
        }

        let feed = store.feed(&query("bob")).await.unwrap();
        assert_eq!(feed.len(), 25);
        // The oldest 25 of them.
        assert_eq!(feed[0].created_at, now() - Duration::hours(39));
        assert_eq!(feed[24].created_at, now() - Duration::hours(15));
    }

    #[rocket::async_test]
    async fn exclusion_is_monotonic() {
        let store = MemoryStore::new();
        let question = insert_aged(&store, "alice", 1).await;

        for interaction in Interaction::ALL {
            store.add_user(question.id, interaction, "bob").await.unwrap();
            assert!(store.feed(&query("bob")).await.unwrap().is_empty());
            assert_eq!(store.feed(&query("carol")).await.unwrap().len(), 1);
        }
    }

    #[rocket::async_test]
    async fn reports_are_idempotent() {
        let store = MemoryStore::new();
        let question = insert_aged(&store, "alice", 1).await;

        store
            .add_user(question.id, Interaction::Report, "bob")
            .await
            .unwrap();
        let once = store.get(question.id).await.unwrap().reporters.clone();
        store
            .add_user(question.id, Interaction::Report, "bob")
            .await
            .unwrap();
        let twice = store.get(question.id).await.unwrap().reporters.clone();
        assert_eq!(once, twice);
        assert_eq!(twice.len(), 1);
    }

    #[rocket::async_test]
    async fn second_vote_is_ignored() {
        let store = MemoryStore::new();
        let question = insert_aged(&store, "alice", 1).await;

        store
            .add_user(question.id, Interaction::ChoiceB, "bob")
            .await
            .unwrap();
        store
            .add_user(question.id, Interaction::ChoiceA, "bob")
            .await
            .unwrap();

        let stored = store.get(question.id).await.unwrap();
        assert!(stored.choice_a_voters.is_empty());
        assert!(stored.choice_b_voters.contains("bob"));
    }

    #[rocket::async_test]
    async fn unknown_question_is_not_found() {
        let store = MemoryStore::new();
        let result = store.add_user(Id::new(), Interaction::Skip, "bob").await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[rocket::async_test]
    async fn authored_and_voted_lookups() {
        let store = MemoryStore::new();
        let by_alice = insert_aged(&store, "alice", 1).await;
        let by_carol = insert_aged(&store, "carol", 1).await;
        store
            .add_user(by_carol.id, Interaction::ChoiceA, "alice")
            .await
            .unwrap();
        store
            .add_user(by_alice.id, Interaction::Skip, "carol")
            .await
            .unwrap();

        let authored = store.authored_by("alice").await.unwrap();
        assert_eq!(authored.len(), 1);
        assert_eq!(authored[0].id, by_alice.id);

        let voted = store.voted_by("alice").await.unwrap();
        assert_eq!(voted.len(), 1);
        assert_eq!(voted[0].id, by_carol.id);

        // Skipping is not voting.
        assert!(store.voted_by("carol").await.unwrap().is_empty());
    }

    #[rocket::async_test]
    async fn clear_removes_everything() {
        let store = MemoryStore::new();
        insert_aged(&store, "alice", 1).await;
        insert_aged(&store, "alice", 2).await;

        assert_eq!(store.clear().await.unwrap(), 2);
        assert!(store.is_empty().await);
        assert_eq!(store.clear().await.unwrap(), 0);
    }
}
