//! The operations behind each endpoint, independent of HTTP.
//!
//! Every operation touches at most one question and performs a single store
//! round-trip. Time is passed in rather than read, so callers decide what
//! "now" is.

use chrono::{DateTime, Utc};
use log::debug;

use crate::error::Result;
use crate::model::{
    feed::{FeedPolicy, FeedQuery},
    mongodb::Id,
    question::{required, Choice, Interaction, NewQuestion, Question},
    store::QuestionStore,
};

/// Submit a new question on behalf of `author`.
pub async fn submit_question(
    store: &dyn QuestionStore,
    author: &str,
    option_a: &str,
    option_b: &str,
    language: &str,
    now: DateTime<Utc>,
    max_option_length: usize,
) -> Result<Question> {
    let question = NewQuestion::new(author, option_a, option_b, language, now, max_option_length)?;
    let question = store.insert(question).await?;
    debug!("Question {} submitted by {author}", question.id);
    Ok(question)
}

/// The questions `user` should be shown next in `language`.
pub async fn select_feed(
    store: &dyn QuestionStore,
    user: &str,
    language: &str,
    now: DateTime<Utc>,
    policy: FeedPolicy,
) -> Result<Vec<Question>> {
    let user = required("user", user)?;
    let language = required("language", language)?;
    store
        .feed(&FeedQuery::new(user, language, now, policy))
        .await
}

/// Record `user`'s vote for one option.
pub async fn record_choice(
    store: &dyn QuestionStore,
    question: &str,
    user: &str,
    choice: Choice,
) -> Result<()> {
    record(store, question, user, choice.into()).await
}

/// Record that `user` flagged the question as low quality.
pub async fn record_report(store: &dyn QuestionStore, question: &str, user: &str) -> Result<()> {
    record(store, question, user, Interaction::Report).await
}

/// Record that `user` passed on the question.
pub async fn record_skip(store: &dyn QuestionStore, question: &str, user: &str) -> Result<()> {
    record(store, question, user, Interaction::Skip).await
}

async fn record(
    store: &dyn QuestionStore,
    question: &str,
    user: &str,
    interaction: Interaction,
) -> Result<()> {
    let user = required("user", user)?;
    let id: Id = required("question", question)?.parse()?;
    store.add_user(id, interaction, user).await
}

/// The questions submitted by `user`.
pub async fn statistics(store: &dyn QuestionStore, user: &str) -> Result<Vec<Question>> {
    store.authored_by(required("user", user)?).await
}

/// The questions `user` has voted on.
pub async fn voted(store: &dyn QuestionStore, user: &str) -> Result<Vec<Question>> {
    store.voted_by(required("user", user)?).await
}
