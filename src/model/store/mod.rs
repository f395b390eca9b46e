//! The storage collaborator behind every question operation.

use std::sync::Arc;

use rocket::{
    http::Status,
    request::{self, FromRequest, Request},
};

use crate::error::Result;
use crate::model::{
    feed::FeedQuery,
    mongodb::Id,
    question::{Interaction, NewQuestion, Question},
};

mod memory;
mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

/// A document store holding questions.
///
/// Implementations must make [`QuestionStore::add_user`] atomic per question,
/// so that concurrent votes, reports and skips never overwrite each other.
#[rocket::async_trait]
pub trait QuestionStore: Send + Sync {
    /// Insert a new question, returning it with its freshly assigned ID.
    async fn insert(&self, question: NewQuestion) -> Result<Question>;

    /// All questions admitted by the query, oldest first, at most one batch.
    async fn feed(&self, query: &FeedQuery<'_>) -> Result<Vec<Question>>;

    /// All questions submitted by the given user.
    async fn authored_by(&self, user: &str) -> Result<Vec<Question>>;

    /// All questions the given user voted on.
    async fn voted_by(&self, user: &str) -> Result<Vec<Question>>;

    /// Add the user to the set backing the interaction.
    ///
    /// Adding a user twice is a no-op, as is a second vote on either option.
    /// Fails with `NotFound` if no question has the given ID.
    async fn add_user(&self, id: Id, interaction: Interaction, user: &str) -> Result<()>;

    /// Remove every question. Returns how many were removed.
    async fn clear(&self) -> Result<u64>;
}

/// A shareable handle on the configured question store.
#[derive(Clone)]
pub struct Questions(Arc<dyn QuestionStore>);

impl Questions {
    pub fn new(store: impl QuestionStore + 'static) -> Self {
        Self(Arc::new(store))
    }
}

impl std::ops::Deref for Questions {
    type Target = dyn QuestionStore;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

impl From<MemoryStore> for Questions {
    fn from(store: MemoryStore) -> Self {
        Self::new(store)
    }
}

impl From<MongoStore> for Questions {
    fn from(store: MongoStore) -> Self {
        Self::new(store)
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Questions {
    type Error = ();

    /// Get the store from the managed state.
    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        match req.rocket().state::<Questions>() {
            Some(questions) => request::Outcome::Success(questions.clone()),
            None => {
                log::error!("No question store is managed by the server");
                request::Outcome::Error((Status::InternalServerError, ()))
            }
        }
    }
}
