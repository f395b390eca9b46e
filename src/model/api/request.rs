//! Request bodies accepted by the API, as JSON or as form fields.

use rocket::FromForm;
use serde::{Deserialize, Serialize};

use crate::model::question::Choice;

/// A new question to submit.
#[derive(Debug, Clone, Deserialize, Serialize, FromForm)]
#[serde(rename_all = "camelCase")]
pub struct SubmitQuestion {
    pub user: String,
    #[field(name = "optionA")]
    pub option_a: String,
    #[field(name = "optionB")]
    pub option_b: String,
    pub language: String,
}

/// A request for a user's feed in one language.
#[derive(Debug, Clone, Deserialize, Serialize, FromForm)]
pub struct FeedRequest {
    pub user: String,
    pub language: String,
}

/// A request concerning a single user.
#[derive(Debug, Clone, Deserialize, Serialize, FromForm)]
pub struct UserRequest {
    pub user: String,
}

/// A user acting on a question: reporting or skipping it.
#[derive(Debug, Clone, Deserialize, Serialize, FromForm)]
pub struct QuestionAction {
    pub user: String,
    /// Hex ID of the question.
    pub question: String,
}

/// A user voting for one option of a question.
#[derive(Debug, Clone, Deserialize, Serialize, FromForm)]
pub struct VoteRequest {
    pub user: String,
    pub question: String,
    pub choice: Choice,
}
