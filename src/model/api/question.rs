use chrono::{serde::ts_seconds, DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::question::Question;

/// API-friendly representation of a question, with anonymous tallies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionView {
    pub id: String,
    pub author: String,
    pub option_a: String,
    pub option_b: String,
    pub language: String,
    #[serde(with = "ts_seconds")]
    pub created_at: DateTime<Utc>,
    pub choice_a_count: usize,
    pub choice_b_count: usize,
    pub report_count: usize,
    pub skip_count: usize,
}

impl From<Question> for QuestionView {
    fn from(question: Question) -> Self {
        let id = question.id.to_string();
        let core = question.question;
        Self {
            id,
            choice_a_count: core.choice_a_voters.len(),
            choice_b_count: core.choice_b_voters.len(),
            report_count: core.reporters.len(),
            skip_count: core.skippers.len(),
            author: core.author,
            option_a: core.option_a,
            option_b: core.option_b,
            language: core.language,
            created_at: core.created_at,
        }
    }
}
