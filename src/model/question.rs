use std::collections::BTreeSet;
use std::ops::{Deref, DerefMut};

use chrono::{serde::ts_seconds, DateTime, Utc};
use rocket::FromFormField;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::mongodb::Id;

/// Core either/or question data, as stored in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionCore {
    /// Opaque identifier of the user who submitted the question.
    pub author: String,
    pub option_a: String,
    pub option_b: String,
    /// Tag partitioning the question pool; matched exactly.
    pub language: String,
    #[serde(with = "ts_seconds")]
    pub created_at: DateTime<Utc>,
    /// Users who picked option A.
    #[serde(default)]
    pub choice_a_voters: BTreeSet<String>,
    /// Users who picked option B.
    #[serde(default)]
    pub choice_b_voters: BTreeSet<String>,
    /// Users who flagged the question as low quality.
    #[serde(default)]
    pub reporters: BTreeSet<String>,
    /// Users who passed on the question without voting.
    #[serde(default)]
    pub skippers: BTreeSet<String>,
}

impl QuestionCore {
    /// Create a new question with empty voter sets.
    ///
    /// Both options are truncated to `max_option_length` characters. Fails if
    /// any field is empty, or if an option is blank once truncated.
    pub fn new(
        author: &str,
        option_a: &str,
        option_b: &str,
        language: &str,
        created_at: DateTime<Utc>,
        max_option_length: usize,
    ) -> Result<Self> {
        let author = required("user", author)?;
        let option_a = truncate(option_a, max_option_length);
        required("optionA", &option_a)?;
        let option_b = truncate(option_b, max_option_length);
        required("optionB", &option_b)?;
        let language = required("language", language)?;

        Ok(Self {
            author: author.to_string(),
            option_a,
            option_b,
            language: language.to_string(),
            created_at,
            choice_a_voters: BTreeSet::new(),
            choice_b_voters: BTreeSet::new(),
            reporters: BTreeSet::new(),
            skippers: BTreeSet::new(),
        })
    }

    /// The set of users recorded for the given interaction.
    pub fn users(&self, interaction: Interaction) -> &BTreeSet<String> {
        match interaction {
            Interaction::ChoiceA => &self.choice_a_voters,
            Interaction::ChoiceB => &self.choice_b_voters,
            Interaction::Report => &self.reporters,
            Interaction::Skip => &self.skippers,
        }
    }

    fn users_mut(&mut self, interaction: Interaction) -> &mut BTreeSet<String> {
        match interaction {
            Interaction::ChoiceA => &mut self.choice_a_voters,
            Interaction::ChoiceB => &mut self.choice_b_voters,
            Interaction::Report => &mut self.reporters,
            Interaction::Skip => &mut self.skippers,
        }
    }

    /// Has this user voted for either option?
    pub fn has_voted(&self, user: &str) -> bool {
        self.choice_a_voters.contains(user) || self.choice_b_voters.contains(user)
    }

    /// Has this user voted on, reported, or skipped this question?
    pub fn has_seen(&self, user: &str) -> bool {
        Interaction::ALL
            .iter()
            .any(|&interaction| self.users(interaction).contains(user))
    }

    /// Record an interaction. A user votes at most once, so a second vote
    /// (for either option) is ignored. Returns whether anything changed.
    pub fn record(&mut self, interaction: Interaction, user: &str) -> bool {
        if interaction.is_vote() && self.has_voted(user) {
            return false;
        }
        self.users_mut(interaction).insert(user.to_string())
    }

    /// Total number of votes cast on either option.
    pub fn vote_count(&self) -> usize {
        self.choice_a_voters.len() + self.choice_b_voters.len()
    }
}

/// A question without an ID.
pub type NewQuestion = QuestionCore;

/// A question from the database, with its unique ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub question: QuestionCore,
}

impl Question {
    pub fn new(id: Id, question: NewQuestion) -> Self {
        Self { id, question }
    }
}

impl Deref for Question {
    type Target = QuestionCore;

    fn deref(&self) -> &Self::Target {
        &self.question
    }
}

impl DerefMut for Question {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.question
    }
}

/// The ways a user can act on a question, each backed by its own user set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Interaction {
    ChoiceA,
    ChoiceB,
    Report,
    Skip,
}

impl Interaction {
    pub const ALL: [Interaction; 4] = [
        Interaction::ChoiceA,
        Interaction::ChoiceB,
        Interaction::Report,
        Interaction::Skip,
    ];

    /// Name of the database field holding the user set.
    pub fn field(self) -> &'static str {
        match self {
            Self::ChoiceA => "choice_a_voters",
            Self::ChoiceB => "choice_b_voters",
            Self::Report => "reporters",
            Self::Skip => "skippers",
        }
    }

    pub fn is_vote(self) -> bool {
        matches!(self, Self::ChoiceA | Self::ChoiceB)
    }
}

/// One of the two options of an either/or question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, FromFormField)]
pub enum Choice {
    A,
    B,
}

impl From<Choice> for Interaction {
    fn from(choice: Choice) -> Self {
        match choice {
            Choice::A => Interaction::ChoiceA,
            Choice::B => Interaction::ChoiceB,
        }
    }
}

/// Reject empty or whitespace-only values of a required field.
pub fn required<'a>(field: &str, value: &'a str) -> Result<&'a str> {
    if value.trim().is_empty() {
        Err(Error::invalid_input(format!("`{field}` must not be empty")))
    } else {
        Ok(value)
    }
}

fn truncate(value: &str, max_chars: usize) -> String {
    value.chars().take(max_chars).collect()
}
