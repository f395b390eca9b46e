use chrono::{DateTime, Duration, Utc};
use mongodb::{
    bson::{doc, Document},
    options::FindOptions,
};

use crate::model::question::{Interaction, QuestionCore};

/// Tunable parameters of feed selection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeedPolicy {
    /// Only questions at most this old are shown.
    pub recency_window: Duration,
    /// Below this many reports a question is always shown.
    pub report_floor: u32,
    /// Once at the floor, a question is shown only while
    /// `reports / (votes + 1)` stays below this ratio.
    pub report_ratio: f64,
    /// Maximum number of questions per feed.
    pub batch_size: u32,
}

impl Default for FeedPolicy {
    fn default() -> Self {
        Self {
            recency_window: Duration::days(10),
            report_floor: 10,
            report_ratio: 0.05,
            batch_size: 25,
        }
    }
}

impl FeedPolicy {
    /// Does the question's report history pass the quality gate?
    pub fn passes_quality_gate(&self, question: &QuestionCore) -> bool {
        let reports = question.reporters.len();
        if reports < self.report_floor as usize {
            return true;
        }
        let ratio = reports as f64 / (question.vote_count() + 1) as f64;
        ratio < self.report_ratio
    }
}

/// A request for the feed of one user, evaluated at a fixed instant.
#[derive(Debug, Clone)]
pub struct FeedQuery<'a> {
    pub user: &'a str,
    pub language: &'a str,
    pub now: DateTime<Utc>,
    pub policy: FeedPolicy,
}

impl<'a> FeedQuery<'a> {
    pub fn new(user: &'a str, language: &'a str, now: DateTime<Utc>, policy: FeedPolicy) -> Self {
        Self {
            user,
            language,
            now,
            policy,
        }
    }

    /// The oldest creation time still inside the recency window.
    pub fn not_before(&self) -> DateTime<Utc> {
        self.now - self.policy.recency_window
    }

    /// Is this question eligible for the user's feed?
    pub fn admits(&self, question: &QuestionCore) -> bool {
        question.author != self.user
            && question.language == self.language
            && question.created_at >= self.not_before()
            && !question.has_seen(self.user)
            && self.policy.passes_quality_gate(question)
    }

    /// The eligibility predicate as a MongoDB filter.
    pub fn filter(&self) -> Document {
        let mut filter = doc! {
            "author": { "$ne": self.user },
            "language": self.language,
            "created_at": { "$gte": self.not_before().timestamp() },
        };
        for interaction in Interaction::ALL {
            filter.insert(interaction.field(), doc! { "$ne": self.user });
        }

        let reports = doc! { "$size": { "$ifNull": ["$reporters", []] } };
        let votes = doc! {
            "$add": [
                { "$size": { "$ifNull": ["$choice_a_voters", []] } },
                { "$size": { "$ifNull": ["$choice_b_voters", []] } },
                1,
            ]
        };
        filter.insert(
            "$expr",
            doc! {
                "$or": [
                    { "$lt": [reports.clone(), i64::from(self.policy.report_floor)] },
                    { "$lt": [{ "$divide": [reports, votes] }, self.policy.report_ratio] },
                ]
            },
        );
        filter
    }

    /// Oldest first, capped at the batch size.
    pub fn options(&self) -> FindOptions {
        FindOptions::builder()
            .sort(doc! { "created_at": 1 })
            .limit(i64::from(self.policy.batch_size))
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::TimeZone;
    use mongodb::bson::Bson;

    fn now() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    fn query(user: &str) -> FeedQuery<'_> {
        FeedQuery::new(user, "en", now(), FeedPolicy::default())
    }

    fn fresh(author: &str) -> QuestionCore {
        QuestionCore::example(author, now(), Duration::hours(1))
    }

    #[test]
    fn own_questions_are_excluded() {
        assert!(!query("alice").admits(&fresh("alice")));
        assert!(query("bob").admits(&fresh("alice")));
    }

    #[test]
    fn language_must_match_exactly() {
        let mut question = fresh("alice");
        question.language = "EN".to_string();
        assert!(!query("bob").admits(&question));
    }

    #[test]
    fn recency_window_is_inclusive() {
        let window = FeedPolicy::default().recency_window;

        let at_edge = QuestionCore::example("alice", now(), window);
        assert!(query("bob").admits(&at_edge));

        let just_outside = QuestionCore::example("alice", now(), window + Duration::seconds(1));
        assert!(!query("bob").admits(&just_outside));
    }

    #[test]
    fn any_interaction_hides_the_question() {
        for interaction in Interaction::ALL {
            let mut question = fresh("alice");
            question.record(interaction, "bob");
            assert!(!query("bob").admits(&question), "{interaction:?}");
            assert!(query("carol").admits(&question), "{interaction:?}");
        }
    }

    #[test]
    fn few_reports_always_pass() {
        let question = fresh("alice").with_users(Interaction::Report, 9);
        assert!(query("bob").admits(&question));
    }

    #[test]
    fn many_reports_pass_with_enough_votes() {
        let question = fresh("alice")
            .with_users(Interaction::Report, 10)
            .with_users(Interaction::ChoiceA, 200)
            .with_users(Interaction::ChoiceB, 189);
        assert!(query("bob").admits(&question));
    }

    #[test]
    fn many_reports_without_votes_fail() {
        let question = fresh("alice").with_users(Interaction::Report, 10);
        assert!(!query("bob").admits(&question));
    }

    #[test]
    fn ratio_gate_is_strict() {
        // 10 / (199 + 1) is exactly the ratio, which is not below it.
        let question = fresh("alice")
            .with_users(Interaction::Report, 10)
            .with_users(Interaction::ChoiceA, 199);
        assert!(!FeedPolicy::default().passes_quality_gate(&question));
    }

    #[test]
    fn filter_uses_the_written_field_names() {
        let filter = query("bob").filter();
        for interaction in Interaction::ALL {
            assert_eq!(
                filter.get_document(interaction.field()).unwrap(),
                &doc! { "$ne": "bob" }
            );
        }
        assert_eq!(filter.get_document("author").unwrap(), &doc! { "$ne": "bob" });
        assert_eq!(filter.get_str("language").unwrap(), "en");
        assert_eq!(
            filter.get_document("created_at").unwrap(),
            &doc! { "$gte": (now() - Duration::days(10)).timestamp() }
        );
        assert!(filter.get_document("$expr").unwrap().contains_key("$or"));
        assert!(!filter.contains_key("$where"));
    }

    #[test]
    fn options_sort_oldest_first_and_cap() {
        let options = query("bob").options();
        assert_eq!(options.sort, Some(doc! { "created_at": 1 }));
        assert_eq!(options.limit, Some(25));
    }

    #[test]
    fn ratio_is_rendered_as_a_double() {
        let filter = query("bob").filter();
        let or = filter
            .get_document("$expr")
            .unwrap()
            .get_array("$or")
            .unwrap();
        let ratio_clause = or[1].as_document().unwrap().get_array("$lt").unwrap();
        assert_eq!(ratio_clause[1], Bson::Double(0.05));
    }
}
