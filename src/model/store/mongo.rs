use mongodb::{bson::doc, Database};
use rocket::futures::TryStreamExt;

use crate::error::{Error, Result};
use crate::model::{
    feed::FeedQuery,
    mongodb::{Coll, Id},
    question::{Interaction, NewQuestion, Question},
};

use super::QuestionStore;

/// Questions kept in a MongoDB collection.
///
/// Cloning is cheap; all clones share the client's connection pool.
#[derive(Clone)]
pub struct MongoStore {
    questions: Coll<Question>,
}

impl MongoStore {
    pub fn new(db: &Database) -> Self {
        Self {
            questions: Coll::from_db(db),
        }
    }
}

#[rocket::async_trait]
impl QuestionStore for MongoStore {
    async fn insert(&self, question: NewQuestion) -> Result<Question> {
        let question = Question::new(Id::new(), question);
        self.questions.insert_one(&question, None).await?;
        Ok(question)
    }

    async fn feed(&self, query: &FeedQuery<'_>) -> Result<Vec<Question>> {
        let questions: Vec<Question> = self
            .questions
            .find(query.filter(), query.options())
            .await?
            .try_collect()
            .await?;
        Ok(questions)
    }

    async fn authored_by(&self, user: &str) -> Result<Vec<Question>> {
        let questions: Vec<Question> = self
            .questions
            .find(doc! { "author": user }, None)
            .await?
            .try_collect()
            .await?;
        Ok(questions)
    }

    async fn voted_by(&self, user: &str) -> Result<Vec<Question>> {
        let (a, b) = (Interaction::ChoiceA.field(), Interaction::ChoiceB.field());
        let filter = doc! {
            "$or": [{ a: user }, { b: user }]
        };
        let questions: Vec<Question> = self
            .questions
            .find(filter, None)
            .await?
            .try_collect()
            .await?;
        Ok(questions)
    }

    async fn add_user(&self, id: Id, interaction: Interaction, user: &str) -> Result<()> {
        let mut filter = id.as_doc();
        if interaction.is_vote() {
            // Only the first vote of a user counts.
            filter.insert(Interaction::ChoiceA.field(), doc! { "$ne": user });
            filter.insert(Interaction::ChoiceB.field(), doc! { "$ne": user });
        }
        let field = interaction.field();
        let update = doc! {
            "$addToSet": { field: user }
        };

        let result = self.questions.update_one(filter, update, None).await?;
        if result.matched_count > 0 {
            return Ok(());
        }

        // Nothing matched: either an earlier vote excluded it, or there is no such question.
        let exists = self.questions.count_documents(id.as_doc(), None).await? > 0;
        if exists {
            Ok(())
        } else {
            Err(Error::not_found(format!("Question with ID '{id}'")))
        }
    }

    async fn clear(&self) -> Result<u64> {
        let result = self.questions.delete_many(doc! {}, None).await?;
        Ok(result.deleted_count)
    }
}
