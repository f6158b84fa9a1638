use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, to_bson},
    options::{FindOptions, IndexOptions},
    Collection, IndexModel,
};

use crate::{
    db::Database,
    errors::{AppError, AppResult},
    models::domain::QuizQuestion,
};

#[async_trait]
pub trait QuestionRepository: Send + Sync {
    async fn create(&self, question: QuizQuestion) -> AppResult<QuizQuestion>;
    /// Counts every question ever added to the quiz, deleted ones included,
    /// so numbers are never reused.
    async fn count_in_quiz(&self, quiz_id: &str) -> AppResult<i64>;
    async fn find_by_number(&self, quiz_id: &str, number: i64) -> AppResult<Option<QuizQuestion>>;
    /// Non-deleted questions ordered by number.
    async fn list_live_in_quiz(&self, quiz_id: &str) -> AppResult<Vec<QuizQuestion>>;
    async fn soft_delete(&self, id: &str, deleted_at: DateTime<Utc>) -> AppResult<()>;
    async fn ensure_indexes(&self) -> AppResult<()>;
}

pub struct MongoQuestionRepository {
    collection: Collection<QuizQuestion>,
}

impl MongoQuestionRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection("questions");
        Self { collection }
    }
}

#[async_trait]
impl QuestionRepository for MongoQuestionRepository {
    async fn create(&self, question: QuizQuestion) -> AppResult<QuizQuestion> {
        self.collection.insert_one(&question).await?;
        Ok(question)
    }

    async fn count_in_quiz(&self, quiz_id: &str) -> AppResult<i64> {
        let count = self
            .collection
            .count_documents(doc! { "quiz_id": quiz_id })
            .await?;
        Ok(count as i64)
    }

    async fn find_by_number(&self, quiz_id: &str, number: i64) -> AppResult<Option<QuizQuestion>> {
        let question = self
            .collection
            .find_one(doc! { "quiz_id": quiz_id, "question_number": number })
            .await?;
        Ok(question)
    }

    async fn list_live_in_quiz(&self, quiz_id: &str) -> AppResult<Vec<QuizQuestion>> {
        let find_options = FindOptions::builder()
            .sort(doc! { "question_number": 1 })
            .build();

        let cursor = self
            .collection
            .find(doc! { "quiz_id": quiz_id, "deleted_at": null })
            .with_options(find_options)
            .await?;
        let items: Vec<QuizQuestion> = cursor.try_collect().await?;

        Ok(items)
    }

    async fn soft_delete(&self, id: &str, deleted_at: DateTime<Utc>) -> AppResult<()> {
        let stamp = to_bson(&deleted_at)?;
        let result = self
            .collection
            .update_one(
                doc! { "id": id },
                doc! { "$set": { "deleted_at": stamp.clone(), "updated_at": stamp } },
            )
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!("Question with id '{}' not found", id)));
        }
        Ok(())
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        let number_index = IndexModel::builder()
            .keys(doc! { "quiz_id": 1, "question_number": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("quiz_number_unique".to_string())
                    .build(),
            )
            .build();
        self.collection.create_index(number_index).await?;
        log::info!("Created unique index on questions.(quiz_id, question_number)");

        Ok(())
    }
}
