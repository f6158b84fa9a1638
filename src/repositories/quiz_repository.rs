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
    models::domain::Quiz,
};

#[async_trait]
pub trait QuizRepository: Send + Sync {
    async fn create(&self, quiz: Quiz) -> AppResult<Quiz>;
    /// Looks a quiz up by path, deleted or not.
    async fn find_by_path(&self, path: &str) -> AppResult<Option<Quiz>>;
    /// Non-deleted quizzes owned by `user_id`, newest first.
    async fn list_live_by_user(&self, user_id: &str) -> AppResult<Vec<Quiz>>;
    async fn update_title(&self, id: &str, title: &str, updated_at: DateTime<Utc>)
        -> AppResult<()>;
    async fn soft_delete(&self, id: &str, deleted_at: DateTime<Utc>) -> AppResult<()>;
    async fn ensure_indexes(&self) -> AppResult<()>;
}

pub struct MongoQuizRepository {
    collection: Collection<Quiz>,
}

impl MongoQuizRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection("quizzes");
        Self { collection }
    }
}

#[async_trait]
impl QuizRepository for MongoQuizRepository {
    async fn create(&self, quiz: Quiz) -> AppResult<Quiz> {
        self.collection.insert_one(&quiz).await?;
        Ok(quiz)
    }

    async fn find_by_path(&self, path: &str) -> AppResult<Option<Quiz>> {
        let quiz = self.collection.find_one(doc! { "path": path }).await?;
        Ok(quiz)
    }

    async fn list_live_by_user(&self, user_id: &str) -> AppResult<Vec<Quiz>> {
        let find_options = FindOptions::builder()
            .sort(doc! { "created_at": -1 })
            .build();

        let cursor = self
            .collection
            .find(doc! { "user_id": user_id, "deleted_at": null })
            .with_options(find_options)
            .await?;
        let items: Vec<Quiz> = cursor.try_collect().await?;

        Ok(items)
    }

    async fn update_title(
        &self,
        id: &str,
        title: &str,
        updated_at: DateTime<Utc>,
    ) -> AppResult<()> {
        let result = self
            .collection
            .update_one(
                doc! { "id": id },
                doc! { "$set": { "title": title, "updated_at": to_bson(&updated_at)? } },
            )
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!("Quiz with id '{}' not found", id)));
        }
        Ok(())
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
            return Err(AppError::NotFound(format!("Quiz with id '{}' not found", id)));
        }
        Ok(())
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for quizzes collection");

        for field in ["id", "path"] {
            let model = IndexModel::builder()
                .keys(doc! { field: 1 })
                .options(
                    IndexOptions::builder()
                        .unique(true)
                        .name(format!("{}_unique", field))
                        .build(),
                )
                .build();
            self.collection.create_index(model).await?;
        }

        let owner_index = IndexModel::builder().keys(doc! { "user_id": 1 }).build();
        self.collection.create_index(owner_index).await?;

        log::info!("Successfully created indexes for quizzes collection");
        Ok(())
    }
}
