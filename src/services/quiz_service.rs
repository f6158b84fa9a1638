use std::{sync::Arc, time::Duration};

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::guard::check_not_deleted,
    db::with_deadline,
    errors::{AppError, AppResult},
    models::{
        domain::{quiz::generate_path, Quiz, QuizQuestion},
        dto::request::{CreateQuestionRequest, CreateQuizRequest, UpdateQuizTitleRequest},
    },
    repositories::{QuestionRepository, QuizRepository},
};

const MAX_INSERT_ATTEMPTS: usize = 3;

/// Quiz and question storage rules. Authorization happens in the handlers,
/// between `resolve` and the mutation.
pub struct QuizService {
    quizzes: Arc<dyn QuizRepository>,
    questions: Arc<dyn QuestionRepository>,
    store_timeout: Duration,
}

impl QuizService {
    pub fn new(
        quizzes: Arc<dyn QuizRepository>,
        questions: Arc<dyn QuestionRepository>,
        store_timeout: Duration,
    ) -> Self {
        Self {
            quizzes,
            questions,
            store_timeout,
        }
    }

    /// Creates a quiz under a fresh random path, retrying on the rare path
    /// collision.
    pub async fn create_quiz(&self, owner: Uuid, request: CreateQuizRequest) -> AppResult<Quiz> {
        request.validate()?;
        let owner = owner.to_string();

        for attempt in 1..=MAX_INSERT_ATTEMPTS {
            let quiz = Quiz::new(&owner, request.title.trim(), generate_path()?);
            match with_deadline(self.store_timeout, self.quizzes.create(quiz)).await {
                Ok(quiz) => {
                    log::info!("User {} created quiz {}", owner, quiz.id);
                    return Ok(quiz);
                }
                Err(AppError::AlreadyExists(_)) => {
                    log::warn!("Quiz path collision on attempt {}", attempt);
                }
                Err(e) => return Err(e),
            }
        }

        Err(AppError::InternalError(
            "could not allocate a unique quiz path".to_string(),
        ))
    }

    /// Looks a quiz up by path whether or not it is deleted.
    pub async fn resolve(&self, path: &str) -> AppResult<Quiz> {
        with_deadline(self.store_timeout, self.quizzes.find_by_path(path))
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Quiz with path '{}' not found", path)))
    }

    /// Resolves `path` and fails with `Gone` if the quiz is deleted.
    pub async fn live_quiz(&self, path: &str) -> AppResult<Quiz> {
        let quiz = self.resolve(path).await?;
        check_not_deleted(&quiz)?;
        Ok(quiz)
    }

    /// A live quiz with its live questions, for anonymous readers.
    pub async fn live_detail(&self, path: &str) -> AppResult<(Quiz, Vec<QuizQuestion>)> {
        let quiz = self.live_quiz(path).await?;

        let questions =
            with_deadline(self.store_timeout, self.questions.list_live_in_quiz(&quiz.id)).await?;
        Ok((quiz, questions))
    }

    pub async fn list_for_user(&self, owner: Uuid) -> AppResult<Vec<Quiz>> {
        with_deadline(
            self.store_timeout,
            self.quizzes.list_live_by_user(&owner.to_string()),
        )
        .await
    }

    /// Appends a question numbered one past every question the quiz has
    /// ever had.
    pub async fn add_question(
        &self,
        quiz: &Quiz,
        request: CreateQuestionRequest,
    ) -> AppResult<QuizQuestion> {
        request.validate()?;

        for _ in 0..MAX_INSERT_ATTEMPTS {
            let count =
                with_deadline(self.store_timeout, self.questions.count_in_quiz(&quiz.id)).await?;
            let question = QuizQuestion::new(
                &quiz.id,
                count + 1,
                &request.question,
                request.choices(),
                request.answer,
            );

            match with_deadline(self.store_timeout, self.questions.create(question)).await {
                Ok(question) => {
                    log::info!(
                        "Added question {} to quiz {}",
                        question.question_number,
                        quiz.id
                    );
                    return Ok(question);
                }
                // Another writer took this number first.
                Err(AppError::AlreadyExists(_)) => continue,
                Err(e) => return Err(e),
            }
        }

        Err(AppError::Unavailable(format!(
            "quiz {} is being modified concurrently",
            quiz.id
        )))
    }

    pub async fn rename(&self, quiz: &Quiz, request: UpdateQuizTitleRequest) -> AppResult<()> {
        request.validate()?;
        with_deadline(
            self.store_timeout,
            self.quizzes
                .update_title(&quiz.id, request.new_title.trim(), Utc::now()),
        )
        .await?;

        log::info!("Renamed quiz {}", quiz.id);
        Ok(())
    }

    pub async fn delete_quiz(&self, quiz: &Quiz) -> AppResult<()> {
        with_deadline(
            self.store_timeout,
            self.quizzes.soft_delete(&quiz.id, Utc::now()),
        )
        .await?;

        log::info!("Deleted quiz {}", quiz.id);
        Ok(())
    }

    /// Soft-deletes question `number`. An already deleted question is `Gone`.
    pub async fn delete_question(&self, quiz: &Quiz, number: i64) -> AppResult<()> {
        let question = with_deadline(
            self.store_timeout,
            self.questions.find_by_number(&quiz.id, number),
        )
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("Question {} not found in quiz {}", number, quiz.path))
        })?;
        check_not_deleted(&question)?;

        with_deadline(
            self.store_timeout,
            self.questions.soft_delete(&question.id, Utc::now()),
        )
        .await?;

        log::info!("Deleted question {} of quiz {}", number, quiz.id);
        Ok(())
    }
}
