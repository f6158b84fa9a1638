use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::{
    errors::{AppError, AppResult},
    models::domain::{Quiz, QuizQuestion, RefreshToken, User},
    repositories::{QuestionRepository, QuizRepository, RefreshTokenRepository, UserRepository},
};

/// Users keyed by id. Enforces the same unique email as the Mongo index.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<String, User>>,
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> AppResult<User> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(AppError::AlreadyExists(format!(
                "User with email '{}' already exists",
                user.email
            )));
        }
        users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn update_password(
        &self,
        id: &str,
        password_hash: &str,
        updated_at: DateTime<Utc>,
    ) -> AppResult<()> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(id)
            .ok_or_else(|| AppError::NotFound(format!("User with id '{}' not found", id)))?;
        user.password_hash = password_hash.to_string();
        user.updated_at = updated_at;
        Ok(())
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        Ok(())
    }
}

/// Refresh tokens keyed by token hash.
#[derive(Default)]
pub struct InMemoryRefreshTokenRepository {
    tokens: RwLock<HashMap<String, RefreshToken>>,
}

impl InMemoryRefreshTokenRepository {
    pub async fn insert(&self, token: RefreshToken) {
        self.tokens
            .write()
            .await
            .insert(token.token_hash.clone(), token);
    }

    pub async fn all(&self) -> Vec<RefreshToken> {
        self.tokens.read().await.values().cloned().collect()
    }
}

#[async_trait]
impl RefreshTokenRepository for InMemoryRefreshTokenRepository {
    async fn create(&self, token: RefreshToken) -> AppResult<RefreshToken> {
        let mut tokens = self.tokens.write().await;
        if tokens.contains_key(&token.token_hash) {
            return Err(AppError::AlreadyExists("Refresh token already exists".to_string()));
        }
        tokens.insert(token.token_hash.clone(), token.clone());
        Ok(token)
    }

    async fn find_by_token_hash(&self, hash: &str) -> AppResult<Option<RefreshToken>> {
        Ok(self.tokens.read().await.get(hash).cloned())
    }

    async fn revoke_by_token_hash(&self, hash: &str, revoked_at: DateTime<Utc>) -> AppResult<()> {
        let mut tokens = self.tokens.write().await;
        let token = tokens
            .get_mut(hash)
            .ok_or_else(|| AppError::NotFound("Refresh token not found".to_string()))?;
        token.revoked_at = Some(revoked_at);
        token.updated_at = revoked_at;
        Ok(())
    }

    async fn revoke_all_for_user(&self, user_id: &str, revoked_at: DateTime<Utc>) -> AppResult<u64> {
        let mut tokens = self.tokens.write().await;
        let mut revoked = 0;
        for token in tokens
            .values_mut()
            .filter(|t| t.user_id == user_id && t.revoked_at.is_none())
        {
            token.revoked_at = Some(revoked_at);
            token.updated_at = revoked_at;
            revoked += 1;
        }
        Ok(revoked)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        Ok(())
    }
}

/// Quizzes keyed by id. Paths are unique.
#[derive(Default)]
pub struct InMemoryQuizRepository {
    quizzes: RwLock<HashMap<String, Quiz>>,
}

#[async_trait]
impl QuizRepository for InMemoryQuizRepository {
    async fn create(&self, quiz: Quiz) -> AppResult<Quiz> {
        let mut quizzes = self.quizzes.write().await;
        if quizzes.values().any(|q| q.path == quiz.path) {
            return Err(AppError::AlreadyExists(format!(
                "Quiz with path '{}' already exists",
                quiz.path
            )));
        }
        quizzes.insert(quiz.id.clone(), quiz.clone());
        Ok(quiz)
    }

    async fn find_by_path(&self, path: &str) -> AppResult<Option<Quiz>> {
        let quizzes = self.quizzes.read().await;
        Ok(quizzes.values().find(|q| q.path == path).cloned())
    }

    async fn list_live_by_user(&self, user_id: &str) -> AppResult<Vec<Quiz>> {
        let quizzes = self.quizzes.read().await;
        let mut live: Vec<Quiz> = quizzes
            .values()
            .filter(|q| q.user_id == user_id && q.deleted_at.is_none())
            .cloned()
            .collect();
        live.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(live)
    }

    async fn update_title(
        &self,
        id: &str,
        title: &str,
        updated_at: DateTime<Utc>,
    ) -> AppResult<()> {
        let mut quizzes = self.quizzes.write().await;
        let quiz = quizzes
            .get_mut(id)
            .ok_or_else(|| AppError::NotFound(format!("Quiz with id '{}' not found", id)))?;
        quiz.title = title.to_string();
        quiz.updated_at = updated_at;
        Ok(())
    }

    async fn soft_delete(&self, id: &str, deleted_at: DateTime<Utc>) -> AppResult<()> {
        let mut quizzes = self.quizzes.write().await;
        let quiz = quizzes
            .get_mut(id)
            .ok_or_else(|| AppError::NotFound(format!("Quiz with id '{}' not found", id)))?;
        quiz.deleted_at = Some(deleted_at);
        quiz.updated_at = deleted_at;
        Ok(())
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        Ok(())
    }
}

/// Questions keyed by id. `(quiz_id, question_number)` is unique.
#[derive(Default)]
pub struct InMemoryQuestionRepository {
    questions: RwLock<HashMap<String, QuizQuestion>>,
}

#[async_trait]
impl QuestionRepository for InMemoryQuestionRepository {
    async fn create(&self, question: QuizQuestion) -> AppResult<QuizQuestion> {
        let mut questions = self.questions.write().await;
        if questions.values().any(|q| {
            q.quiz_id == question.quiz_id && q.question_number == question.question_number
        }) {
            return Err(AppError::AlreadyExists(format!(
                "Question {} already exists",
                question.question_number
            )));
        }
        questions.insert(question.id.clone(), question.clone());
        Ok(question)
    }

    async fn count_in_quiz(&self, quiz_id: &str) -> AppResult<i64> {
        let questions = self.questions.read().await;
        Ok(questions.values().filter(|q| q.quiz_id == quiz_id).count() as i64)
    }

    async fn find_by_number(&self, quiz_id: &str, number: i64) -> AppResult<Option<QuizQuestion>> {
        let questions = self.questions.read().await;
        Ok(questions
            .values()
            .find(|q| q.quiz_id == quiz_id && q.question_number == number)
            .cloned())
    }

    async fn list_live_in_quiz(&self, quiz_id: &str) -> AppResult<Vec<QuizQuestion>> {
        let questions = self.questions.read().await;
        let mut live: Vec<QuizQuestion> = questions
            .values()
            .filter(|q| q.quiz_id == quiz_id && q.deleted_at.is_none())
            .cloned()
            .collect();
        live.sort_by_key(|q| q.question_number);
        Ok(live)
    }

    async fn soft_delete(&self, id: &str, deleted_at: DateTime<Utc>) -> AppResult<()> {
        let mut questions = self.questions.write().await;
        let question = questions
            .get_mut(id)
            .ok_or_else(|| AppError::NotFound(format!("Question with id '{}' not found", id)))?;
        question.deleted_at = Some(deleted_at);
        question.updated_at = deleted_at;
        Ok(())
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        Ok(())
    }
}

/// The four in-memory stores behind one test application.
#[derive(Clone, Default)]
pub struct InMemoryStores {
    pub users: Arc<InMemoryUserRepository>,
    pub refresh_tokens: Arc<InMemoryRefreshTokenRepository>,
    pub quizzes: Arc<InMemoryQuizRepository>,
    pub questions: Arc<InMemoryQuestionRepository>,
}

pub mod fixtures {
    use crate::{
        app_state::AppState,
        auth::password::{CredentialManager, HashingParams},
        config::Config,
    };

    use super::InMemoryStores;

    /// Argon2 parameters cheap enough for unit tests.
    pub fn cheap_hashing_params() -> HashingParams {
        HashingParams {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        }
    }

    pub fn test_credentials() -> CredentialManager {
        CredentialManager::new(cheap_hashing_params()).unwrap()
    }

    /// Application state wired to fresh in-memory stores.
    pub fn test_app_state() -> (AppState, InMemoryStores) {
        let stores = InMemoryStores::default();
        let state = AppState::with_repositories(
            Config::test_config(),
            stores.users.clone(),
            stores.refresh_tokens.clone(),
            stores.quizzes.clone(),
            stores.questions.clone(),
        )
        .unwrap();
        (state, stores)
    }
}

pub mod test_helpers {
    use actix_web::http::StatusCode;

    /// Asserts that a status code represents an error (4xx or 5xx)
    pub fn assert_error_status(status: StatusCode) {
        assert!(
            status.is_client_error() || status.is_server_error(),
            "Expected error status, got: {}",
            status
        );
    }

    /// Asserts that a status code represents success (2xx)
    pub fn assert_success_status(status: StatusCode) {
        assert!(
            status.is_success(),
            "Expected success status, got: {}",
            status
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[actix_web::test]
    async fn test_in_memory_users_enforce_unique_email() {
        let repo = InMemoryUserRepository::default();
        repo.create(User::new("a@x.com", "h".into())).await.unwrap();

        let duplicate = repo.create(User::new("a@x.com", "h".into())).await;
        assert!(matches!(duplicate, Err(AppError::AlreadyExists(_))));
    }

    #[actix_web::test]
    async fn test_in_memory_revoke_all_skips_already_revoked() {
        let repo = InMemoryRefreshTokenRepository::default();
        let now = Utc::now();
        let mut revoked = RefreshToken::new("u1".into(), "h1".into(), now, Duration::days(1));
        revoked.revoked_at = Some(now);
        repo.insert(revoked).await;
        repo.insert(RefreshToken::new("u1".into(), "h2".into(), now, Duration::days(1)))
            .await;
        repo.insert(RefreshToken::new("u2".into(), "h3".into(), now, Duration::days(1)))
            .await;

        assert_eq!(repo.revoke_all_for_user("u1", now).await.unwrap(), 1);
    }
}
