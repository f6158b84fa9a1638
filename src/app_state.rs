use std::sync::Arc;

use crate::{
    auth::{AccessTokenCodec, AuthorizationGuard, CredentialManager, HashingParams, SessionManager},
    config::Config,
    db::Database,
    errors::AppResult,
    repositories::{
        MongoQuestionRepository, MongoQuizRepository, MongoRefreshTokenRepository,
        MongoUserRepository, QuestionRepository, QuizRepository, RefreshTokenRepository,
        UserRepository,
    },
    services::{QuizService, UserService},
};

#[derive(Clone)]
pub struct AppState {
    pub db: Option<Database>,
    pub codec: Arc<AccessTokenCodec>,
    pub guard: AuthorizationGuard,
    pub session_manager: Arc<SessionManager>,
    pub user_service: Arc<UserService>,
    pub quiz_service: Arc<QuizService>,
    pub config: Arc<Config>,
}

impl AppState {
    pub async fn new(config: Config) -> AppResult<Self> {
        let db = Database::connect(&config).await?;

        let users = Arc::new(MongoUserRepository::new(&db));
        users.ensure_indexes().await?;
        let refresh_tokens = Arc::new(MongoRefreshTokenRepository::new(&db));
        refresh_tokens.ensure_indexes().await?;
        let quizzes = Arc::new(MongoQuizRepository::new(&db));
        quizzes.ensure_indexes().await?;
        let questions = Arc::new(MongoQuestionRepository::new(&db));
        questions.ensure_indexes().await?;

        let mut state = Self::with_repositories(config, users, refresh_tokens, quizzes, questions)?;
        state.db = Some(db);
        Ok(state)
    }

    /// Wires services over the given stores without touching a database.
    pub fn with_repositories(
        config: Config,
        users: Arc<dyn UserRepository>,
        refresh_tokens: Arc<dyn RefreshTokenRepository>,
        quizzes: Arc<dyn QuizRepository>,
        questions: Arc<dyn QuestionRepository>,
    ) -> AppResult<Self> {
        let store_timeout = config.store_timeout();
        let credentials = Arc::new(CredentialManager::new(HashingParams::from(&config))?);
        let codec = Arc::new(AccessTokenCodec::new(
            &config.jwt_secret,
            config.access_token_ttl()?,
        ));

        let session_manager = Arc::new(SessionManager::new(
            users.clone(),
            refresh_tokens,
            credentials.clone(),
            codec.clone(),
            config.refresh_token_ttl()?,
            store_timeout,
        ));
        let user_service = Arc::new(UserService::new(users, credentials, store_timeout));
        let quiz_service = Arc::new(QuizService::new(quizzes, questions, store_timeout));

        Ok(Self {
            db: None,
            guard: AuthorizationGuard::new(codec.clone()),
            codec,
            session_manager,
            user_service,
            quiz_service,
            config: Arc::new(config),
        })
    }
}
