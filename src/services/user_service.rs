use std::{sync::Arc, time::Duration};

use validator::Validate;

use crate::{
    auth::{
        password::{off_executor, CredentialManager},
        session::normalize_email,
    },
    db::with_deadline,
    errors::{AppError, AppResult},
    models::{domain::User, dto::request::CreateUserRequest},
    repositories::UserRepository,
};

pub struct UserService {
    repository: Arc<dyn UserRepository>,
    credentials: Arc<CredentialManager>,
    store_timeout: Duration,
}

impl UserService {
    pub fn new(
        repository: Arc<dyn UserRepository>,
        credentials: Arc<CredentialManager>,
        store_timeout: Duration,
    ) -> Self {
        Self {
            repository,
            credentials,
            store_timeout,
        }
    }

    /// Registers a new account. The email is stored normalized.
    pub async fn create_user(&self, request: CreateUserRequest) -> AppResult<User> {
        request.validate()?;
        let email = normalize_email(&request.email);

        let existing =
            with_deadline(self.store_timeout, self.repository.find_by_email(&email)).await?;
        if existing.is_some() {
            return Err(AppError::AlreadyExists(format!(
                "User with email '{}' already exists",
                email
            )));
        }

        let password = request.password;
        let password_hash = off_executor(&self.credentials, move |c| c.hash(&password)).await?;

        // The unique index still catches a signup racing this one.
        let user = with_deadline(
            self.store_timeout,
            self.repository.create(User::new(&email, password_hash)),
        )
        .await?;

        log::info!("Created user {}", user.id);
        Ok(user)
    }
}
