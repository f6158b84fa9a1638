pub mod quiz_handler;
pub mod user_handler;

use actix_web::web;
use serde::de::DeserializeOwned;

use crate::errors::{AppError, AppResult};

pub use quiz_handler::{
    add_question, create_quiz, delete_question, delete_quiz, get_quiz, is_owner, list_quizzes,
    rename_quiz,
};
pub use user_handler::{
    change_password, create_user, health_check, health_check_ready, login, refresh, revoke,
};

/// Registers every route of the service.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .service(health_check)
        .service(health_check_ready)
        .service(create_user)
        .service(login)
        .service(refresh)
        .service(revoke)
        .service(change_password)
        .service(create_quiz)
        .service(list_quizzes)
        .service(is_owner)
        .service(delete_question)
        .service(get_quiz)
        .service(add_question)
        .service(rename_quiz)
        .service(delete_quiz);
}

/// Malformed JSON bodies become `ValidationError` instead of actix's plain-text 400.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(64 * 1024)
        .error_handler(|err, _req| AppError::ValidationError(err.to_string()).into())
}

/// Decodes a raw JSON body. Used where the body may only be looked at once
/// authorization has passed.
pub fn parse_body<T: DeserializeOwned>(body: &[u8]) -> AppResult<T> {
    serde_json::from_slice(body).map_err(|e| AppError::ValidationError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::dto::request::CreateQuizRequest;

    #[test]
    fn test_parse_body() {
        let parsed: CreateQuizRequest = parse_body(br#"{"title":"Capitals"}"#).unwrap();
        assert_eq!(parsed.title, "Capitals");

        let broken = parse_body::<CreateQuizRequest>(b"{title");
        assert!(matches!(broken, Err(AppError::ValidationError(_))));
    }
}
