use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::domain::{Quiz, QuizQuestion, User};

#[derive(Debug, Clone, Serialize)]
pub struct UserDto {
    pub id: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        UserDto {
            id: user.id,
            email: user.email,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub user: UserDto,
    pub token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub token: String,
    pub expires_in: i64,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreateQuizResponse {
    pub quiz_id: String,
    pub path: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuizSummaryDto {
    pub id: String,
    pub title: String,
    pub path: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Quiz> for QuizSummaryDto {
    fn from(quiz: Quiz) -> Self {
        QuizSummaryDto {
            id: quiz.id,
            title: quiz.title,
            path: quiz.path,
            created_at: quiz.created_at,
            updated_at: quiz.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct QuizListResponse {
    pub quizzes: Vec<QuizSummaryDto>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChoiceDto {
    pub choice_text: String,
    pub is_correct: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestionDto {
    pub id: String,
    pub question_number: i64,
    pub question_text: String,
    pub choices: Vec<ChoiceDto>,
}

impl From<QuizQuestion> for QuestionDto {
    fn from(question: QuizQuestion) -> Self {
        let choices = question
            .choices
            .iter()
            .enumerate()
            .map(|(index, text)| ChoiceDto {
                choice_text: text.clone(),
                is_correct: question.is_correct(index),
            })
            .collect();

        QuestionDto {
            id: question.id,
            question_number: question.question_number,
            question_text: question.question_text,
            choices,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct QuizDetailResponse {
    pub title: String,
    pub path: String,
    pub questions: Vec<QuestionDto>,
}

#[derive(Debug, Serialize)]
pub struct OwnerResponse {
    pub is_owner: bool,
}
