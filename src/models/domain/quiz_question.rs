use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::guard::SoftDeletable;

pub const CHOICE_COUNT: usize = 4;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct QuizQuestion {
    pub id: String,
    pub quiz_id: String,
    pub question_number: i64, // 1-based, unique within a quiz
    pub question_text: String,
    pub choices: Vec<String>,
    pub answer: i64, // 1-based index into choices
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl QuizQuestion {
    pub fn new(
        quiz_id: &str,
        question_number: i64,
        question_text: &str,
        choices: Vec<String>,
        answer: i64,
    ) -> Self {
        let now = Utc::now();
        QuizQuestion {
            id: Uuid::new_v4().to_string(),
            quiz_id: quiz_id.to_string(),
            question_number,
            question_text: question_text.to_string(),
            choices,
            answer,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn is_correct(&self, choice_index: usize) -> bool {
        choice_index as i64 + 1 == self.answer
    }
}

impl SoftDeletable for QuizQuestion {
    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }
}
