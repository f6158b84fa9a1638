use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, max = 1024))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 320))]
    pub email: String,

    #[validate(length(max = 1024))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[validate(length(max = 1024))]
    pub current_password: String,

    #[validate(length(min = 1, max = 1024))]
    pub new_password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateQuizRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateQuizTitleRequest {
    #[validate(length(min = 1, max = 200))]
    pub new_title: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateQuestionRequest {
    #[validate(length(min = 1, max = 1000))]
    pub question: String,

    #[validate(length(min = 1, max = 500))]
    pub choice1: String,

    #[validate(length(min = 1, max = 500))]
    pub choice2: String,

    #[validate(length(min = 1, max = 500))]
    pub choice3: String,

    #[validate(length(min = 1, max = 500))]
    pub choice4: String,

    #[validate(range(min = 1, max = 4))]
    pub answer: i64,
}

impl CreateQuestionRequest {
    pub fn choices(&self) -> Vec<String> {
        vec![
            self.choice1.clone(),
            self.choice2.clone(),
            self.choice3.clone(),
            self.choice4.clone(),
        ]
    }
}
