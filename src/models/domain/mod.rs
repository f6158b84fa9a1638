pub mod quiz;
pub mod quiz_question;
pub mod refresh_token;
pub mod user;
pub use quiz::Quiz;
pub use quiz_question::QuizQuestion;
pub use refresh_token::RefreshToken;
pub use user::User;
