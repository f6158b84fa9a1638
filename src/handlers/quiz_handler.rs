use actix_web::{delete, get, post, put, web, HttpRequest, HttpResponse};

use crate::{
    app_state::AppState,
    auth::AuthenticatedUser,
    errors::AppError,
    handlers::parse_body,
    models::dto::{
        request::{CreateQuestionRequest, CreateQuizRequest, UpdateQuizTitleRequest},
        response::{
            CreateQuizResponse, MessageResponse, OwnerResponse, QuestionDto, QuizDetailResponse,
            QuizListResponse,
        },
    },
};

// Mutating routes on an existing quiz all follow the same order: resolve the
// quiz, run the guard, and only then read the body and write.

#[post("/quizzes")]
pub async fn create_quiz(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    request: web::Json<CreateQuizRequest>,
) -> Result<HttpResponse, AppError> {
    let quiz = state
        .quiz_service
        .create_quiz(auth.0, request.into_inner())
        .await?;

    Ok(HttpResponse::Created().json(CreateQuizResponse {
        quiz_id: quiz.id,
        path: quiz.path,
    }))
}

#[get("/quizzes")]
pub async fn list_quizzes(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let quizzes = state.quiz_service.list_for_user(auth.0).await?;
    Ok(HttpResponse::Ok().json(QuizListResponse {
        quizzes: quizzes.into_iter().map(Into::into).collect(),
    }))
}

/// Anonymous read of a live quiz.
#[get("/quizzes/{path}")]
pub async fn get_quiz(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let (quiz, questions) = state.quiz_service.live_detail(&path).await?;

    Ok(HttpResponse::Ok().json(QuizDetailResponse {
        title: quiz.title,
        path: quiz.path,
        questions: questions.into_iter().map(QuestionDto::from).collect(),
    }))
}

#[post("/quizzes/{path}")]
pub async fn add_question(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    let quiz = state.quiz_service.resolve(&path).await?;
    state.guard.authorize_mutation(req.headers(), &quiz)?;

    let request: CreateQuestionRequest = parse_body(&body)?;
    let question = state.quiz_service.add_question(&quiz, request).await?;
    Ok(HttpResponse::Created().json(QuestionDto::from(question)))
}

#[put("/quizzes/{path}")]
pub async fn rename_quiz(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    let quiz = state.quiz_service.resolve(&path).await?;
    state.guard.authorize_mutation(req.headers(), &quiz)?;

    let request: UpdateQuizTitleRequest = parse_body(&body)?;
    state.quiz_service.rename(&quiz, request).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Quiz renamed")))
}

#[delete("/quizzes/{path}")]
pub async fn delete_quiz(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let quiz = state.quiz_service.resolve(&path).await?;
    state.guard.authorize_mutation(req.headers(), &quiz)?;

    state.quiz_service.delete_quiz(&quiz).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Quiz deleted")))
}

#[delete("/quizzes/{path}/questions/{number}")]
pub async fn delete_question(
    state: web::Data<AppState>,
    req: HttpRequest,
    params: web::Path<(String, String)>,
) -> Result<HttpResponse, AppError> {
    let (path, number) = params.into_inner();
    let quiz = state.quiz_service.resolve(&path).await?;
    state.guard.authorize_mutation(req.headers(), &quiz)?;

    let number = number.parse::<i64>().map_err(|_| {
        AppError::ValidationError(format!("Question number '{}' is not an integer", number))
    })?;
    state.quiz_service.delete_question(&quiz, number).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Question deleted")))
}

#[get("/quizzes/{path}/owner")]
pub async fn is_owner(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let quiz = state.quiz_service.live_quiz(&path).await?;
    let user_id = state.guard.authenticate(req.headers())?;

    Ok(HttpResponse::Ok().json(OwnerResponse {
        is_owner: quiz.user_id == user_id.to_string(),
    }))
}
