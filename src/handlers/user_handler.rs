use actix_web::{get, post, put, web, HttpResponse};
use validator::Validate;

use crate::{
    app_state::AppState,
    auth::{AuthenticatedUser, BearerToken},
    errors::AppError,
    models::dto::{
        request::{ChangePasswordRequest, CreateUserRequest, LoginRequest},
        response::{LoginResponse, MessageResponse, RefreshResponse, UserDto},
    },
};

#[post("/users/create")]
pub async fn create_user(
    state: web::Data<AppState>,
    request: web::Json<CreateUserRequest>,
) -> Result<HttpResponse, AppError> {
    let user = state.user_service.create_user(request.into_inner()).await?;
    Ok(HttpResponse::Created().json(UserDto::from(user)))
}

#[post("/users/login")]
pub async fn login(
    state: web::Data<AppState>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    request.validate()?;

    let session = state
        .session_manager
        .login(&request.email, &request.password)
        .await?;

    Ok(HttpResponse::Ok().json(LoginResponse {
        user: session.user.into(),
        token: session.access_token.token,
        refresh_token: session.refresh_token,
        expires_in: session.refresh_expires_in,
    }))
}

/// Trades the refresh token in the Authorization header for an access token.
#[get("/users/refresh")]
pub async fn refresh(
    state: web::Data<AppState>,
    token: BearerToken,
) -> Result<HttpResponse, AppError> {
    let issued = state.session_manager.refresh(&token.0).await?;
    Ok(HttpResponse::Ok().json(RefreshResponse {
        token: issued.token,
        expires_in: issued.expires_in,
    }))
}

#[put("/users/revoke")]
pub async fn revoke(
    state: web::Data<AppState>,
    token: BearerToken,
) -> Result<HttpResponse, AppError> {
    state.session_manager.revoke(&token.0).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Refresh token revoked")))
}

#[put("/users/password")]
pub async fn change_password(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    request: web::Json<ChangePasswordRequest>,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    request.validate()?;

    state
        .session_manager
        .change_password(auth.0, &request.current_password, &request.new_password)
        .await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Password updated")))
}

#[get("/health")]
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

#[get("/health/ready")]
pub async fn health_check_ready(state: web::Data<AppState>) -> HttpResponse {
    let db_ok = match &state.db {
        Some(db) => db.health_check().await.is_ok(),
        None => true,
    };

    let response = serde_json::json!({
        "status": if db_ok { "ready" } else { "not_ready" },
        "version": env!("CARGO_PKG_VERSION"),
        "dependencies": {
            "mongodb": if db_ok { "ok" } else { "error" }
        }
    });

    if db_ok {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}
