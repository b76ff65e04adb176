use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::error::ApiError;
use crate::models::{CreatedAccountResponse, HealthResponse, LoginRequest, LoginResponse};
use crate::routes::AppState;

/// Configure account and health routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/user/create", web::post().to(create_user))
        .route("/login", web::post().to(login));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let healthy = state.profiles.health_check().await.unwrap_or(false);

    let status = if healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Create an account with a random profile
///
/// POST /api/v1/user/create
async fn create_user(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let today = chrono::Utc::now().date_naive();
    let created = state.accounts.create_random(today).await?;

    Ok(HttpResponse::Ok().json(CreatedAccountResponse {
        profile: created.profile,
        email: created.email,
        password: created.password,
    }))
}

/// Exchange credentials for a token
///
/// POST /api/v1/login
///
/// Request body:
/// ```json
/// { "email": "string", "password": "string" }
/// ```
async fn login(
    state: web::Data<AppState>,
    req: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()
        .map_err(|errors| ApiError::Validation(errors.to_string()))?;

    let token = state.accounts.login(&req.email, &req.password).await?;

    Ok(HttpResponse::Ok().json(LoginResponse { token }))
}
