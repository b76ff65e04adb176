use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::core::SwipeCommand;
use crate::error::ApiError;
use crate::models::{DiscoverParams, DiscoverQuery, SwipeRequest, SwipeResponse};
use crate::routes::{AppState, AuthenticatedUser};

/// Configure discovery and swipe routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/profiles", web::get().to(discover))
        .route("/swipe", web::post().to(swipe));
}

/// Discovery endpoint
///
/// GET /api/v1/profiles?age_min=21&age_max=35&gender=Female&sort=distance
///
/// `sort` is `recommended` (likability, descending) or `distance`
/// (ascending); anything else keeps the default order.
async fn discover(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    query: web::Query<DiscoverQuery>,
) -> Result<HttpResponse, ApiError> {
    let params = DiscoverParams::from(query.into_inner());

    tracing::debug!("Discovering profiles for user {} with {:?}", user.id(), params);

    let today = chrono::Utc::now().date_naive();
    let profiles = state.directory.discover(user.id(), &params, today).await?;

    Ok(HttpResponse::Ok().json(profiles))
}

/// Swipe endpoint
///
/// POST /api/v1/swipe
///
/// Request body:
/// ```json
/// { "profile_id": 12, "preference": "YES" }
/// ```
async fn swipe(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    req: web::Json<SwipeRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()
        .map_err(|errors| ApiError::Validation(errors.to_string()))?;

    let command = SwipeCommand::parse(req.profile_id, &req.preference)?;
    let outcome = state.swipes.swipe(user.id(), command).await?;

    Ok(HttpResponse::Ok().json(SwipeResponse::from(outcome)))
}
