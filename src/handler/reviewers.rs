use std::sync::Arc;

use axum::{
    extract::Path,
    response::IntoResponse,
    routing::{get, put},
    Extension, Json, Router,
};
use axum_extra::extract::WithRejection;
use chrono::Utc;
use validator::Validate;

use crate::{
    db::reviewerdb::ReviewerExt,
    dtos::{reviewerdtos::UpsertReviewerDto, ApiResponse},
    error::{ErrorMessage, HttpError},
    middleware::CallerIdentity,
    models::reviewermodel::ReviewerProfile,
    service::error::ServiceError,
    AppState,
};

pub fn reviewers_handler() -> Router {
    Router::new().route("/:id", get(get_reviewer))
}

/// Mounted behind the admin role check.
pub fn admin_reviewers_handler() -> Router {
    Router::new().route("/reviewers/:id", put(upsert_reviewer))
}

pub async fn get_reviewer(
    WithRejection(Path(reviewer_id), _): WithRejection<Path<String>, HttpError>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(identity): Extension<CallerIdentity>,
) -> Result<impl IntoResponse, HttpError> {
    let caller = identity
        .caller()
        .ok_or_else(|| HttpError::unauthorized(ErrorMessage::UserNotAuthenticated.to_string()))?;
    if !caller.is_reviewer_or_admin() {
        return Err(HttpError::forbidden(ErrorMessage::PermissionDenied.to_string()));
    }

    let reviewer = app_state
        .store
        .get_reviewer(&reviewer_id)
        .await
        .map_err(ServiceError::from)?
        .ok_or_else(|| HttpError::not_found(format!("Reviewer {} not found", reviewer_id)))?;

    Ok(Json(ApiResponse::success(reviewer)))
}

pub async fn upsert_reviewer(
    WithRejection(Path(reviewer_id), _): WithRejection<Path<String>, HttpError>,
    Extension(app_state): Extension<Arc<AppState>>,
    WithRejection(Json(body), _): WithRejection<Json<UpsertReviewerDto>, HttpError>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let now = Utc::now();
    let profile = ReviewerProfile {
        id: reviewer_id,
        name: body.name.trim().to_string(),
        email: body.email.trim().to_string(),
        avatar_url: body.avatar_url,
        created_at: now,
        updated_at: now,
    };

    let reviewer = app_state
        .store
        .upsert_reviewer(profile)
        .await
        .map_err(ServiceError::from)?;

    tracing::info!("Reviewer profile {} saved", reviewer.id);

    Ok(Json(ApiResponse::success(reviewer)))
}
