use std::sync::Arc;

use axum::{response::IntoResponse, routing::get, Extension, Json, Router};
use axum_extra::extract::WithRejection;
use validator::Validate;

use crate::{
    dtos::{settingsdtos::UpdateSettingsDto, ApiResponse},
    error::HttpError,
    AppState,
};

/// Mounted behind the admin role check.
pub fn settings_handler() -> Router {
    Router::new().route("/settings", get(get_settings).put(update_settings))
}

pub async fn get_settings(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let settings = app_state.settings.fetch().await?;

    Ok(Json(ApiResponse::success(settings)))
}

pub async fn update_settings(
    Extension(app_state): Extension<Arc<AppState>>,
    WithRejection(Json(body), _): WithRejection<Json<UpdateSettingsDto>, HttpError>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let settings = app_state.settings.update(body).await?;

    Ok(Json(ApiResponse::success(settings)))
}
