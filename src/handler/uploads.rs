use std::sync::Arc;

use axum::{response::IntoResponse, routing::post, Extension, Json, Router};
use axum_extra::extract::WithRejection;
use validator::Validate;

use crate::{
    dtos::{uploaddtos::AudioUrlRequestDto, ApiResponse},
    error::HttpError,
    AppState,
};

pub fn uploads_handler() -> Router {
    Router::new().route("/audio-url", post(create_audio_url))
}

pub async fn create_audio_url(
    Extension(app_state): Extension<Arc<AppState>>,
    WithRejection(Json(body), _): WithRejection<Json<AudioUrlRequestDto>, HttpError>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let url = app_state
        .storage
        .durable_url(body.upload_path.as_deref(), &body.file_name)?;

    Ok(Json(ApiResponse::success(url)))
}
