use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    response::IntoResponse,
    routing::{get, post, put},
    Extension, Json, Router,
};
use axum_extra::extract::WithRejection;
use uuid::Uuid;

use crate::{
    dtos::{
        submissiondtos::{FilterSubmissionDto, StatusLookupDto, SubmissionQueryDto, UpdateSubmissionStatusDto},
        ApiResponse,
    },
    error::HttpError,
    middleware::CallerIdentity,
    AppState,
};

pub fn submissions_handler() -> Router {
    Router::new()
        .route("/", get(list_submissions))
        .route("/:id", get(get_submission))
        .route("/:id/status", put(update_submission_status))
}

pub fn public_submissions_handler() -> Router {
    Router::new().route("/status", post(lookup_submission_status))
}

pub async fn list_submissions(
    WithRejection(Query(query_params), _): WithRejection<Query<SubmissionQueryDto>, HttpError>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(identity): Extension<CallerIdentity>,
) -> Result<impl IntoResponse, HttpError> {
    let submissions = app_state.submissions.list(identity.caller(), query_params).await?;

    Ok(Json(ApiResponse::success(FilterSubmissionDto::filter_submissions(&submissions))))
}

pub async fn get_submission(
    WithRejection(Path(submission_id), _): WithRejection<Path<Uuid>, HttpError>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(identity): Extension<CallerIdentity>,
) -> Result<impl IntoResponse, HttpError> {
    let submission = app_state.submissions.get(identity.caller(), submission_id).await?;

    Ok(Json(ApiResponse::success(FilterSubmissionDto::filter_submission(&submission))))
}

pub async fn lookup_submission_status(
    Extension(app_state): Extension<Arc<AppState>>,
    WithRejection(Json(body), _): WithRejection<Json<StatusLookupDto>, HttpError>,
) -> Result<impl IntoResponse, HttpError> {
    let lookup = app_state.submissions.lookup_status(body).await?;

    Ok(Json(ApiResponse::success(lookup)))
}

pub async fn update_submission_status(
    WithRejection(Path(submission_id), _): WithRejection<Path<Uuid>, HttpError>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(identity): Extension<CallerIdentity>,
    WithRejection(Json(body), _): WithRejection<Json<UpdateSubmissionStatusDto>, HttpError>,
) -> Result<impl IntoResponse, HttpError> {
    let submission = app_state
        .submissions
        .update_status(identity.caller(), submission_id, &body.status)
        .await?;

    Ok(Json(ApiResponse::success(FilterSubmissionDto::filter_submission(&submission))))
}
