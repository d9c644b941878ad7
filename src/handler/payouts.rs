use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Extension, Json, Router,
};
use axum_extra::extract::WithRejection;
use uuid::Uuid;

use crate::{
    dtos::{
        payoutdtos::{CreatePayoutDto, PayoutQueryDto, UpdatePayoutStatusDto},
        ApiResponse,
    },
    error::HttpError,
    middleware::CallerIdentity,
    AppState,
};

pub fn payouts_handler() -> Router {
    Router::new()
        .route("/", get(list_payouts).post(create_payout))
        .route("/summary/:reviewer_id", get(get_payout_summary))
        .route("/:id/status", put(update_payout_status))
}

pub async fn list_payouts(
    WithRejection(Query(query_params), _): WithRejection<Query<PayoutQueryDto>, HttpError>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(identity): Extension<CallerIdentity>,
) -> Result<impl IntoResponse, HttpError> {
    let payouts = app_state.payouts.list(identity.caller(), query_params).await?;

    Ok(Json(ApiResponse::success(payouts)))
}

pub async fn create_payout(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(identity): Extension<CallerIdentity>,
    WithRejection(Json(body), _): WithRejection<Json<CreatePayoutDto>, HttpError>,
) -> Result<impl IntoResponse, HttpError> {
    let payout = app_state.payouts.create(identity.caller(), body).await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(payout))))
}

pub async fn update_payout_status(
    WithRejection(Path(payout_id), _): WithRejection<Path<Uuid>, HttpError>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(identity): Extension<CallerIdentity>,
    WithRejection(Json(body), _): WithRejection<Json<UpdatePayoutStatusDto>, HttpError>,
) -> Result<impl IntoResponse, HttpError> {
    let payout = app_state
        .payouts
        .update_status(identity.caller(), payout_id, &body.status)
        .await?;

    Ok(Json(ApiResponse::success(payout)))
}

pub async fn get_payout_summary(
    WithRejection(Path(reviewer_id), _): WithRejection<Path<String>, HttpError>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(identity): Extension<CallerIdentity>,
) -> Result<impl IntoResponse, HttpError> {
    let summary = app_state.payouts.summary(identity.caller(), &reviewer_id).await?;

    Ok(Json(ApiResponse::success(summary)))
}
