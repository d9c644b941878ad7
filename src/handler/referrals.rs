use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Extension, Json, Router,
};
use axum_extra::extract::WithRejection;
use uuid::Uuid;

use crate::{
    dtos::{
        referraldtos::{CreateReferralCodeDto, EarningsQueryDto, RedeemReferralCodeDto, UpdateEarningsDto},
        ApiResponse,
    },
    error::HttpError,
    middleware::CallerIdentity,
    AppState,
};

pub fn referrals_handler() -> Router {
    Router::new()
        .route("/codes", get(list_referral_codes).post(create_referral_code))
        .route("/codes/:code", get(get_referral_code))
        .route("/redeem", post(redeem_referral_code))
        .route("/earnings", get(get_referral_earnings).post(update_reviewer_earnings))
        .route("/earnings/:id/paid", put(mark_earning_paid))
}

pub async fn create_referral_code(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(identity): Extension<CallerIdentity>,
    WithRejection(Json(body), _): WithRejection<Json<CreateReferralCodeDto>, HttpError>,
) -> Result<impl IntoResponse, HttpError> {
    let code = app_state.referrals.create_code(identity.caller(), body).await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(code))))
}

pub async fn list_referral_codes(
    WithRejection(Query(query_params), _): WithRejection<Query<EarningsQueryDto>, HttpError>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(identity): Extension<CallerIdentity>,
) -> Result<impl IntoResponse, HttpError> {
    let codes = app_state
        .referrals
        .list_codes(identity.caller(), query_params.referrer_id.as_deref())
        .await?;

    Ok(Json(ApiResponse::success(codes)))
}

pub async fn get_referral_code(
    WithRejection(Path(code), _): WithRejection<Path<String>, HttpError>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(identity): Extension<CallerIdentity>,
) -> Result<impl IntoResponse, HttpError> {
    let code = app_state.referrals.get_code(identity.caller(), &code).await?;

    Ok(Json(ApiResponse::success(code)))
}

pub async fn redeem_referral_code(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(identity): Extension<CallerIdentity>,
    WithRejection(Json(body), _): WithRejection<Json<RedeemReferralCodeDto>, HttpError>,
) -> Result<impl IntoResponse, HttpError> {
    let code = app_state.referrals.redeem(identity.caller(), body).await?;

    Ok(Json(ApiResponse::success(code)))
}

pub async fn update_reviewer_earnings(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(identity): Extension<CallerIdentity>,
    WithRejection(Json(body), _): WithRejection<Json<UpdateEarningsDto>, HttpError>,
) -> Result<impl IntoResponse, HttpError> {
    let outcome = app_state
        .referrals
        .update_reviewer_earnings(identity.caller(), body)
        .await?;

    Ok(Json(ApiResponse::success(outcome)))
}

pub async fn get_referral_earnings(
    WithRejection(Query(query_params), _): WithRejection<Query<EarningsQueryDto>, HttpError>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(identity): Extension<CallerIdentity>,
) -> Result<impl IntoResponse, HttpError> {
    let overview = app_state
        .referrals
        .earnings_overview(identity.caller(), query_params.referrer_id.as_deref())
        .await?;

    Ok(Json(ApiResponse::success(overview)))
}

pub async fn mark_earning_paid(
    WithRejection(Path(earning_id), _): WithRejection<Path<Uuid>, HttpError>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(identity): Extension<CallerIdentity>,
) -> Result<impl IntoResponse, HttpError> {
    let earning = app_state
        .referrals
        .mark_earning_paid(identity.caller(), earning_id)
        .await?;

    Ok(Json(ApiResponse::success(earning)))
}
