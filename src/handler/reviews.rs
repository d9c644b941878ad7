use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use axum_extra::extract::WithRejection;
use uuid::Uuid;

use crate::{
    dtos::{
        reviewdtos::{FilterReviewDto, ReviewTokenQuery, SubmitReviewDto, SubmitReviewOnBehalfDto},
        ApiResponse,
    },
    error::HttpError,
    middleware::CallerIdentity,
    AppState,
};

pub fn reviews_handler() -> Router {
    Router::new()
        .route("/", post(submit_review))
        .route("/on-behalf", post(submit_review_on_behalf))
        .route("/mine", get(get_my_reviews))
}

pub fn public_reviews_handler() -> Router {
    Router::new().route("/public/:id", get(get_public_review))
}

pub async fn submit_review(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(identity): Extension<CallerIdentity>,
    WithRejection(Json(body), _): WithRejection<Json<SubmitReviewDto>, HttpError>,
) -> Result<impl IntoResponse, HttpError> {
    let submitted = app_state.reviews.submit_review(identity.caller(), body).await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(submitted))))
}

pub async fn submit_review_on_behalf(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(identity): Extension<CallerIdentity>,
    WithRejection(Json(body), _): WithRejection<Json<SubmitReviewOnBehalfDto>, HttpError>,
) -> Result<impl IntoResponse, HttpError> {
    let submitted = app_state.reviews.submit_review_on_behalf(identity.caller(), body).await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(submitted))))
}

pub async fn get_my_reviews(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(identity): Extension<CallerIdentity>,
) -> Result<impl IntoResponse, HttpError> {
    let reviews = app_state.reviews.list_own_reviews(identity.caller()).await?;
    let reviews: Vec<FilterReviewDto> = reviews.iter().map(FilterReviewDto::filter_review).collect();

    Ok(Json(ApiResponse::success(reviews)))
}

pub async fn get_public_review(
    WithRejection(Path(review_id), _): WithRejection<Path<Uuid>, HttpError>,
    WithRejection(Query(query), _): WithRejection<Query<ReviewTokenQuery>, HttpError>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let review = app_state
        .reviews
        .get_review_by_token(review_id, query.token.as_deref())
        .await?;

    Ok(Json(ApiResponse::success(review)))
}
