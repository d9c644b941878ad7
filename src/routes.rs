use std::sync::Arc;

use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware,
    routing::{get, post},
    Extension, Json, Router,
};
use serde_json::json;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    handler::{
        payouts::payouts_handler,
        referrals::referrals_handler,
        reviewers::{admin_reviewers_handler, reviewers_handler},
        reviews::{public_reviews_handler, reviews_handler},
        settings::settings_handler,
        submissions::{public_submissions_handler, submissions_handler},
        uploads::uploads_handler,
        webhook::checkout_webhook,
    },
    middleware::{auth, role_check},
    models::usermodel::UserRole,
    AppState,
};

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "message": "Server is running"
    }))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed_origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE])
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT])
}

pub fn create_router(app_state: Arc<AppState>) -> Router {
    // Public routes skip `auth` so a stale cookie never blocks an artist's link.
    let submission_routes = submissions_handler()
        .layer(middleware::from_fn(auth))
        .merge(public_submissions_handler());

    let review_routes = reviews_handler()
        .layer(middleware::from_fn(auth))
        .merge(public_reviews_handler());

    let admin_routes = settings_handler()
        .merge(admin_reviewers_handler())
        .layer(middleware::from_fn(|state, req, next| {
            role_check(state, req, next, vec![UserRole::Admin])
        }))
        .layer(middleware::from_fn(auth));

    let api_route = Router::new()
        .route("/webhooks/checkout", post(checkout_webhook))
        .nest("/submissions", submission_routes)
        .nest("/reviews", review_routes)
        .nest("/payouts", payouts_handler().layer(middleware::from_fn(auth)))
        .nest("/referrals", referrals_handler().layer(middleware::from_fn(auth)))
        .nest("/reviewers", reviewers_handler().layer(middleware::from_fn(auth)))
        .nest("/uploads", uploads_handler())
        .nest("/admin", admin_routes);

    let cors = cors_layer(&app_state.env.cors_origins);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_route)
        .layer(TraceLayer::new_for_http())
        .layer(Extension(app_state))
        .layer(cors)
}
