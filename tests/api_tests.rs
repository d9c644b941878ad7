mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use common::*;
use http_body_util::BodyExt;
use reviewdesk::{models::usermodel::UserRole, routes::create_router};
use serde_json::{json, Value};
use tower::util::ServiceExt;

fn router(app: &TestApp) -> Router {
    create_router(app.state.clone())
}

async fn send(app: &TestApp, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = router(app).oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes().to_vec();
    (status, body)
}

fn get(uri: &str, auth: Option<String>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    builder.body(Body::empty()).unwrap()
}

fn json_request(method: &str, uri: &str, auth: Option<String>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = TestApp::new();

    let (status, body) = send(&app, get("/health", None)).await;

    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_webhook_endpoint_acknowledges_signed_event() {
    let app = TestApp::new();
    let payload = checkout_completed("pi_http", REVIEWER_ID, 2500).to_string();

    let request = Request::builder()
        .method("POST")
        .uri("/api/webhooks/checkout")
        .header("Checkout-Signature", sign(&payload))
        .body(Body::from(payload.clone()))
        .unwrap();
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body, json!({ "received": true }));
}

#[tokio::test]
async fn test_webhook_endpoint_rejects_unsigned_event() {
    let app = TestApp::new();
    let payload = checkout_completed("pi_unsigned", REVIEWER_ID, 2500).to_string();

    let request = Request::builder()
        .method("POST")
        .uri("/api/webhooks/checkout")
        .body(Body::from(payload))
        .unwrap();
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(String::from_utf8(body).unwrap().starts_with("Webhook Error"));
}

#[tokio::test]
async fn test_submissions_require_staff_identity() {
    let app = TestApp::new();
    app.paid_submission("pi_listing", REVIEWER_ID, 2500).await;

    let (status, _) = send(&app, get("/api/submissions", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, get("/api/submissions", Some("Bearer not-a-jwt".to_string()))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app,
        get("/api/submissions", Some(bearer("artist_1", UserRole::Artist))),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["kind"], "permission-denied");

    let (status, body) = send(
        &app,
        get("/api/submissions", Some(bearer(REVIEWER_ID, UserRole::Reviewer))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&body).unwrap();
    let submissions = body["data"].as_array().unwrap();
    assert_eq!(submissions.len(), 1);
    assert!(submissions[0].get("trackingToken").is_none());
}

#[tokio::test]
async fn test_malformed_requests_use_error_envelope() {
    let app = TestApp::new();
    let auth = || Some(bearer(REVIEWER_ID, UserRole::Reviewer));

    let bad_path = get("/api/submissions/not-a-uuid", auth());
    let bad_query = get("/api/submissions?page=abc", auth());
    let bad_json = Request::builder()
        .method("POST")
        .uri("/api/reviews")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, bearer(REVIEWER_ID, UserRole::Reviewer))
        .body(Body::from("{\"submissionId\":"))
        .unwrap();

    for request in [bad_path, bad_query, bad_json] {
        let uri = request.uri().to_string();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["status"], "fail", "{}", uri);
        assert_eq!(body["kind"], "invalid-argument", "{}", uri);
        assert!(!body["message"].as_str().unwrap().is_empty());
    }
}

#[tokio::test]
async fn test_review_flow_over_http() {
    let app = TestApp::new();
    let submission = app.paid_submission("pi_http_review", REVIEWER_ID, 2500).await;

    let review = serde_json::to_value(review_for(submission.id)).unwrap();
    let (status, body) = send(
        &app,
        json_request("POST", "/api/reviews", Some(bearer(REVIEWER_ID, UserRole::Reviewer)), review),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let body: Value = serde_json::from_slice(&body).unwrap();
    let review_url = body["data"]["reviewUrl"].as_str().unwrap().to_string();
    let review_id = body["data"]["reviewId"].as_str().unwrap().to_string();

    let path_and_query = review_url.trim_start_matches(APP_URL).replacen(
        &format!("/review/{}", review_id),
        &format!("/api/reviews/public/{}", review_id),
        1,
    );
    let (status, body) = send(&app, get(&path_and_query, None)).await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["data"]["submissionDetails"]["songTitle"], "Glow");

    let (status, _) = send(
        &app,
        get(&format!("/api/reviews/public/{}?token=wrong", review_id), None),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_public_routes_ignore_stale_credentials() {
    let app = TestApp::new();
    let submission = app.paid_submission("pi_public", REVIEWER_ID, 2500).await;

    let request = json_request(
        "POST",
        "/api/submissions/status",
        Some("Bearer expired-or-garbage".to_string()),
        json!({
            "trackingToken": submission.tracking_token,
            "uploaderEmail": "jane@example.com"
        }),
    );
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["data"]["result"], "single");
}

#[tokio::test]
async fn test_admin_routes_check_role() {
    let app = TestApp::new();

    let (status, _) = send(&app, get("/api/admin/settings", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        get("/api/admin/settings", Some(bearer(REVIEWER_ID, UserRole::Reviewer))),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        json_request(
            "PUT",
            "/api/admin/settings",
            Some(bearer(ADMIN_ID, UserRole::Admin)),
            json!({ "platformName": "Sound Check" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["data"]["platformName"], "Sound Check");
}

#[tokio::test]
async fn test_reviewer_profile_upsert_and_read() {
    let app = TestApp::new();

    let (status, _) = send(
        &app,
        json_request(
            "PUT",
            "/api/admin/reviewers/rev_9",
            Some(bearer(ADMIN_ID, UserRole::Admin)),
            json!({ "name": "Morgan", "email": "not-an-email" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        json_request(
            "PUT",
            "/api/admin/reviewers/rev_9",
            Some(bearer(ADMIN_ID, UserRole::Admin)),
            json!({ "name": "Morgan", "email": "morgan@example.com" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        get("/api/reviewers/rev_9", Some(bearer(REVIEWER_ID, UserRole::Reviewer))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["data"]["email"], "morgan@example.com");
}

#[tokio::test]
async fn test_audio_url_endpoint() {
    let app = TestApp::new();

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/uploads/audio-url",
            None,
            json!({ "uploadPath": "artists/jane", "fileName": "glow.mp3" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(
        body["data"]["url"],
        "https://storage.example.com/audio/artists/jane/glow.mp3"
    );

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/uploads/audio-url",
            None,
            json!({ "uploadPath": "../secrets", "fileName": "glow.mp3" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
