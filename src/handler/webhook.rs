use std::sync::Arc;

use axum::{
    body::Bytes,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde_json::json;

use crate::{
    service::payment_webhook::{WebhookOutcome, SIGNATURE_HEADER},
    AppState,
};

/// Provider-facing endpoint. Rejections are plain text; the provider only
/// inspects the status code.
pub async fn checkout_webhook(
    Extension(app_state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());

    match app_state.webhooks.handle(signature, &body).await {
        Ok(outcome) => {
            if let WebhookOutcome::Ignored(reason) = &outcome {
                tracing::debug!("Checkout webhook acknowledged without changes: {}", reason);
            }
            (StatusCode::OK, Json(json!({ "received": true }))).into_response()
        }
        Err(e) => {
            let status = e.status_code();
            if status.is_server_error() {
                tracing::error!("Checkout webhook failed: {:?}", e);
            }
            (status, format!("Webhook Error: {}", e)).into_response()
        }
    }
}
