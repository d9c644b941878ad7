use std::sync::Arc;

use axum::{
    extract::Request,
    http::header,
    middleware::Next,
    response::IntoResponse,
    Extension,
};
use axum_extra::extract::cookie::CookieJar;

use crate::{
    error::{ErrorMessage, HttpError},
    models::usermodel::{Caller, UserRole},
    utils::token,
    AppState,
};

/// The verified caller, or `None` for an anonymous request.
#[derive(Debug, Clone, Default)]
pub struct CallerIdentity(pub Option<Caller>);

impl CallerIdentity {
    pub fn caller(&self) -> Option<&Caller> {
        self.0.as_ref()
    }
}

fn bearer_token(cookie_jar: &CookieJar, req: &Request) -> Option<String> {
    cookie_jar
        .get("token")
        .map(|cookie| cookie.value().to_string())
        .or_else(|| {
            req.headers()
                .get(header::AUTHORIZATION)
                .and_then(|auth_header| auth_header.to_str().ok())
                .and_then(|auth_value| auth_value.strip_prefix("Bearer "))
                .map(|token| token.trim().to_owned())
        })
        .filter(|token| !token.is_empty())
}

/// Resolves the identity token if one is presented. A bad token is rejected;
/// a missing one leaves the request anonymous and lets the service decide.
pub async fn auth(
    cookie_jar: CookieJar,
    Extension(app_state): Extension<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, HttpError> {
    let identity = match bearer_token(&cookie_jar, &req) {
        Some(token) => {
            let caller = token::decode_identity(token, app_state.env.identity_jwt_secret.as_bytes())
                .map_err(|_| HttpError::unauthorized(ErrorMessage::InvalidToken.to_string()))?;
            CallerIdentity(Some(caller))
        }
        None => CallerIdentity(None),
    };

    req.extensions_mut().insert(identity);

    Ok(next.run(req).await)
}

pub async fn role_check(
    Extension(_app_state): Extension<Arc<AppState>>,
    req: Request,
    next: Next,
    required_roles: Vec<UserRole>,
) -> Result<impl IntoResponse, HttpError> {
    let caller = req
        .extensions()
        .get::<CallerIdentity>()
        .and_then(|identity| identity.caller())
        .ok_or_else(|| HttpError::unauthorized(ErrorMessage::UserNotAuthenticated.to_string()))?;

    if !required_roles.contains(&caller.role) {
        return Err(HttpError::forbidden(ErrorMessage::PermissionDenied.to_string()));
    }

    Ok(next.run(req).await)
}
