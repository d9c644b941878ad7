use axum::http::StatusCode;
use thiserror::Error;

use crate::{db::StoreError, error::HttpError};

/// Expected business failures. Every variant maps to one stable kind string.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("{0}")]
    Unauthenticated(String),

    #[error("{0}")]
    PermissionDenied(String),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    FailedPrecondition(String),

    #[error("{0}")]
    AlreadyExists(String),

    #[error("{0}")]
    Internal(String),
}

impl ServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::Unauthenticated(_) => "unauthenticated",
            ServiceError::PermissionDenied(_) => "permission-denied",
            ServiceError::InvalidArgument(_) => "invalid-argument",
            ServiceError::NotFound(_) => "not-found",
            ServiceError::FailedPrecondition(_) => "failed-precondition",
            ServiceError::AlreadyExists(_) => "already-exists",
            ServiceError::Internal(_) => "internal",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ServiceError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            ServiceError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::FailedPrecondition(_) => StatusCode::PRECONDITION_FAILED,
            ServiceError::AlreadyExists(_) => StatusCode::CONFLICT,
            ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn unauthenticated() -> Self {
        ServiceError::Unauthenticated("Authentication required. Please log in.".to_string())
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        tracing::error!("Store failure: {}", err);
        ServiceError::Internal("Server Error. Please try again later".to_string())
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::InvalidArgument(err.to_string())
    }
}

impl From<ServiceError> for HttpError {
    fn from(error: ServiceError) -> Self {
        let status = error.status_code();
        HttpError::new(error.to_string(), status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_round_trip_through_http() {
        let cases = [
            (ServiceError::unauthenticated(), 401, "unauthenticated"),
            (ServiceError::PermissionDenied("no".into()), 403, "permission-denied"),
            (ServiceError::InvalidArgument("bad".into()), 400, "invalid-argument"),
            (ServiceError::NotFound("gone".into()), 404, "not-found"),
            (ServiceError::FailedPrecondition("state".into()), 412, "failed-precondition"),
            (ServiceError::AlreadyExists("dup".into()), 409, "already-exists"),
            (ServiceError::Internal("boom".into()), 500, "internal"),
        ];

        for (error, status, kind) in cases {
            assert_eq!(error.kind(), kind);
            let http: HttpError = error.into();
            assert_eq!(http.status.as_u16(), status);
            assert_eq!(http.kind, kind);
        }
    }
}
