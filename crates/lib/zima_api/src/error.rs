//! Application error types.

use axum::{
    Json,
    extract::rejection::{FormRejection, JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;
use zima_core::auth::AuthError;
use zima_core::licenses::LicenseError;
use zima_core::store::StoreError;

use crate::models::ErrorResponse;

/// Convenience alias for handler return types.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level errors with HTTP status mapping.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Email already registered: {0}")]
    DuplicateEmail(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("License revoked")]
    LicenseRevoked,

    #[error("License expired")]
    LicenseExpired,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, message) = match &self {
            AppError::Validation(m) => (StatusCode::BAD_REQUEST, "validation_error", m.as_str()),
            AppError::DuplicateEmail(_) => (
                StatusCode::BAD_REQUEST,
                "duplicate_email",
                "Email already registered",
            ),
            AppError::NotFound(m) => (StatusCode::NOT_FOUND, "not_found", m.as_str()),
            AppError::Unauthorized(m) => (StatusCode::UNAUTHORIZED, "unauthorized", m.as_str()),
            AppError::Forbidden(m) => (StatusCode::FORBIDDEN, "forbidden", m.as_str()),
            AppError::LicenseRevoked => {
                (StatusCode::FORBIDDEN, "license_revoked", "License revoked")
            }
            AppError::LicenseExpired => {
                (StatusCode::FORBIDDEN, "license_expired", "License expired")
            }
            AppError::Conflict(m) => (StatusCode::CONFLICT, "conflict", m.as_str()),
            AppError::Internal(detail) => {
                error!(%detail, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal server error",
                )
            }
        };
        let body = Json(ErrorResponse {
            error: error.to_string(),
            message: message.to_string(),
        });
        (status, body).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateEmail(email) => AppError::DuplicateEmail(email),
            StoreError::OwnerHasActiveLicense(owner) => {
                AppError::Conflict(format!("Owner '{owner}' already holds an active license"))
            }
            StoreError::NotFound(what) => AppError::NotFound(what),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<FormRejection> for AppError {
    fn from(rejection: FormRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::CredentialError => AppError::Unauthorized("Invalid credentials".into()),
            AuthError::InvalidToken(_) => {
                AppError::Unauthorized("Invalid or expired token".into())
            }
            AuthError::AccountDisabled => AppError::Unauthorized("Account disabled".into()),
            AuthError::Forbidden(msg) => AppError::Forbidden(msg),
            AuthError::ValidationError(msg) => AppError::Validation(msg),
            AuthError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<LicenseError> for AppError {
    fn from(e: LicenseError) -> Self {
        match e {
            LicenseError::NotFound => AppError::NotFound("License not found".into()),
            LicenseError::Revoked => AppError::LicenseRevoked,
            LicenseError::Expired => AppError::LicenseExpired,
            LicenseError::DuplicateOwnerKey(owner) => {
                AppError::Conflict(format!("Owner '{owner}' already holds an active license"))
            }
            LicenseError::Validation(msg) => AppError::Validation(msg),
            LicenseError::Store(e) => AppError::from(e),
        }
    }
}
