//! Authentication and authorization logic.
//!
//! Provides password hashing, bearer token issuance/validation and the
//! role/plan authorization guard shared by `zima_api` and `zima_cli`.

pub mod guard;
pub mod jwt;
pub mod password;

use thiserror::Error;

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    CredentialError,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Account disabled")]
    AccountDisabled,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
