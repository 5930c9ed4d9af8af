//! Authentication request handlers.

use axum::extract::State;
use axum::{Extension, Json};
use zima_core::models::account::AccountSummary;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::extract::{ApiForm, ApiJson};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{LoginForm, SignupRequest, TokenResponse};
use crate::services::auth;

/// `POST /auth/signup`: create an account and return a bearer token.
pub async fn signup_handler(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<SignupRequest>,
) -> AppResult<Json<TokenResponse>> {
    let resp = auth::signup(&state, &body.email, &body.password).await?;
    Ok(Json(resp))
}

/// `POST /auth/login`: form login (`username` is the email).
pub async fn login_handler(
    State(state): State<AppState>,
    ApiForm(form): ApiForm<LoginForm>,
) -> AppResult<Json<TokenResponse>> {
    let resp = auth::login(&state, &form.username, &form.password).await?;
    Ok(Json(resp))
}

/// `GET /auth/me`: the authenticated account.
pub async fn me_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> AppResult<Json<AccountSummary>> {
    let account = state
        .store
        .find_account_by_id(&user.0.account_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Unknown account".into()))?;
    Ok(Json(account.summary()))
}
