//! Authentication service: signup, login and bearer token resolution.

use chrono::Utc;
use serde_json::{Map, Value};
use tracing::{debug, info};
use zima_core::auth::AuthError;
use zima_core::auth::password::{hash_password, verify_dummy, verify_password};
use zima_core::models::account::{Account, Identity, Plan, Role, normalize_email};
use zima_core::uuid::uuidv7;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::models::TokenResponse;

/// Normalize an email or fail with a validation error.
pub fn require_email(email: &str) -> AppResult<String> {
    normalize_email(email).ok_or_else(|| AppError::Validation("Invalid email address".into()))
}

/// Build a fresh account record. The password is hashed here.
pub fn new_account(email: String, password: &str, role: Role, plan: Plan) -> AppResult<Account> {
    Ok(Account {
        id: uuidv7().to_string(),
        email,
        password_hash: hash_password(password)?,
        role,
        plan,
        disabled: false,
        created_at: Utc::now(),
        last_login_at: None,
    })
}

/// Issue a bearer token for `account`. The subject is the account email.
pub fn issue_token(state: &AppState, account: &Account) -> AppResult<TokenResponse> {
    let mut claims = Map::new();
    claims.insert("role".into(), Value::String(account.role.to_string()));
    claims.insert("plan".into(), Value::String(account.plan.to_string()));
    let access_token = state.tokens.issue(&account.email, claims, None)?;
    Ok(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
        expires_in: state.tokens.ttl().num_seconds(),
    })
}

/// Register a new account with the default role and plan.
pub async fn signup(state: &AppState, email: &str, password: &str) -> AppResult<TokenResponse> {
    let email = require_email(email)?;
    let account = new_account(email, password, Role::default(), Plan::default())?;
    let account = state.store.insert_account(account).await?;
    info!(account_id = %account.id, email = %account.email, "account registered");
    issue_token(state, &account)
}

/// Authenticate with email + password.
pub async fn login(state: &AppState, username: &str, password: &str) -> AppResult<TokenResponse> {
    // Unknown emails, wrong passwords and disabled accounts look the same to the caller.
    let invalid = || AppError::from(AuthError::CredentialError);

    let account = match normalize_email(username) {
        Some(email) => state.store.find_account_by_email(&email).await?,
        None => None,
    };
    let Some(account) = account else {
        verify_dummy(password);
        debug!("login rejected: unknown email");
        return Err(invalid());
    };
    if !verify_password(password, &account.password_hash)? {
        debug!(email = %account.email, "login rejected: bad password");
        return Err(invalid());
    }
    if account.disabled {
        debug!(email = %account.email, "login rejected: account disabled");
        return Err(invalid());
    }

    state
        .store
        .touch_last_login(&account.id, Utc::now())
        .await?;
    info!(account_id = %account.id, "login");
    issue_token(state, &account)
}

/// Resolve a bearer token to the identity of a live account.
///
/// Role and plan come from the store, not from the token, so changes made by
/// an administrator apply to tokens already issued.
pub async fn authenticate(state: &AppState, token: &str) -> AppResult<Identity> {
    let claims = state.tokens.validate(token).map_err(|e| {
        debug!(error = %e, "bearer token rejected");
        AppError::from(e)
    })?;
    let account = state
        .store
        .find_account_by_email(&claims.sub)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Unknown account".into()))?;
    if account.disabled {
        return Err(AuthError::AccountDisabled.into());
    }
    Ok(account.identity())
}
