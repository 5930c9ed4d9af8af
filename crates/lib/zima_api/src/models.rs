//! Request and response bodies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zima_core::models::account::Plan;
use zima_core::models::license::{LicenseGrant, LicenseRecord, LicenseStatus};

/// Error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// `GET /` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
}

/// OAuth2 password-style login form; `username` carries the email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    /// Seconds until the token expires.
    pub expires_in: i64,
}

// ---------------------------------------------------------------------------
// Licenses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLicenseRequest {
    pub owner: String,
    #[serde(default)]
    pub scopes: Vec<String>,
    pub plan: Option<String>,
    pub expires_in_days: Option<i64>,
}

/// A license as shown to administrators. Never carries the secret.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LicenseInfo {
    pub id: String,
    pub owner: String,
    pub scopes: Vec<String>,
    pub plan: Plan,
    pub status: LicenseStatus,
    pub issued_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl LicenseInfo {
    pub fn from_record(record: LicenseRecord, now: DateTime<Utc>) -> Self {
        Self {
            status: record.status_at(now),
            id: record.id,
            owner: record.owner,
            scopes: record.scopes,
            plan: record.plan,
            issued_at: record.issued_at,
            expires_at: record.expires_at,
            revoked_at: record.revoked_at,
        }
    }
}

/// `POST /licenses/create` response: the only time the secret is returned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLicenseResponse {
    pub secret: String,
    #[serde(flatten)]
    pub license: LicenseInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateLicenseResponse {
    /// Always `"valid"`; unusable licenses are reported as errors.
    pub status: String,
    pub license_id: String,
    pub owner: String,
    pub scopes: Vec<String>,
    pub plan: Plan,
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<LicenseGrant> for ValidateLicenseResponse {
    fn from(grant: LicenseGrant) -> Self {
        Self {
            status: "valid".into(),
            license_id: grant.license_id,
            owner: grant.owner,
            scopes: grant.scopes,
            plan: grant.plan,
            expires_at: grant.expires_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevokeLicenseRequest {
    pub license_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevokeLicenseResponse {
    pub license_id: String,
    pub status: LicenseStatus,
    pub revoked_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Admin
// ---------------------------------------------------------------------------

/// Create an account, or update role/plan of an existing one (matched by email).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertAccountRequest {
    pub email: String,
    /// Required when the account does not exist yet; ignored otherwise.
    pub password: Option<String>,
    pub role: Option<String>,
    pub plan: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetRoleRequest {
    pub user_id: String,
    pub new_role: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetPlanRequest {
    pub user_id: String,
    pub new_plan: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardResponse {
    pub total_users: usize,
    /// Accounts whose plan ranks at or above `pro`.
    pub premium_users: usize,
    pub freemium_users: usize,
    pub disabled_users: usize,
    pub total_licenses: usize,
    pub active_licenses: usize,
}
