//! License (API key) lifecycle.
//!
//! A license is `Active` until revoked (terminal) or until its `expires_at`
//! passes; expiry is derived at validation time, never stored. Secrets are
//! 64 random alphanumerics handed out once and persisted as SHA-256 digests.

pub mod cache;

use std::sync::Arc;

use chrono::{Duration, Utc};
use rand::distr::Alphanumeric;
use rand::{Rng, rng};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, info, warn};

use self::cache::ValidationCache;
use crate::models::account::Plan;
use crate::models::license::{IssuedLicense, LicenseGrant, LicenseRecord, LicenseStatus};
use crate::store::{CredentialStore, StoreError};
use crate::uuid::uuidv7;

/// Default license lifetime when the caller does not pass one.
pub const DEFAULT_LICENSE_TTL_DAYS: i64 = 30;

/// Length of a generated license secret.
const SECRET_LEN: usize = 64;

/// Attempts before giving up on a secret collision.
const MAX_SECRET_ATTEMPTS: usize = 3;

/// License errors. `NotFound`, `Revoked` and `Expired` stay distinct so
/// callers can tell a client what to do next.
#[derive(Debug, Error)]
pub enum LicenseError {
    #[error("License not found")]
    NotFound,

    #[error("License revoked")]
    Revoked,

    #[error("License expired")]
    Expired,

    #[error("Owner already holds an active license: {0}")]
    DuplicateOwnerKey(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for LicenseError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(_) => LicenseError::NotFound,
            StoreError::OwnerHasActiveLicense(owner) => LicenseError::DuplicateOwnerKey(owner),
            other => LicenseError::Store(other),
        }
    }
}

/// Issuance policy.
#[derive(Debug, Clone)]
pub struct LicensePolicy {
    /// Reject `create` while the owner holds an active, unexpired license.
    pub one_active_per_owner: bool,
    /// Lifetime applied when `create` gets no TTL. `None` or `0` means no expiry.
    pub default_ttl_days: Option<i64>,
    /// Validation cache TTL; zero disables the cache.
    pub cache_ttl: Duration,
}

impl Default for LicensePolicy {
    fn default() -> Self {
        Self {
            one_active_per_owner: false,
            default_ttl_days: Some(DEFAULT_LICENSE_TTL_DAYS),
            cache_ttl: Duration::zero(),
        }
    }
}

/// Generate a random license secret (64 alphanumeric chars).
fn generate_secret() -> String {
    rng()
        .sample_iter(&Alphanumeric)
        .take(SECRET_LEN)
        .map(char::from)
        .collect()
}

/// SHA-256 hash a secret for storage and lookup.
pub fn hash_secret(secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Trim scopes, drop empty ones and duplicates (first occurrence wins).
fn normalize_scopes(scopes: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(scopes.len());
    for scope in scopes.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
        if !out.iter().any(|s| s == scope) {
            out.push(scope.to_string());
        }
    }
    out
}

/// Issues, validates and revokes licenses against a [`CredentialStore`].
#[derive(Clone)]
pub struct LicenseManager {
    store: Arc<dyn CredentialStore>,
    policy: LicensePolicy,
    cache: Arc<ValidationCache>,
}

impl LicenseManager {
    pub fn new(store: Arc<dyn CredentialStore>, policy: LicensePolicy) -> Self {
        let cache = Arc::new(ValidationCache::new(policy.cache_ttl));
        Self {
            store,
            policy,
            cache,
        }
    }

    /// Issue a license for `owner`.
    ///
    /// `ttl_days`: `Some(0)` means no expiry, `None` falls back to the policy
    /// default. The returned [`IssuedLicense`] is the only copy of the secret.
    pub async fn create(
        &self,
        owner: &str,
        scopes: &[String],
        plan: Plan,
        ttl_days: Option<i64>,
    ) -> Result<IssuedLicense, LicenseError> {
        let owner = owner.trim();
        if owner.is_empty() {
            return Err(LicenseError::Validation("owner must not be empty".into()));
        }
        let ttl_days = match ttl_days.or(self.policy.default_ttl_days) {
            Some(days) if days < 0 => {
                return Err(LicenseError::Validation(
                    "expires_in_days must not be negative".into(),
                ));
            }
            Some(0) | None => None,
            Some(days) => Some(days),
        };

        let issued_at = Utc::now();
        let expires_at = match ttl_days {
            Some(days) => Some(
                Duration::try_days(days)
                    .and_then(|ttl| issued_at.checked_add_signed(ttl))
                    .ok_or_else(|| LicenseError::Validation("expires_in_days too large".into()))?,
            ),
            None => None,
        };

        let record = LicenseRecord {
            id: uuidv7().to_string(),
            owner: owner.to_string(),
            scopes: normalize_scopes(scopes),
            plan,
            active: true,
            issued_at,
            expires_at,
            revoked_at: None,
        };

        for attempt in 1..=MAX_SECRET_ATTEMPTS {
            let secret = generate_secret();
            match self
                .store
                .insert_license(
                    record.clone(),
                    &hash_secret(&secret),
                    self.policy.one_active_per_owner,
                )
                .await
            {
                Ok(record) => {
                    info!(
                        license_id = %record.id,
                        owner = %record.owner,
                        plan = %record.plan,
                        "license issued"
                    );
                    return Ok(IssuedLicense { secret, record });
                }
                Err(StoreError::DuplicateSecret) => {
                    warn!(attempt, "license secret collision, regenerating");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(LicenseError::Store(StoreError::DuplicateSecret))
    }

    /// Resolve `secret` to a grant, or say precisely why it is unusable.
    pub async fn validate(&self, secret: &str) -> Result<LicenseGrant, LicenseError> {
        let secret_hash = hash_secret(secret.trim());
        let mut record = match self.cache.get(&secret_hash) {
            Some(record) => record,
            None => {
                let record = self
                    .store
                    .find_license_by_secret(&secret_hash)
                    .await?
                    .ok_or(LicenseError::NotFound)?;
                self.cache.insert(&secret_hash, record.clone());
                record
            }
        };
        self.cache.apply_tombstone(&mut record);

        match record.status_at(Utc::now()) {
            LicenseStatus::Active => Ok(LicenseGrant::from(&record)),
            LicenseStatus::Revoked => {
                debug!(license_id = %record.id, "revoked license presented");
                Err(LicenseError::Revoked)
            }
            LicenseStatus::Expired => {
                debug!(license_id = %record.id, "expired license presented");
                Err(LicenseError::Expired)
            }
        }
    }

    /// Revoke a license by id. Revoking an already revoked license succeeds.
    pub async fn revoke(&self, license_id: &str) -> Result<LicenseRecord, LicenseError> {
        let record = self.store.revoke_license(license_id.trim()).await?;
        self.cache.mark_revoked(&record.id);
        info!(license_id = %record.id, owner = %record.owner, "license revoked");
        Ok(record)
    }

    /// All licenses, newest first. Secrets are never part of the records.
    pub async fn list(&self) -> Result<Vec<LicenseRecord>, LicenseError> {
        Ok(self.store.list_licenses().await?)
    }
}
