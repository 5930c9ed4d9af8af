//! Credential store: durable accounts and license records.
//!
//! Every mutation is atomic at single-record granularity using the
//! backend's own primitive (`DashMap` entry locks in memory, single
//! statements or a short transaction in PostgreSQL). Callers never lock.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::account::{Account, Plan, Role};
use crate::models::license::LicenseRecord;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Email already registered: {0}")]
    DuplicateEmail(String),

    #[error("License secret collision")]
    DuplicateSecret,

    #[error("Owner already holds an active license: {0}")]
    OwnerHasActiveLicense(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Corrupt record: {0}")]
    Corrupt(String),

    #[error("Database error: {0}")]
    DbError(#[from] sqlx::Error),
}

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Keyed persistence for accounts and licenses.
///
/// Emails are expected to be normalized by the caller
/// (see [`crate::models::account::normalize_email`]).
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Insert a new account. Fails with `DuplicateEmail` if the email is taken.
    async fn insert_account(&self, account: Account) -> StoreResult<Account>;

    /// Insert by email, or update role, plan and disabled flag of the existing
    /// account. The stored password hash, id and creation time are kept.
    async fn upsert_account(&self, account: Account) -> StoreResult<Account>;

    async fn find_account_by_email(&self, email: &str) -> StoreResult<Option<Account>>;

    async fn find_account_by_id(&self, id: &str) -> StoreResult<Option<Account>>;

    /// All accounts, oldest first.
    async fn list_accounts(&self) -> StoreResult<Vec<Account>>;

    async fn set_role(&self, id: &str, role: Role) -> StoreResult<Account>;

    async fn set_plan(&self, id: &str, plan: Plan) -> StoreResult<Account>;

    async fn set_disabled(&self, id: &str, disabled: bool) -> StoreResult<Account>;

    async fn touch_last_login(&self, id: &str, at: DateTime<Utc>) -> StoreResult<()>;

    /// Insert a license under `secret_hash`.
    ///
    /// With `exclusive_owner`, fails with `OwnerHasActiveLicense` when the
    /// owner already holds a license that is active and not expired; the
    /// check and the insert happen atomically.
    async fn insert_license(
        &self,
        record: LicenseRecord,
        secret_hash: &str,
        exclusive_owner: bool,
    ) -> StoreResult<LicenseRecord>;

    async fn find_license_by_secret(&self, secret_hash: &str)
    -> StoreResult<Option<LicenseRecord>>;

    async fn find_license(&self, id: &str) -> StoreResult<Option<LicenseRecord>>;

    /// Mark a license inactive. Revoking twice keeps the first `revoked_at`.
    async fn revoke_license(&self, id: &str) -> StoreResult<LicenseRecord>;

    /// All licenses, newest first.
    async fn list_licenses(&self) -> StoreResult<Vec<LicenseRecord>>;
}
