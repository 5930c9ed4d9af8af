//! PostgreSQL credential store.
//!
//! Each mutation is a single statement (`INSERT … ON CONFLICT`,
//! `UPDATE … RETURNING`) so concurrent writers never interleave partial
//! updates. Exclusive license issuance takes a transaction-scoped advisory
//! lock on the owner so the "no active license" check and the insert are
//! one unit.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{CredentialStore, StoreError, StoreResult};
use crate::models::account::{Account, Plan, Role};
use crate::models::license::LicenseRecord;
use crate::uuid::parse_id;

const ACCOUNT_COLUMNS: &str =
    "id::text, email, password_hash, role, plan, disabled, created_at, last_login_at";

const LICENSE_COLUMNS: &str =
    "id::text, owner, scopes, plan, active, issued_at, expires_at, revoked_at";

type AccountRow = (
    String,
    String,
    String,
    String,
    String,
    bool,
    DateTime<Utc>,
    Option<DateTime<Utc>>,
);

type LicenseRow = (
    String,
    String,
    Vec<String>,
    String,
    bool,
    DateTime<Utc>,
    Option<DateTime<Utc>>,
    Option<DateTime<Utc>>,
);

fn account_from_row(row: AccountRow) -> StoreResult<Account> {
    let (id, email, password_hash, role, plan, disabled, created_at, last_login_at) = row;
    Ok(Account {
        role: role
            .parse()
            .map_err(|e| StoreError::Corrupt(format!("account {id}: {e}")))?,
        plan: plan
            .parse()
            .map_err(|e| StoreError::Corrupt(format!("account {id}: {e}")))?,
        id,
        email,
        password_hash,
        disabled,
        created_at,
        last_login_at,
    })
}

fn license_from_row(row: LicenseRow) -> StoreResult<LicenseRecord> {
    let (id, owner, scopes, plan, active, issued_at, expires_at, revoked_at) = row;
    Ok(LicenseRecord {
        plan: plan
            .parse()
            .map_err(|e| StoreError::Corrupt(format!("license {id}: {e}")))?,
        id,
        owner,
        scopes,
        active,
        issued_at,
        expires_at,
        revoked_at,
    })
}

fn record_id(id: &str, kind: &str) -> StoreResult<Uuid> {
    parse_id(id).ok_or_else(|| StoreError::NotFound(format!("{kind} {id}")))
}

fn store_id(id: &str) -> StoreResult<Uuid> {
    parse_id(id).ok_or_else(|| StoreError::Corrupt(format!("record id '{id}' is not a UUID")))
}

/// Credential store over a PostgreSQL pool. Run [`crate::migrate::migrate`] first.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Set one text column (`role` or `plan`) and return the updated row.
    async fn update_account(&self, id: &str, column: &str, value: &str) -> StoreResult<Account> {
        let uuid = record_id(id, "account")?;
        let sql =
            format!("UPDATE accounts SET {column} = $2 WHERE id = $1 RETURNING {ACCOUNT_COLUMNS}");
        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(uuid)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("account {id}")))?;
        account_from_row(row)
    }
}

#[async_trait]
impl CredentialStore for PgStore {
    async fn insert_account(&self, account: Account) -> StoreResult<Account> {
        let sql = format!(
            "INSERT INTO accounts \
             (id, email, password_hash, role, plan, disabled, created_at, last_login_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             ON CONFLICT (email) DO NOTHING \
             RETURNING {ACCOUNT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(store_id(&account.id)?)
            .bind(&account.email)
            .bind(&account.password_hash)
            .bind(account.role.as_str())
            .bind(account.plan.as_str())
            .bind(account.disabled)
            .bind(account.created_at)
            .bind(account.last_login_at)
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => account_from_row(row),
            None => Err(StoreError::DuplicateEmail(account.email)),
        }
    }

    async fn upsert_account(&self, account: Account) -> StoreResult<Account> {
        let sql = format!(
            "INSERT INTO accounts \
             (id, email, password_hash, role, plan, disabled, created_at, last_login_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             ON CONFLICT (email) DO UPDATE \
             SET role = EXCLUDED.role, plan = EXCLUDED.plan, disabled = EXCLUDED.disabled \
             RETURNING {ACCOUNT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(store_id(&account.id)?)
            .bind(&account.email)
            .bind(&account.password_hash)
            .bind(account.role.as_str())
            .bind(account.plan.as_str())
            .bind(account.disabled)
            .bind(account.created_at)
            .bind(account.last_login_at)
            .fetch_one(&self.pool)
            .await?;
        account_from_row(row)
    }

    async fn find_account_by_email(&self, email: &str) -> StoreResult<Option<Account>> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = $1");
        sqlx::query_as::<_, AccountRow>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .map(account_from_row)
            .transpose()
    }

    async fn find_account_by_id(&self, id: &str) -> StoreResult<Option<Account>> {
        let Some(uuid) = parse_id(id) else {
            return Ok(None);
        };
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1");
        sqlx::query_as::<_, AccountRow>(&sql)
            .bind(uuid)
            .fetch_optional(&self.pool)
            .await?
            .map(account_from_row)
            .transpose()
    }

    async fn list_accounts(&self) -> StoreResult<Vec<Account>> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts ORDER BY created_at, id");
        sqlx::query_as::<_, AccountRow>(&sql)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(account_from_row)
            .collect()
    }

    async fn set_role(&self, id: &str, role: Role) -> StoreResult<Account> {
        self.update_account(id, "role", role.as_str()).await
    }

    async fn set_plan(&self, id: &str, plan: Plan) -> StoreResult<Account> {
        self.update_account(id, "plan", plan.as_str()).await
    }

    async fn set_disabled(&self, id: &str, disabled: bool) -> StoreResult<Account> {
        let uuid = record_id(id, "account")?;
        let sql = format!(
            "UPDATE accounts SET disabled = $2 WHERE id = $1 RETURNING {ACCOUNT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(uuid)
            .bind(disabled)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("account {id}")))?;
        account_from_row(row)
    }

    async fn touch_last_login(&self, id: &str, at: DateTime<Utc>) -> StoreResult<()> {
        let uuid = record_id(id, "account")?;
        sqlx::query("UPDATE accounts SET last_login_at = $2 WHERE id = $1")
            .bind(uuid)
            .bind(at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn insert_license(
        &self,
        record: LicenseRecord,
        secret_hash: &str,
        exclusive_owner: bool,
    ) -> StoreResult<LicenseRecord> {
        let mut tx = self.pool.begin().await?;

        if exclusive_owner {
            sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
                .bind(&record.owner)
                .execute(&mut *tx)
                .await?;
            let holds_active = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM licenses \
                 WHERE owner = $1 AND active \
                   AND (expires_at IS NULL OR expires_at > now()))",
            )
            .bind(&record.owner)
            .fetch_one(&mut *tx)
            .await?;
            if holds_active {
                return Err(StoreError::OwnerHasActiveLicense(record.owner));
            }
        }

        let sql = format!(
            "INSERT INTO licenses \
             (id, secret_hash, owner, scopes, plan, active, issued_at, expires_at, revoked_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             ON CONFLICT (secret_hash) DO NOTHING \
             RETURNING {LICENSE_COLUMNS}"
        );
        let row = sqlx::query_as::<_, LicenseRow>(&sql)
            .bind(store_id(&record.id)?)
            .bind(secret_hash)
            .bind(&record.owner)
            .bind(&record.scopes)
            .bind(record.plan.as_str())
            .bind(record.active)
            .bind(record.issued_at)
            .bind(record.expires_at)
            .bind(record.revoked_at)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(StoreError::DuplicateSecret)?;

        tx.commit().await?;
        license_from_row(row)
    }

    async fn find_license_by_secret(
        &self,
        secret_hash: &str,
    ) -> StoreResult<Option<LicenseRecord>> {
        let sql = format!("SELECT {LICENSE_COLUMNS} FROM licenses WHERE secret_hash = $1");
        sqlx::query_as::<_, LicenseRow>(&sql)
            .bind(secret_hash)
            .fetch_optional(&self.pool)
            .await?
            .map(license_from_row)
            .transpose()
    }

    async fn find_license(&self, id: &str) -> StoreResult<Option<LicenseRecord>> {
        let Some(uuid) = parse_id(id) else {
            return Ok(None);
        };
        let sql = format!("SELECT {LICENSE_COLUMNS} FROM licenses WHERE id = $1");
        sqlx::query_as::<_, LicenseRow>(&sql)
            .bind(uuid)
            .fetch_optional(&self.pool)
            .await?
            .map(license_from_row)
            .transpose()
    }

    async fn revoke_license(&self, id: &str) -> StoreResult<LicenseRecord> {
        let uuid = record_id(id, "license")?;
        let sql = format!(
            "UPDATE licenses SET active = FALSE, revoked_at = COALESCE(revoked_at, now()) \
             WHERE id = $1 RETURNING {LICENSE_COLUMNS}"
        );
        let row = sqlx::query_as::<_, LicenseRow>(&sql)
            .bind(uuid)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("license {id}")))?;
        license_from_row(row)
    }

    async fn list_licenses(&self) -> StoreResult<Vec<LicenseRecord>> {
        let sql =
            format!("SELECT {LICENSE_COLUMNS} FROM licenses ORDER BY issued_at DESC, id DESC");
        sqlx::query_as::<_, LicenseRow>(&sql)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(license_from_row)
            .collect()
    }
}
