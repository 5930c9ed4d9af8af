//! In-memory credential store backed by `DashMap`.
//!
//! Used by tests and by `zima_api_server --memory-store`. Lock order is
//! always index map → record map (`emails → accounts`,
//! `owners → secrets → licenses`), never the reverse.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use super::{CredentialStore, StoreError, StoreResult};
use crate::models::account::{Account, Plan, Role};
use crate::models::license::LicenseRecord;

#[derive(Debug, Default)]
pub struct MemoryStore {
    accounts: DashMap<String, Account>,
    /// email → account id
    emails: DashMap<String, String>,
    licenses: DashMap<String, LicenseRecord>,
    /// secret hash → license id
    secrets: DashMap<String, String>,
    /// owner → license ids
    owners: DashMap<String, Vec<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn update_account(&self, id: &str, apply: impl FnOnce(&mut Account)) -> StoreResult<Account> {
        let mut account = self
            .accounts
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(format!("account {id}")))?;
        apply(&mut account);
        Ok(account.clone())
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn insert_account(&self, account: Account) -> StoreResult<Account> {
        match self.emails.entry(account.email.clone()) {
            Entry::Occupied(_) => Err(StoreError::DuplicateEmail(account.email)),
            Entry::Vacant(slot) => {
                self.accounts.insert(account.id.clone(), account.clone());
                slot.insert(account.id.clone());
                Ok(account)
            }
        }
    }

    async fn upsert_account(&self, account: Account) -> StoreResult<Account> {
        match self.emails.entry(account.email.clone()) {
            Entry::Occupied(slot) => {
                let id = slot.get().clone();
                let mut existing = self
                    .accounts
                    .get_mut(&id)
                    .ok_or_else(|| StoreError::Corrupt(format!("dangling email index {id}")))?;
                existing.role = account.role;
                existing.plan = account.plan;
                existing.disabled = account.disabled;
                Ok(existing.clone())
            }
            Entry::Vacant(slot) => {
                self.accounts.insert(account.id.clone(), account.clone());
                slot.insert(account.id.clone());
                Ok(account)
            }
        }
    }

    async fn find_account_by_email(&self, email: &str) -> StoreResult<Option<Account>> {
        let Some(id) = self.emails.get(email).map(|r| r.value().clone()) else {
            return Ok(None);
        };
        Ok(self.accounts.get(&id).map(|r| r.value().clone()))
    }

    async fn find_account_by_id(&self, id: &str) -> StoreResult<Option<Account>> {
        Ok(self.accounts.get(id).map(|r| r.value().clone()))
    }

    async fn list_accounts(&self) -> StoreResult<Vec<Account>> {
        let mut accounts: Vec<Account> = self.accounts.iter().map(|r| r.value().clone()).collect();
        accounts.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(accounts)
    }

    async fn set_role(&self, id: &str, role: Role) -> StoreResult<Account> {
        self.update_account(id, |a| a.role = role)
    }

    async fn set_plan(&self, id: &str, plan: Plan) -> StoreResult<Account> {
        self.update_account(id, |a| a.plan = plan)
    }

    async fn set_disabled(&self, id: &str, disabled: bool) -> StoreResult<Account> {
        self.update_account(id, |a| a.disabled = disabled)
    }

    async fn touch_last_login(&self, id: &str, at: DateTime<Utc>) -> StoreResult<()> {
        self.update_account(id, |a| a.last_login_at = Some(at)).map(|_| ())
    }

    async fn insert_license(
        &self,
        record: LicenseRecord,
        secret_hash: &str,
        exclusive_owner: bool,
    ) -> StoreResult<LicenseRecord> {
        let mut owned = self.owners.entry(record.owner.clone()).or_default();
        if exclusive_owner {
            let now = Utc::now();
            let holds_active = owned.iter().any(|id| {
                self.licenses
                    .get(id)
                    .is_some_and(|lic| lic.is_usable_at(now))
            });
            if holds_active {
                return Err(StoreError::OwnerHasActiveLicense(record.owner));
            }
        }
        match self.secrets.entry(secret_hash.to_string()) {
            Entry::Occupied(_) => Err(StoreError::DuplicateSecret),
            Entry::Vacant(slot) => {
                self.licenses.insert(record.id.clone(), record.clone());
                slot.insert(record.id.clone());
                owned.push(record.id.clone());
                Ok(record)
            }
        }
    }

    async fn find_license_by_secret(
        &self,
        secret_hash: &str,
    ) -> StoreResult<Option<LicenseRecord>> {
        let Some(id) = self.secrets.get(secret_hash).map(|r| r.value().clone()) else {
            return Ok(None);
        };
        Ok(self.licenses.get(&id).map(|r| r.value().clone()))
    }

    async fn find_license(&self, id: &str) -> StoreResult<Option<LicenseRecord>> {
        Ok(self.licenses.get(id).map(|r| r.value().clone()))
    }

    async fn revoke_license(&self, id: &str) -> StoreResult<LicenseRecord> {
        let mut lic = self
            .licenses
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(format!("license {id}")))?;
        lic.active = false;
        lic.revoked_at.get_or_insert_with(Utc::now);
        Ok(lic.clone())
    }

    async fn list_licenses(&self) -> StoreResult<Vec<LicenseRecord>> {
        let mut licenses: Vec<LicenseRecord> =
            self.licenses.iter().map(|r| r.value().clone()).collect();
        licenses.sort_by(|a, b| b.issued_at.cmp(&a.issued_at).then_with(|| b.id.cmp(&a.id)));
        Ok(licenses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn account(email: &str) -> Account {
        Account {
            id: crate::uuid::uuidv7().to_string(),
            email: email.to_string(),
            password_hash: "$2b$10$hash".into(),
            role: Role::User,
            plan: Plan::Freemium,
            disabled: false,
            created_at: Utc::now(),
            last_login_at: None,
        }
    }

    fn license(owner: &str, expires_at: Option<DateTime<Utc>>) -> LicenseRecord {
        LicenseRecord {
            id: crate::uuid::uuidv7().to_string(),
            owner: owner.to_string(),
            scopes: vec!["read".into()],
            plan: Plan::Freemium,
            active: true,
            issued_at: Utc::now(),
            expires_at,
            revoked_at: None,
        }
    }

    #[tokio::test]
    async fn email_is_unique() {
        let store = MemoryStore::new();
        store.insert_account(account("a@x.com")).await.unwrap();
        let err = store.insert_account(account("a@x.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail(e) if e == "a@x.com"));
        assert_eq!(store.list_accounts().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn upsert_updates_in_place_and_keeps_password() {
        let store = MemoryStore::new();
        let original = store.insert_account(account("a@x.com")).await.unwrap();

        let mut change = account("a@x.com");
        change.password_hash = "$2b$10$other".into();
        change.role = Role::Admin;
        change.plan = Plan::Pro;
        let updated = store.upsert_account(change).await.unwrap();

        assert_eq!(updated.id, original.id);
        assert_eq!(updated.password_hash, original.password_hash);
        assert_eq!(updated.role, Role::Admin);
        assert_eq!(updated.plan, Plan::Pro);

        let inserted = store.upsert_account(account("c@x.com")).await.unwrap();
        assert_eq!(
            store.find_account_by_email("c@x.com").await.unwrap().map(|a| a.id),
            Some(inserted.id)
        );
    }

    #[tokio::test]
    async fn set_role_and_plan_on_missing_account() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.set_role("nope", Role::Admin).await,
            Err(StoreError::NotFound(_))
        ));
        let acc = store.insert_account(account("a@x.com")).await.unwrap();
        let acc = store.set_plan(&acc.id, Plan::Lifetime).await.unwrap();
        assert_eq!(acc.plan, Plan::Lifetime);
        let acc = store.set_disabled(&acc.id, true).await.unwrap();
        assert!(acc.disabled);
    }

    #[tokio::test]
    async fn secret_hash_is_unique() {
        let store = MemoryStore::new();
        store
            .insert_license(license("b@x.com", None), "h1", false)
            .await
            .unwrap();
        assert!(matches!(
            store.insert_license(license("c@x.com", None), "h1", false).await,
            Err(StoreError::DuplicateSecret)
        ));
    }

    #[tokio::test]
    async fn exclusive_owner_ignores_revoked_and_expired() {
        let store = MemoryStore::new();
        let expired = license("b@x.com", Some(Utc::now() - Duration::days(1)));
        store.insert_license(expired, "h0", true).await.unwrap();

        let first = store
            .insert_license(license("b@x.com", None), "h1", true)
            .await
            .unwrap();
        assert!(matches!(
            store.insert_license(license("b@x.com", None), "h2", true).await,
            Err(StoreError::OwnerHasActiveLicense(_))
        ));
        // Non-exclusive callers are not restricted.
        store
            .insert_license(license("b@x.com", None), "h3", false)
            .await
            .unwrap();

        store.revoke_license(&first.id).await.unwrap();
        let other = store.list_licenses().await.unwrap();
        for lic in other.iter().filter(|l| l.is_usable_at(Utc::now())) {
            store.revoke_license(&lic.id).await.unwrap();
        }
        store
            .insert_license(license("b@x.com", None), "h4", true)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn revoke_keeps_first_timestamp() {
        let store = MemoryStore::new();
        let lic = store
            .insert_license(license("b@x.com", None), "h1", false)
            .await
            .unwrap();
        let first = store.revoke_license(&lic.id).await.unwrap();
        let second = store.revoke_license(&lic.id).await.unwrap();
        assert!(!second.active);
        assert_eq!(first.revoked_at, second.revoked_at);
        assert!(matches!(
            store.revoke_license("missing").await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn licenses_list_newest_first() {
        let store = MemoryStore::new();
        let mut old = license("b@x.com", None);
        old.issued_at = Utc::now() - Duration::hours(1);
        store.insert_license(old.clone(), "h1", false).await.unwrap();
        let new = store
            .insert_license(license("b@x.com", None), "h2", false)
            .await
            .unwrap();
        let ids: Vec<String> = store
            .list_licenses()
            .await
            .unwrap()
            .into_iter()
            .map(|l| l.id)
            .collect();
        assert_eq!(ids, vec![new.id, old.id]);
    }
}
