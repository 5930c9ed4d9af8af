//! License (API key) domain models.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::account::Plan;

/// License record as persisted. The secret itself is never part of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LicenseRecord {
    pub id: String,
    pub owner: String,
    pub scopes: Vec<String>,
    pub plan: Plan,
    pub active: bool,
    pub issued_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl LicenseRecord {
    /// Status derived at `now`. Expiry is never stored as a transition.
    pub fn status_at(&self, now: DateTime<Utc>) -> LicenseStatus {
        if !self.active {
            LicenseStatus::Revoked
        } else if self.expires_at.is_some_and(|exp| exp <= now) {
            LicenseStatus::Expired
        } else {
            LicenseStatus::Active
        }
    }

    pub fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        self.status_at(now) == LicenseStatus::Active
    }
}

/// Lifecycle state of a license.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LicenseStatus {
    Active,
    Revoked,
    Expired,
}

impl LicenseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LicenseStatus::Active => "active",
            LicenseStatus::Revoked => "revoked",
            LicenseStatus::Expired => "expired",
        }
    }
}

impl fmt::Display for LicenseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// What a successful validation hands back to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LicenseGrant {
    pub license_id: String,
    pub owner: String,
    pub scopes: Vec<String>,
    pub plan: Plan,
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<&LicenseRecord> for LicenseGrant {
    fn from(record: &LicenseRecord) -> Self {
        Self {
            license_id: record.id.clone(),
            owner: record.owner.clone(),
            scopes: record.scopes.clone(),
            plan: record.plan,
            expires_at: record.expires_at,
        }
    }
}

/// A freshly created license. The only place the plaintext secret exists.
#[derive(Debug, Clone)]
pub struct IssuedLicense {
    pub secret: String,
    pub record: LicenseRecord,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record(active: bool, expires_at: Option<DateTime<Utc>>) -> LicenseRecord {
        LicenseRecord {
            id: "lic-1".into(),
            owner: "b@x.com".into(),
            scopes: vec!["read".into()],
            plan: Plan::Pro,
            active,
            issued_at: Utc::now(),
            expires_at,
            revoked_at: None,
        }
    }

    #[test]
    fn revoked_wins_over_expired() {
        let now = Utc::now();
        let rec = record(false, Some(now - Duration::days(1)));
        assert_eq!(rec.status_at(now), LicenseStatus::Revoked);
    }

    #[test]
    fn expiry_is_exclusive_of_the_deadline() {
        let now = Utc::now();
        assert_eq!(record(true, Some(now)).status_at(now), LicenseStatus::Expired);
        assert_eq!(
            record(true, Some(now + Duration::seconds(1))).status_at(now),
            LicenseStatus::Active
        );
        assert_eq!(record(true, None).status_at(now), LicenseStatus::Active);
    }

    #[test]
    fn grant_carries_record_fields() {
        let rec = record(true, None);
        let grant = LicenseGrant::from(&rec);
        assert_eq!(grant.license_id, rec.id);
        assert_eq!(grant.scopes, rec.scopes);
        assert_eq!(grant.expires_at, None);
    }
}
