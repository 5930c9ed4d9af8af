//! Short-TTL read cache for license validation.
//!
//! Keyed by secret hash. Revocation is monotonic, so revoked ids are kept as
//! tombstones that override any cached copy: once `revoke` has recorded a
//! tombstone, no cache hit in this process can report the license active.

use chrono::{DateTime, Duration, Utc};
use dashmap::{DashMap, DashSet};

use crate::models::license::LicenseRecord;

/// A cached record with expiry.
#[derive(Debug, Clone)]
struct CacheEntry {
    record: LicenseRecord,
    expires_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct ValidationCache {
    entries: DashMap<String, CacheEntry>,
    revoked: DashSet<String>,
    ttl: Duration,
}

impl ValidationCache {
    /// A TTL of zero (or less) disables caching; tombstones are still kept.
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            revoked: DashSet::new(),
            ttl,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.ttl > Duration::zero()
    }

    /// Cached record for `secret_hash`, with tombstones applied.
    pub fn get(&self, secret_hash: &str) -> Option<LicenseRecord> {
        if !self.is_enabled() {
            return None;
        }
        let now = Utc::now();
        let mut record = {
            let entry = self.entries.get(secret_hash)?;
            if now >= entry.expires_at {
                None
            } else {
                Some(entry.record.clone())
            }
        };
        match record.as_mut() {
            Some(rec) => {
                self.apply_tombstone(rec);
            }
            None => {
                self.entries.remove(secret_hash);
            }
        }
        record
    }

    pub fn insert(&self, secret_hash: &str, mut record: LicenseRecord) {
        if !self.is_enabled() {
            return;
        }
        // A TTL past the end of the calendar is not cached at all.
        let Some(expires_at) = Utc::now().checked_add_signed(self.ttl) else {
            return;
        };
        self.apply_tombstone(&mut record);
        self.entries
            .insert(secret_hash.to_string(), CacheEntry { record, expires_at });
    }

    /// Record a revocation and drop every cached copy of the license.
    pub fn mark_revoked(&self, license_id: &str) {
        self.revoked.insert(license_id.to_string());
        self.entries.retain(|_, entry| entry.record.id != license_id);
    }

    /// Mark `record` revoked if a tombstone exists for it.
    pub fn apply_tombstone(&self, record: &mut LicenseRecord) {
        if record.active && self.revoked.contains(&record.id) {
            record.active = false;
        }
    }
}
