use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::CrmError;

/// A persisted report snapshot.
///
/// Keyed by `(report_type, scope)`, where scope is a tenant id or the
/// `global` sentinel for super-admin reports. At most one entry per key;
/// refreshes overwrite in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportCacheEntry {
    pub report_type: String,
    pub scope: String,
    pub payload: serde_json::Value,
    pub computed_at: DateTime<Utc>,
}

impl ReportCacheEntry {
    /// True if this entry is still inside its TTL window at `now`.
    pub fn is_fresh(&self, ttl: chrono::Duration, now: DateTime<Utc>) -> bool {
        now - self.computed_at < ttl
    }
}

#[async_trait]
pub trait ReportCacheRepository: Send + Sync {
    async fn get(
        &self,
        report_type: &str,
        scope: &str,
    ) -> Result<Option<ReportCacheEntry>, CrmError>;

    /// Inserts or overwrites the entry for `(report_type, scope)`.
    async fn put(&self, entry: ReportCacheEntry) -> Result<(), CrmError>;
}
