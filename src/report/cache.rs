//! Compute-or-serve report caching.

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::repository::{ReportCacheEntry, ReportCacheRepository};
use crate::{CrmError, TenantScope};

use super::ReportType;

/// A report payload plus the cache marker the API surfaces.
#[derive(Debug, Clone)]
pub struct CachedReport {
    pub payload: serde_json::Value,
    /// True if served from the cache without recomputation.
    pub cached: bool,
    pub computed_at: DateTime<Utc>,
}

/// TTL-bound report cache keyed by `(report type, tenant scope)`.
///
/// An explicit service object handed to handlers through `AppState` -
/// there is no module-level singleton, so tests get isolated stores.
#[derive(Clone)]
pub struct ReportCache {
    store: Arc<dyn ReportCacheRepository>,
}

impl ReportCache {
    pub fn new(store: Arc<dyn ReportCacheRepository>) -> Self {
        Self { store }
    }

    /// Serves the cached entry for `(report_type, scope)` if it is younger
    /// than `ttl` and `force_refresh` is false; otherwise runs `compute`,
    /// persists the result write-through, and returns it.
    ///
    /// Two concurrent misses for the same key may both compute; the last
    /// write wins. Reports are idempotent to recompute, so no writer
    /// serialization is attempted. A compute failure propagates and no
    /// stale entry is served in its place.
    pub async fn fetch<F, Fut>(
        &self,
        report_type: ReportType,
        scope: &TenantScope,
        ttl: Duration,
        force_refresh: bool,
        compute: F,
    ) -> Result<CachedReport, CrmError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<serde_json::Value, CrmError>>,
    {
        let scope_key = scope.cache_key();
        let now = Utc::now();

        if !force_refresh {
            if let Some(entry) = self.store.get(report_type.as_str(), &scope_key).await? {
                if entry.is_fresh(ttl, now) {
                    log::debug!(
                        target: "atrium::report",
                        "msg=\"cache hit\" report=\"{}\" scope=\"{scope_key}\"",
                        report_type.as_str()
                    );
                    return Ok(CachedReport {
                        payload: entry.payload,
                        cached: true,
                        computed_at: entry.computed_at,
                    });
                }
            }
        }

        let payload = compute().await?;
        let computed_at = Utc::now();

        self.store
            .put(ReportCacheEntry {
                report_type: report_type.as_str().to_owned(),
                scope: scope_key.clone(),
                payload: payload.clone(),
                computed_at,
            })
            .await?;

        log::debug!(
            target: "atrium::report",
            "msg=\"cache refresh\" report=\"{}\" scope=\"{scope_key}\" forced={force_refresh}",
            report_type.as_str()
        );

        Ok(CachedReport {
            payload,
            cached: false,
            computed_at,
        })
    }
}
