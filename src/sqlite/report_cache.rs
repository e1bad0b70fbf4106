use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};

use crate::repository::{ReportCacheEntry, ReportCacheRepository};
use crate::CrmError;

use super::db_err;

/// Report snapshots persisted in the `report_cache` table, one row per
/// `(report_type, scope)`.
#[derive(Clone)]
pub struct SqliteReportCacheRepository {
    pool: SqlitePool,
}

impl SqliteReportCacheRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct CacheRecord {
    report_type: String,
    scope: String,
    payload: String,
    computed_at: DateTime<Utc>,
}

#[async_trait]
impl ReportCacheRepository for SqliteReportCacheRepository {
    async fn get(
        &self,
        report_type: &str,
        scope: &str,
    ) -> Result<Option<ReportCacheEntry>, CrmError> {
        let row: Option<CacheRecord> = sqlx::query_as(
            "SELECT report_type, scope, payload, computed_at FROM report_cache \
             WHERE report_type = ? AND scope = ?",
        )
        .bind(report_type)
        .bind(scope)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_err("get_report_cache", e))?;

        match row {
            Some(record) => {
                let payload = serde_json::from_str(&record.payload).map_err(|e| {
                    log::error!(target: "atrium::sqlite", "msg=\"corrupt report payload\" report=\"{}\" scope=\"{}\" error=\"{e}\"", record.report_type, record.scope);
                    CrmError::DatabaseError("corrupt report payload".to_owned())
                })?;
                Ok(Some(ReportCacheEntry {
                    report_type: record.report_type,
                    scope: record.scope,
                    payload,
                    computed_at: record.computed_at,
                }))
            }
            None => Ok(None),
        }
    }

    async fn put(&self, entry: ReportCacheEntry) -> Result<(), CrmError> {
        let payload = serde_json::to_string(&entry.payload)
            .map_err(|e| CrmError::DatabaseError(e.to_string()))?;

        sqlx::query(
            "INSERT INTO report_cache (report_type, scope, payload, computed_at) VALUES (?, ?, ?, ?) \
             ON CONFLICT(report_type, scope) DO UPDATE SET payload = excluded.payload, computed_at = excluded.computed_at",
        )
        .bind(&entry.report_type)
        .bind(&entry.scope)
        .bind(payload)
        .bind(entry.computed_at)
        .execute(&self.pool)
        .await
        .map_err(|e| db_err("put_report_cache", e))?;

        Ok(())
    }
}
