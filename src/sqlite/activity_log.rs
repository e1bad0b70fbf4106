use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};

use crate::repository::{ActivityLog, ActivityLogRepository, NewActivity};
use crate::{CrmError, TenantScope};

use super::db_err;

const COLUMNS: &str = "id, company_id, user_id, action, entity, entity_id, detail, created_at";

#[derive(Clone)]
pub struct SqliteActivityLogRepository {
    pool: SqlitePool,
}

impl SqliteActivityLogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct ActivityRecord {
    id: i64,
    company_id: i64,
    user_id: i64,
    action: String,
    entity: String,
    entity_id: i64,
    detail: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<ActivityRecord> for ActivityLog {
    fn from(row: ActivityRecord) -> Self {
        ActivityLog {
            id: row.id,
            company_id: row.company_id,
            user_id: row.user_id,
            action: row.action,
            entity: row.entity,
            entity_id: row.entity_id,
            detail: row.detail,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl ActivityLogRepository for SqliteActivityLogRepository {
    async fn list(&self, scope: &TenantScope) -> Result<Vec<ActivityLog>, CrmError> {
        let rows: Vec<ActivityRecord> = match scope.company_id() {
            Some(company_id) => {
                sqlx::query_as(&format!(
                    "SELECT {COLUMNS} FROM activity_log WHERE company_id = ? ORDER BY created_at DESC, id DESC"
                ))
                .bind(company_id)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as(&format!(
                    "SELECT {COLUMNS} FROM activity_log ORDER BY created_at DESC, id DESC"
                ))
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(|e| db_err("list_activity", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn record(&self, new: NewActivity) -> Result<ActivityLog, CrmError> {
        let row: ActivityRecord = sqlx::query_as(&format!(
            "INSERT INTO activity_log (company_id, user_id, action, entity, entity_id, detail, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING {COLUMNS}"
        ))
        .bind(new.company_id)
        .bind(new.user_id)
        .bind(&new.action)
        .bind(&new.entity)
        .bind(new.entity_id)
        .bind(&new.detail)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_err("record_activity", e))?;

        Ok(row.into())
    }
}
