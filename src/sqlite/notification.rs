use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};

use crate::repository::{NewNotification, Notification, NotificationRepository};
use crate::{CrmError, TenantScope};

use super::db_err;

const COLUMNS: &str = "id, company_id, user_id, title, body, read_at, created_at";

#[derive(Clone)]
pub struct SqliteNotificationRepository {
    pool: SqlitePool,
}

impl SqliteNotificationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct NotificationRecord {
    id: i64,
    company_id: i64,
    user_id: i64,
    title: String,
    body: String,
    read_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl From<NotificationRecord> for Notification {
    fn from(row: NotificationRecord) -> Self {
        Notification {
            id: row.id,
            company_id: row.company_id,
            user_id: row.user_id,
            title: row.title,
            body: row.body,
            read_at: row.read_at,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl NotificationRepository for SqliteNotificationRepository {
    async fn list_for_user(
        &self,
        scope: &TenantScope,
        user_id: i64,
    ) -> Result<Vec<Notification>, CrmError> {
        let company_id = scope.company_id();
        let rows: Vec<NotificationRecord> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM notifications \
             WHERE user_id = ? AND (? IS NULL OR company_id = ?) ORDER BY created_at DESC, id DESC"
        ))
        .bind(user_id)
        .bind(company_id)
        .bind(company_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_err("list_notifications", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn create(&self, new: NewNotification) -> Result<Notification, CrmError> {
        let row: NotificationRecord = sqlx::query_as(&format!(
            "INSERT INTO notifications (company_id, user_id, title, body, created_at) \
             VALUES (?, ?, ?, ?, ?) RETURNING {COLUMNS}"
        ))
        .bind(new.company_id)
        .bind(new.user_id)
        .bind(&new.title)
        .bind(&new.body)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_err("create_notification", e))?;

        Ok(row.into())
    }

    async fn mark_read(
        &self,
        scope: &TenantScope,
        id: i64,
        user_id: i64,
    ) -> Result<Notification, CrmError> {
        let company_id = scope.company_id();
        let row: Option<NotificationRecord> = sqlx::query_as(&format!(
            "UPDATE notifications SET read_at = COALESCE(read_at, ?) \
             WHERE id = ? AND user_id = ? AND (? IS NULL OR company_id = ?) RETURNING {COLUMNS}"
        ))
        .bind(Utc::now())
        .bind(id)
        .bind(user_id)
        .bind(company_id)
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_err("mark_notification_read", e))?;

        row.map(Into::into).ok_or(CrmError::NotFound)
    }
}
