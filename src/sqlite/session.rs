use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};

use crate::crypto::generate_token;
use crate::session::{Session, SessionData, SessionRepository};
use crate::CrmError;

use super::db_err;

/// Sessions persisted in the `sessions` table.
///
/// The session payload is stored as JSON; `expires_at` is duplicated into
/// its own column so pruning does not need to parse payloads.
#[derive(Clone)]
pub struct SqliteSessionRepository {
    pool: SqlitePool,
}

impl SqliteSessionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct SessionRecord {
    id: String,
    data: String,
}

#[async_trait]
impl SessionRepository for SqliteSessionRepository {
    async fn create(&self, data: SessionData) -> Result<String, CrmError> {
        let session_id = generate_token(32);
        let payload = serde_json::to_string(&data)
            .map_err(|e| CrmError::DatabaseError(e.to_string()))?;

        sqlx::query(
            "INSERT INTO sessions (id, user_id, data, created_at, expires_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&session_id)
        .bind(data.user_id)
        .bind(payload)
        .bind(data.created_at)
        .bind(data.expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| db_err("create_session", e))?;

        Ok(session_id)
    }

    async fn find(&self, session_id: &str) -> Result<Option<Session>, CrmError> {
        let row: Option<SessionRecord> =
            sqlx::query_as("SELECT id, data FROM sessions WHERE id = ?")
                .bind(session_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| db_err("find_session", e))?;

        match row {
            Some(record) => {
                let data: SessionData = serde_json::from_str(&record.data).map_err(|e| {
                    log::error!(target: "atrium::sqlite", "msg=\"corrupt session payload\" session_id=\"{}\" error=\"{e}\"", record.id);
                    CrmError::DatabaseError("corrupt session payload".to_owned())
                })?;
                Ok(Some(Session::new(record.id, data)))
            }
            None => Ok(None),
        }
    }

    async fn extend(
        &self,
        session_id: &str,
        new_expires_at: DateTime<Utc>,
    ) -> Result<(), CrmError> {
        // Keep the JSON payload's expiry in sync with the indexed column.
        let Some(session) = self.find(session_id).await? else {
            return Ok(());
        };

        let mut data = session.data;
        data.expires_at = new_expires_at;
        let payload = serde_json::to_string(&data)
            .map_err(|e| CrmError::DatabaseError(e.to_string()))?;

        sqlx::query("UPDATE sessions SET data = ?, expires_at = ? WHERE id = ?")
            .bind(payload)
            .bind(new_expires_at)
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(|e| db_err("extend_session", e))?;

        Ok(())
    }

    async fn destroy(&self, session_id: &str) -> Result<(), CrmError> {
        sqlx::query("DELETE FROM sessions WHERE id = ?")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(|e| db_err("destroy_session", e))?;

        Ok(())
    }

    async fn destroy_user_sessions(&self, user_id: i64) -> Result<(), CrmError> {
        sqlx::query("DELETE FROM sessions WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| db_err("destroy_user_sessions", e))?;

        Ok(())
    }

    async fn prune_expired(&self) -> Result<u64, CrmError> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(|e| db_err("prune_expired_sessions", e))?;

        Ok(result.rows_affected())
    }
}
