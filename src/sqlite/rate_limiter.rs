use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::rate_limit::RateLimiterRepository;
use crate::CrmError;

use super::db_err;

#[derive(Clone)]
pub struct SqliteRateLimiterRepository {
    pool: SqlitePool,
}

impl SqliteRateLimiterRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RateLimiterRepository for SqliteRateLimiterRepository {
    async fn record_attempt(
        &self,
        email: &str,
        success: bool,
        ip_address: Option<&str>,
    ) -> Result<(), CrmError> {
        sqlx::query(
            "INSERT INTO login_attempts (email, success, ip_address, attempted_at) VALUES (?, ?, ?, ?)",
        )
        .bind(email)
        .bind(success)
        .bind(ip_address)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| db_err("record_attempt", e))?;

        Ok(())
    }

    async fn recent_failed_attempts(
        &self,
        email: &str,
        since: DateTime<Utc>,
    ) -> Result<u32, CrmError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM login_attempts WHERE email = ? AND success = 0 AND attempted_at >= ?",
        )
        .bind(email)
        .bind(since)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_err("recent_failed_attempts", e))?;

        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }

    async fn clear_attempts(&self, email: &str) -> Result<(), CrmError> {
        sqlx::query("DELETE FROM login_attempts WHERE email = ?")
            .bind(email)
            .execute(&self.pool)
            .await
            .map_err(|e| db_err("clear_attempts", e))?;

        Ok(())
    }
}
