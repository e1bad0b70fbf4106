use chrono::Utc;
use sqlx::SqlitePool;

use crate::CrmError;

use super::db_err;

/// Minimal company access used by bootstrap seeding and tests. Companies
/// have no CRUD surface of their own; tenants are provisioned out of band.
#[derive(Clone)]
pub struct SqliteCompanyStore {
    pool: SqlitePool,
}

impl SqliteCompanyStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, name: &str) -> Result<i64, CrmError> {
        let now = Utc::now();
        sqlx::query_scalar(
            "INSERT INTO companies (name, created_at, updated_at) VALUES (?, ?, ?) RETURNING id",
        )
        .bind(name)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_err("create_company", e))
    }

    pub async fn find_id_by_name(&self, name: &str) -> Result<Option<i64>, CrmError> {
        sqlx::query_scalar("SELECT id FROM companies WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_err("find_company_by_name", e))
    }
}
