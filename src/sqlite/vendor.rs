use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};

use crate::repository::{NewVendor, Vendor, VendorRepository, VendorUpdate};
use crate::{CrmError, TenantScope};

use super::db_err;

const COLUMNS: &str = "id, company_id, name, email, phone, category, created_at, updated_at";

#[derive(Clone)]
pub struct SqliteVendorRepository {
    pool: SqlitePool,
}

impl SqliteVendorRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct VendorRecord {
    id: i64,
    company_id: i64,
    name: String,
    email: Option<String>,
    phone: Option<String>,
    category: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<VendorRecord> for Vendor {
    fn from(row: VendorRecord) -> Self {
        Vendor {
            id: row.id,
            company_id: row.company_id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            category: row.category,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl VendorRepository for SqliteVendorRepository {
    async fn list(&self, scope: &TenantScope) -> Result<Vec<Vendor>, CrmError> {
        let rows: Vec<VendorRecord> = match scope.company_id() {
            Some(company_id) => {
                sqlx::query_as(&format!(
                    "SELECT {COLUMNS} FROM vendors WHERE company_id = ? ORDER BY id"
                ))
                .bind(company_id)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as(&format!("SELECT {COLUMNS} FROM vendors ORDER BY id"))
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(|e| db_err("list_vendors", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find(&self, scope: &TenantScope, id: i64) -> Result<Option<Vendor>, CrmError> {
        let company_id = scope.company_id();
        let row: Option<VendorRecord> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM vendors WHERE id = ? AND (? IS NULL OR company_id = ?)"
        ))
        .bind(id)
        .bind(company_id)
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_err("find_vendor", e))?;

        Ok(row.map(Into::into))
    }

    async fn create(&self, company_id: i64, new: NewVendor) -> Result<Vendor, CrmError> {
        let now = Utc::now();
        let row: VendorRecord = sqlx::query_as(&format!(
            "INSERT INTO vendors (company_id, name, email, phone, category, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING {COLUMNS}"
        ))
        .bind(company_id)
        .bind(&new.name)
        .bind(&new.email)
        .bind(&new.phone)
        .bind(&new.category)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_err("create_vendor", e))?;

        Ok(row.into())
    }

    async fn update(
        &self,
        scope: &TenantScope,
        id: i64,
        update: VendorUpdate,
    ) -> Result<Vendor, CrmError> {
        let company_id = scope.company_id();
        let row: Option<VendorRecord> = sqlx::query_as(&format!(
            "UPDATE vendors SET name = ?, email = ?, phone = ?, category = ?, updated_at = ? \
             WHERE id = ? AND (? IS NULL OR company_id = ?) RETURNING {COLUMNS}"
        ))
        .bind(&update.name)
        .bind(&update.email)
        .bind(&update.phone)
        .bind(&update.category)
        .bind(Utc::now())
        .bind(id)
        .bind(company_id)
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_err("update_vendor", e))?;

        row.map(Into::into).ok_or(CrmError::NotFound)
    }

    async fn delete(&self, scope: &TenantScope, id: i64) -> Result<(), CrmError> {
        let company_id = scope.company_id();
        let result =
            sqlx::query("DELETE FROM vendors WHERE id = ? AND (? IS NULL OR company_id = ?)")
                .bind(id)
                .bind(company_id)
                .bind(company_id)
                .execute(&self.pool)
                .await
                .map_err(|e| db_err("delete_vendor", e))?;

        if result.rows_affected() == 0 {
            return Err(CrmError::NotFound);
        }

        Ok(())
    }
}
