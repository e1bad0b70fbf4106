use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};

use crate::repository::{Customer, CustomerRepository, CustomerStatus, CustomerUpdate, NewCustomer};
use crate::{CrmError, TenantScope};

use super::{db_err, parse_stored};

const COLUMNS: &str =
    "id, company_id, name, email, phone, address, status, owner_id, created_at, updated_at";

#[derive(Clone)]
pub struct SqliteCustomerRepository {
    pool: SqlitePool,
}

impl SqliteCustomerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct CustomerRecord {
    id: i64,
    company_id: i64,
    name: String,
    email: Option<String>,
    phone: Option<String>,
    address: Option<String>,
    status: String,
    owner_id: Option<i64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CustomerRecord> for Customer {
    type Error = CrmError;

    fn try_from(row: CustomerRecord) -> Result<Self, Self::Error> {
        let status = parse_stored(CustomerStatus::from_str(&row.status), "status", &row.status)?;
        Ok(Customer {
            id: row.id,
            company_id: row.company_id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            address: row.address,
            status,
            owner_id: row.owner_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl CustomerRepository for SqliteCustomerRepository {
    async fn list(&self, scope: &TenantScope) -> Result<Vec<Customer>, CrmError> {
        // Super-admin queries carry no tenant filter at all.
        let rows: Vec<CustomerRecord> = match scope.company_id() {
            Some(company_id) => {
                sqlx::query_as(&format!(
                    "SELECT {COLUMNS} FROM customers WHERE company_id = ? ORDER BY id"
                ))
                .bind(company_id)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as(&format!("SELECT {COLUMNS} FROM customers ORDER BY id"))
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(|e| db_err("list_customers", e))?;

        rows.into_iter().map(Customer::try_from).collect()
    }

    async fn find(&self, scope: &TenantScope, id: i64) -> Result<Option<Customer>, CrmError> {
        let company_id = scope.company_id();
        let row: Option<CustomerRecord> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM customers WHERE id = ? AND (? IS NULL OR company_id = ?)"
        ))
        .bind(id)
        .bind(company_id)
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_err("find_customer", e))?;

        row.map(Customer::try_from).transpose()
    }

    async fn create(&self, company_id: i64, new: NewCustomer) -> Result<Customer, CrmError> {
        let now = Utc::now();
        let status = new.status.unwrap_or(CustomerStatus::Lead);
        let row: CustomerRecord = sqlx::query_as(&format!(
            "INSERT INTO customers (company_id, name, email, phone, address, status, owner_id, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING {COLUMNS}"
        ))
        .bind(company_id)
        .bind(&new.name)
        .bind(&new.email)
        .bind(&new.phone)
        .bind(&new.address)
        .bind(status.as_str())
        .bind(new.owner_id)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_err("create_customer", e))?;

        row.try_into()
    }

    async fn update(
        &self,
        scope: &TenantScope,
        id: i64,
        update: CustomerUpdate,
    ) -> Result<Customer, CrmError> {
        let company_id = scope.company_id();
        let row: Option<CustomerRecord> = sqlx::query_as(&format!(
            "UPDATE customers SET name = ?, email = ?, phone = ?, address = ?, status = ?, owner_id = ?, updated_at = ? \
             WHERE id = ? AND (? IS NULL OR company_id = ?) RETURNING {COLUMNS}"
        ))
        .bind(&update.name)
        .bind(&update.email)
        .bind(&update.phone)
        .bind(&update.address)
        .bind(update.status.as_str())
        .bind(update.owner_id)
        .bind(Utc::now())
        .bind(id)
        .bind(company_id)
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_err("update_customer", e))?;

        row.ok_or(CrmError::NotFound)?.try_into()
    }

    async fn delete(&self, scope: &TenantScope, id: i64) -> Result<(), CrmError> {
        let company_id = scope.company_id();
        let result = sqlx::query(
            "DELETE FROM customers WHERE id = ? AND (? IS NULL OR company_id = ?)",
        )
        .bind(id)
        .bind(company_id)
        .bind(company_id)
        .execute(&self.pool)
        .await
        .map_err(|e| db_err("delete_customer", e))?;

        if result.rows_affected() == 0 {
            return Err(CrmError::NotFound);
        }

        Ok(())
    }
}
