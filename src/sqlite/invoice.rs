use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, SqlitePool};

use crate::repository::{Invoice, InvoiceRepository, InvoiceStatus, InvoiceUpdate, NewInvoice};
use crate::{CrmError, TenantScope};

use super::{db_err, parse_stored};

const COLUMNS: &str = "id, company_id, customer_id, quote_id, number, total_cents, currency, \
     status, due_date, created_at, updated_at";

#[derive(Clone)]
pub struct SqliteInvoiceRepository {
    pool: SqlitePool,
}

impl SqliteInvoiceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct InvoiceRecord {
    id: i64,
    company_id: i64,
    customer_id: i64,
    quote_id: Option<i64>,
    number: String,
    total_cents: i64,
    currency: String,
    status: String,
    due_date: Option<NaiveDate>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<InvoiceRecord> for Invoice {
    type Error = CrmError;

    fn try_from(row: InvoiceRecord) -> Result<Self, Self::Error> {
        let status = parse_stored(InvoiceStatus::from_str(&row.status), "status", &row.status)?;
        Ok(Invoice {
            id: row.id,
            company_id: row.company_id,
            customer_id: row.customer_id,
            quote_id: row.quote_id,
            number: row.number,
            total_cents: row.total_cents,
            currency: row.currency,
            status,
            due_date: row.due_date,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl InvoiceRepository for SqliteInvoiceRepository {
    async fn list(&self, scope: &TenantScope) -> Result<Vec<Invoice>, CrmError> {
        let rows: Vec<InvoiceRecord> = match scope.company_id() {
            Some(company_id) => {
                sqlx::query_as(&format!(
                    "SELECT {COLUMNS} FROM invoices WHERE company_id = ? ORDER BY id"
                ))
                .bind(company_id)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as(&format!("SELECT {COLUMNS} FROM invoices ORDER BY id"))
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(|e| db_err("list_invoices", e))?;

        rows.into_iter().map(Invoice::try_from).collect()
    }

    async fn find(&self, scope: &TenantScope, id: i64) -> Result<Option<Invoice>, CrmError> {
        let company_id = scope.company_id();
        let row: Option<InvoiceRecord> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM invoices WHERE id = ? AND (? IS NULL OR company_id = ?)"
        ))
        .bind(id)
        .bind(company_id)
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_err("find_invoice", e))?;

        row.map(Invoice::try_from).transpose()
    }

    async fn create(&self, company_id: i64, new: NewInvoice) -> Result<Invoice, CrmError> {
        let now = Utc::now();
        let row: InvoiceRecord = sqlx::query_as(&format!(
            "INSERT INTO invoices (company_id, customer_id, quote_id, number, total_cents, currency, status, due_date, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING {COLUMNS}"
        ))
        .bind(company_id)
        .bind(new.customer_id)
        .bind(new.quote_id)
        .bind(&new.number)
        .bind(new.total_cents)
        .bind(&new.currency)
        .bind(InvoiceStatus::Draft.as_str())
        .bind(new.due_date)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_err("create_invoice", e))?;

        row.try_into()
    }

    async fn update(
        &self,
        scope: &TenantScope,
        id: i64,
        update: InvoiceUpdate,
    ) -> Result<Invoice, CrmError> {
        let existing = self.find(scope, id).await?.ok_or(CrmError::NotFound)?;
        if existing.status != InvoiceStatus::Draft {
            return Err(CrmError::Validation(
                "Only draft invoices can be edited".to_owned(),
            ));
        }

        let company_id = scope.company_id();
        let row: Option<InvoiceRecord> = sqlx::query_as(&format!(
            "UPDATE invoices SET total_cents = ?, currency = ?, due_date = ?, updated_at = ? \
             WHERE id = ? AND (? IS NULL OR company_id = ?) RETURNING {COLUMNS}"
        ))
        .bind(update.total_cents)
        .bind(&update.currency)
        .bind(update.due_date)
        .bind(Utc::now())
        .bind(id)
        .bind(company_id)
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_err("update_invoice", e))?;

        row.ok_or(CrmError::NotFound)?.try_into()
    }

    async fn set_status(
        &self,
        scope: &TenantScope,
        id: i64,
        status: InvoiceStatus,
    ) -> Result<Invoice, CrmError> {
        let company_id = scope.company_id();
        let row: Option<InvoiceRecord> = sqlx::query_as(&format!(
            "UPDATE invoices SET status = ?, updated_at = ? \
             WHERE id = ? AND (? IS NULL OR company_id = ?) RETURNING {COLUMNS}"
        ))
        .bind(status.as_str())
        .bind(Utc::now())
        .bind(id)
        .bind(company_id)
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_err("set_invoice_status", e))?;

        row.ok_or(CrmError::NotFound)?.try_into()
    }

    async fn delete(&self, scope: &TenantScope, id: i64) -> Result<(), CrmError> {
        let company_id = scope.company_id();
        let result =
            sqlx::query("DELETE FROM invoices WHERE id = ? AND (? IS NULL OR company_id = ?)")
                .bind(id)
                .bind(company_id)
                .bind(company_id)
                .execute(&self.pool)
                .await
                .map_err(|e| db_err("delete_invoice", e))?;

        if result.rows_affected() == 0 {
            return Err(CrmError::NotFound);
        }

        Ok(())
    }
}
