use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, SqlitePool};

use crate::repository::{NewQuote, Quote, QuoteRepository, QuoteStatus, QuoteUpdate};
use crate::{CrmError, TenantScope};

use super::{db_err, parse_stored};

const COLUMNS: &str = "id, company_id, customer_id, deal_id, number, total_cents, currency, \
     status, valid_until, created_at, updated_at";

#[derive(Clone)]
pub struct SqliteQuoteRepository {
    pool: SqlitePool,
}

impl SqliteQuoteRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct QuoteRecord {
    id: i64,
    company_id: i64,
    customer_id: i64,
    deal_id: Option<i64>,
    number: String,
    total_cents: i64,
    currency: String,
    status: String,
    valid_until: Option<NaiveDate>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<QuoteRecord> for Quote {
    type Error = CrmError;

    fn try_from(row: QuoteRecord) -> Result<Self, Self::Error> {
        let status = parse_stored(QuoteStatus::from_str(&row.status), "status", &row.status)?;
        Ok(Quote {
            id: row.id,
            company_id: row.company_id,
            customer_id: row.customer_id,
            deal_id: row.deal_id,
            number: row.number,
            total_cents: row.total_cents,
            currency: row.currency,
            status,
            valid_until: row.valid_until,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl QuoteRepository for SqliteQuoteRepository {
    async fn list(&self, scope: &TenantScope) -> Result<Vec<Quote>, CrmError> {
        let rows: Vec<QuoteRecord> = match scope.company_id() {
            Some(company_id) => {
                sqlx::query_as(&format!(
                    "SELECT {COLUMNS} FROM quotes WHERE company_id = ? ORDER BY id"
                ))
                .bind(company_id)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as(&format!("SELECT {COLUMNS} FROM quotes ORDER BY id"))
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(|e| db_err("list_quotes", e))?;

        rows.into_iter().map(Quote::try_from).collect()
    }

    async fn find(&self, scope: &TenantScope, id: i64) -> Result<Option<Quote>, CrmError> {
        let company_id = scope.company_id();
        let row: Option<QuoteRecord> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM quotes WHERE id = ? AND (? IS NULL OR company_id = ?)"
        ))
        .bind(id)
        .bind(company_id)
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_err("find_quote", e))?;

        row.map(Quote::try_from).transpose()
    }

    async fn create(&self, company_id: i64, new: NewQuote) -> Result<Quote, CrmError> {
        let now = Utc::now();
        let row: QuoteRecord = sqlx::query_as(&format!(
            "INSERT INTO quotes (company_id, customer_id, deal_id, number, total_cents, currency, status, valid_until, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING {COLUMNS}"
        ))
        .bind(company_id)
        .bind(new.customer_id)
        .bind(new.deal_id)
        .bind(&new.number)
        .bind(new.total_cents)
        .bind(&new.currency)
        .bind(QuoteStatus::Draft.as_str())
        .bind(new.valid_until)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_err("create_quote", e))?;

        row.try_into()
    }

    async fn update(
        &self,
        scope: &TenantScope,
        id: i64,
        update: QuoteUpdate,
    ) -> Result<Quote, CrmError> {
        let existing = self.find(scope, id).await?.ok_or(CrmError::NotFound)?;
        if existing.status != QuoteStatus::Draft {
            return Err(CrmError::Validation(
                "Only draft quotes can be edited".to_owned(),
            ));
        }

        let company_id = scope.company_id();
        let row: Option<QuoteRecord> = sqlx::query_as(&format!(
            "UPDATE quotes SET total_cents = ?, currency = ?, valid_until = ?, updated_at = ? \
             WHERE id = ? AND (? IS NULL OR company_id = ?) RETURNING {COLUMNS}"
        ))
        .bind(update.total_cents)
        .bind(&update.currency)
        .bind(update.valid_until)
        .bind(Utc::now())
        .bind(id)
        .bind(company_id)
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_err("update_quote", e))?;

        row.ok_or(CrmError::NotFound)?.try_into()
    }

    async fn set_status(
        &self,
        scope: &TenantScope,
        id: i64,
        status: QuoteStatus,
    ) -> Result<Quote, CrmError> {
        let company_id = scope.company_id();
        let row: Option<QuoteRecord> = sqlx::query_as(&format!(
            "UPDATE quotes SET status = ?, updated_at = ? \
             WHERE id = ? AND (? IS NULL OR company_id = ?) RETURNING {COLUMNS}"
        ))
        .bind(status.as_str())
        .bind(Utc::now())
        .bind(id)
        .bind(company_id)
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_err("set_quote_status", e))?;

        row.ok_or(CrmError::NotFound)?.try_into()
    }

    async fn delete(&self, scope: &TenantScope, id: i64) -> Result<(), CrmError> {
        let company_id = scope.company_id();
        let result =
            sqlx::query("DELETE FROM quotes WHERE id = ? AND (? IS NULL OR company_id = ?)")
                .bind(id)
                .bind(company_id)
                .bind(company_id)
                .execute(&self.pool)
                .await
                .map_err(|e| db_err("delete_quote", e))?;

        if result.rows_affected() == 0 {
            return Err(CrmError::NotFound);
        }

        Ok(())
    }
}
