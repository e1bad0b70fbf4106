use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};

use crate::repository::{Deal, DealRepository, DealStage, DealUpdate, NewDeal};
use crate::{CrmError, TenantScope};

use super::{db_err, parse_stored};

const COLUMNS: &str = "id, company_id, customer_id, title, product, value_cents, currency, stage, \
     owner_id, created_at, updated_at";

#[derive(Clone)]
pub struct SqliteDealRepository {
    pool: SqlitePool,
}

impl SqliteDealRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct DealRecord {
    id: i64,
    company_id: i64,
    customer_id: i64,
    title: String,
    product: Option<String>,
    value_cents: i64,
    currency: String,
    stage: String,
    owner_id: Option<i64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<DealRecord> for Deal {
    type Error = CrmError;

    fn try_from(row: DealRecord) -> Result<Self, Self::Error> {
        let stage = parse_stored(DealStage::from_str(&row.stage), "stage", &row.stage)?;
        Ok(Deal {
            id: row.id,
            company_id: row.company_id,
            customer_id: row.customer_id,
            title: row.title,
            product: row.product,
            value_cents: row.value_cents,
            currency: row.currency,
            stage,
            owner_id: row.owner_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl DealRepository for SqliteDealRepository {
    async fn list(&self, scope: &TenantScope) -> Result<Vec<Deal>, CrmError> {
        let rows: Vec<DealRecord> = match scope.company_id() {
            Some(company_id) => {
                sqlx::query_as(&format!(
                    "SELECT {COLUMNS} FROM deals WHERE company_id = ? ORDER BY id"
                ))
                .bind(company_id)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as(&format!("SELECT {COLUMNS} FROM deals ORDER BY id"))
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(|e| db_err("list_deals", e))?;

        rows.into_iter().map(Deal::try_from).collect()
    }

    async fn find(&self, scope: &TenantScope, id: i64) -> Result<Option<Deal>, CrmError> {
        let company_id = scope.company_id();
        let row: Option<DealRecord> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM deals WHERE id = ? AND (? IS NULL OR company_id = ?)"
        ))
        .bind(id)
        .bind(company_id)
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_err("find_deal", e))?;

        row.map(Deal::try_from).transpose()
    }

    async fn create(&self, company_id: i64, new: NewDeal) -> Result<Deal, CrmError> {
        let now = Utc::now();
        let row: DealRecord = sqlx::query_as(&format!(
            "INSERT INTO deals (company_id, customer_id, title, product, value_cents, currency, stage, owner_id, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING {COLUMNS}"
        ))
        .bind(company_id)
        .bind(new.customer_id)
        .bind(&new.title)
        .bind(&new.product)
        .bind(new.value_cents)
        .bind(&new.currency)
        .bind(DealStage::Qualification.as_str())
        .bind(new.owner_id)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_err("create_deal", e))?;

        row.try_into()
    }

    async fn update(
        &self,
        scope: &TenantScope,
        id: i64,
        update: DealUpdate,
    ) -> Result<Deal, CrmError> {
        let company_id = scope.company_id();
        let row: Option<DealRecord> = sqlx::query_as(&format!(
            "UPDATE deals SET title = ?, product = ?, value_cents = ?, currency = ?, owner_id = ?, updated_at = ? \
             WHERE id = ? AND (? IS NULL OR company_id = ?) RETURNING {COLUMNS}"
        ))
        .bind(&update.title)
        .bind(&update.product)
        .bind(update.value_cents)
        .bind(&update.currency)
        .bind(update.owner_id)
        .bind(Utc::now())
        .bind(id)
        .bind(company_id)
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_err("update_deal", e))?;

        row.ok_or(CrmError::NotFound)?.try_into()
    }

    async fn set_stage(
        &self,
        scope: &TenantScope,
        id: i64,
        stage: DealStage,
    ) -> Result<Deal, CrmError> {
        let company_id = scope.company_id();
        let row: Option<DealRecord> = sqlx::query_as(&format!(
            "UPDATE deals SET stage = ?, updated_at = ? \
             WHERE id = ? AND (? IS NULL OR company_id = ?) RETURNING {COLUMNS}"
        ))
        .bind(stage.as_str())
        .bind(Utc::now())
        .bind(id)
        .bind(company_id)
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_err("set_deal_stage", e))?;

        row.ok_or(CrmError::NotFound)?.try_into()
    }

    async fn delete(&self, scope: &TenantScope, id: i64) -> Result<(), CrmError> {
        let company_id = scope.company_id();
        let result =
            sqlx::query("DELETE FROM deals WHERE id = ? AND (? IS NULL OR company_id = ?)")
                .bind(id)
                .bind(company_id)
                .bind(company_id)
                .execute(&self.pool)
                .await
                .map_err(|e| db_err("delete_deal", e))?;

        if result.rows_affected() == 0 {
            return Err(CrmError::NotFound);
        }

        Ok(())
    }
}
