use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};

use crate::repository::{NewShipment, Shipment, ShipmentRepository, ShipmentStatus, ShipmentUpdate};
use crate::{CrmError, TenantScope};

use super::{db_err, parse_stored};

const COLUMNS: &str = "id, company_id, invoice_id, carrier, tracking_number, status, shipped_at, \
     delivered_at, created_at, updated_at";

#[derive(Clone)]
pub struct SqliteShipmentRepository {
    pool: SqlitePool,
}

impl SqliteShipmentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct ShipmentRecord {
    id: i64,
    company_id: i64,
    invoice_id: i64,
    carrier: String,
    tracking_number: Option<String>,
    status: String,
    shipped_at: Option<DateTime<Utc>>,
    delivered_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ShipmentRecord> for Shipment {
    type Error = CrmError;

    fn try_from(row: ShipmentRecord) -> Result<Self, Self::Error> {
        let status = parse_stored(ShipmentStatus::from_str(&row.status), "status", &row.status)?;
        Ok(Shipment {
            id: row.id,
            company_id: row.company_id,
            invoice_id: row.invoice_id,
            carrier: row.carrier,
            tracking_number: row.tracking_number,
            status,
            shipped_at: row.shipped_at,
            delivered_at: row.delivered_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl ShipmentRepository for SqliteShipmentRepository {
    async fn list(&self, scope: &TenantScope) -> Result<Vec<Shipment>, CrmError> {
        let rows: Vec<ShipmentRecord> = match scope.company_id() {
            Some(company_id) => {
                sqlx::query_as(&format!(
                    "SELECT {COLUMNS} FROM shipments WHERE company_id = ? ORDER BY id"
                ))
                .bind(company_id)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as(&format!("SELECT {COLUMNS} FROM shipments ORDER BY id"))
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(|e| db_err("list_shipments", e))?;

        rows.into_iter().map(Shipment::try_from).collect()
    }

    async fn find(&self, scope: &TenantScope, id: i64) -> Result<Option<Shipment>, CrmError> {
        let company_id = scope.company_id();
        let row: Option<ShipmentRecord> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM shipments WHERE id = ? AND (? IS NULL OR company_id = ?)"
        ))
        .bind(id)
        .bind(company_id)
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_err("find_shipment", e))?;

        row.map(Shipment::try_from).transpose()
    }

    async fn create(&self, company_id: i64, new: NewShipment) -> Result<Shipment, CrmError> {
        let now = Utc::now();
        let row: ShipmentRecord = sqlx::query_as(&format!(
            "INSERT INTO shipments (company_id, invoice_id, carrier, tracking_number, status, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING {COLUMNS}"
        ))
        .bind(company_id)
        .bind(new.invoice_id)
        .bind(&new.carrier)
        .bind(&new.tracking_number)
        .bind(ShipmentStatus::Pending.as_str())
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_err("create_shipment", e))?;

        row.try_into()
    }

    async fn update(
        &self,
        scope: &TenantScope,
        id: i64,
        update: ShipmentUpdate,
    ) -> Result<Shipment, CrmError> {
        let company_id = scope.company_id();
        let row: Option<ShipmentRecord> = sqlx::query_as(&format!(
            "UPDATE shipments SET carrier = ?, tracking_number = ?, updated_at = ? \
             WHERE id = ? AND (? IS NULL OR company_id = ?) RETURNING {COLUMNS}"
        ))
        .bind(&update.carrier)
        .bind(&update.tracking_number)
        .bind(Utc::now())
        .bind(id)
        .bind(company_id)
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_err("update_shipment", e))?;

        row.ok_or(CrmError::NotFound)?.try_into()
    }

    async fn set_status(
        &self,
        scope: &TenantScope,
        id: i64,
        status: ShipmentStatus,
    ) -> Result<Shipment, CrmError> {
        let company_id = scope.company_id();
        let now = Utc::now();
        // IN_TRANSIT stamps shipped_at, DELIVERED stamps delivered_at.
        let row: Option<ShipmentRecord> = sqlx::query_as(&format!(
            "UPDATE shipments SET status = ?, \
             shipped_at = CASE WHEN ? = 'IN_TRANSIT' THEN ? ELSE shipped_at END, \
             delivered_at = CASE WHEN ? = 'DELIVERED' THEN ? ELSE delivered_at END, \
             updated_at = ? \
             WHERE id = ? AND (? IS NULL OR company_id = ?) RETURNING {COLUMNS}"
        ))
        .bind(status.as_str())
        .bind(status.as_str())
        .bind(now)
        .bind(status.as_str())
        .bind(now)
        .bind(now)
        .bind(id)
        .bind(company_id)
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_err("set_shipment_status", e))?;

        row.ok_or(CrmError::NotFound)?.try_into()
    }

    async fn delete(&self, scope: &TenantScope, id: i64) -> Result<(), CrmError> {
        let company_id = scope.company_id();
        let result =
            sqlx::query("DELETE FROM shipments WHERE id = ? AND (? IS NULL OR company_id = ?)")
                .bind(id)
                .bind(company_id)
                .bind(company_id)
                .execute(&self.pool)
                .await
                .map_err(|e| db_err("delete_shipment", e))?;

        if result.rows_affected() == 0 {
            return Err(CrmError::NotFound);
        }

        Ok(())
    }
}
