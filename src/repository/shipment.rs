use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{CrmError, TenantScope};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shipment {
    pub id: i64,
    pub company_id: i64,
    pub invoice_id: i64,
    pub carrier: String,
    pub tracking_number: Option<String>,
    pub status: ShipmentStatus,
    pub shipped_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// PENDING → IN_TRANSIT → DELIVERED | RETURNED.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShipmentStatus {
    Pending,
    InTransit,
    Delivered,
    Returned,
}

impl ShipmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShipmentStatus::Pending => "PENDING",
            ShipmentStatus::InTransit => "IN_TRANSIT",
            ShipmentStatus::Delivered => "DELIVERED",
            ShipmentStatus::Returned => "RETURNED",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(ShipmentStatus::Pending),
            "IN_TRANSIT" => Some(ShipmentStatus::InTransit),
            "DELIVERED" => Some(ShipmentStatus::Delivered),
            "RETURNED" => Some(ShipmentStatus::Returned),
            _ => None,
        }
    }

    pub fn can_transition(&self, next: ShipmentStatus) -> bool {
        use ShipmentStatus::*;
        matches!(
            (self, next),
            (Pending, InTransit) | (InTransit, Delivered) | (InTransit, Returned)
        )
    }

    pub fn transition(&self, next: ShipmentStatus) -> Result<ShipmentStatus, CrmError> {
        if self.can_transition(next) {
            Ok(next)
        } else {
            Err(CrmError::InvalidTransition {
                from: self.as_str().to_owned(),
                to: next.as_str().to_owned(),
            })
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewShipment {
    pub invoice_id: i64,
    pub carrier: String,
    pub tracking_number: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShipmentUpdate {
    pub carrier: String,
    pub tracking_number: Option<String>,
}

#[async_trait]
pub trait ShipmentRepository: Send + Sync {
    async fn list(&self, scope: &TenantScope) -> Result<Vec<Shipment>, CrmError>;
    async fn find(&self, scope: &TenantScope, id: i64) -> Result<Option<Shipment>, CrmError>;
    async fn create(&self, company_id: i64, new: NewShipment) -> Result<Shipment, CrmError>;
    async fn update(
        &self,
        scope: &TenantScope,
        id: i64,
        update: ShipmentUpdate,
    ) -> Result<Shipment, CrmError>;
    /// Persists a validated status change; implementations stamp
    /// `shipped_at` on IN_TRANSIT and `delivered_at` on DELIVERED.
    async fn set_status(
        &self,
        scope: &TenantScope,
        id: i64,
        status: ShipmentStatus,
    ) -> Result<Shipment, CrmError>;
    async fn delete(&self, scope: &TenantScope, id: i64) -> Result<(), CrmError>;
}
