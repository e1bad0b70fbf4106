use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{CrmError, TenantScope};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: i64,
    pub company_id: i64,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub status: CustomerStatus,
    pub owner_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Lifecycle of a customer record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CustomerStatus {
    Lead,
    Prospect,
    Active,
    Churned,
}

impl CustomerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CustomerStatus::Lead => "LEAD",
            CustomerStatus::Prospect => "PROSPECT",
            CustomerStatus::Active => "ACTIVE",
            CustomerStatus::Churned => "CHURNED",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "LEAD" => Some(CustomerStatus::Lead),
            "PROSPECT" => Some(CustomerStatus::Prospect),
            "ACTIVE" => Some(CustomerStatus::Active),
            "CHURNED" => Some(CustomerStatus::Churned),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCustomer {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub status: Option<CustomerStatus>,
    pub owner_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CustomerUpdate {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub status: CustomerStatus,
    pub owner_id: Option<i64>,
}

#[async_trait]
pub trait CustomerRepository: Send + Sync {
    async fn list(&self, scope: &TenantScope) -> Result<Vec<Customer>, CrmError>;
    async fn find(&self, scope: &TenantScope, id: i64) -> Result<Option<Customer>, CrmError>;
    async fn create(&self, company_id: i64, new: NewCustomer) -> Result<Customer, CrmError>;
    async fn update(
        &self,
        scope: &TenantScope,
        id: i64,
        update: CustomerUpdate,
    ) -> Result<Customer, CrmError>;
    async fn delete(&self, scope: &TenantScope, id: i64) -> Result<(), CrmError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrip() {
        for status in [
            CustomerStatus::Lead,
            CustomerStatus::Prospect,
            CustomerStatus::Active,
            CustomerStatus::Churned,
        ] {
            assert_eq!(CustomerStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(CustomerStatus::from_str("VIP"), None);
    }
}
