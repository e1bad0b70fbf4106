use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{CrmError, TenantScope};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vendor {
    pub id: i64,
    pub company_id: i64,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewVendor {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VendorUpdate {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub category: Option<String>,
}

#[async_trait]
pub trait VendorRepository: Send + Sync {
    async fn list(&self, scope: &TenantScope) -> Result<Vec<Vendor>, CrmError>;
    async fn find(&self, scope: &TenantScope, id: i64) -> Result<Option<Vendor>, CrmError>;
    async fn create(&self, company_id: i64, new: NewVendor) -> Result<Vendor, CrmError>;
    async fn update(
        &self,
        scope: &TenantScope,
        id: i64,
        update: VendorUpdate,
    ) -> Result<Vendor, CrmError>;
    async fn delete(&self, scope: &TenantScope, id: i64) -> Result<(), CrmError>;
}
