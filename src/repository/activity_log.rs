use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{CrmError, TenantScope};

/// An audit trail row. Written by mutating handlers, never updated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityLog {
    pub id: i64,
    pub company_id: i64,
    pub user_id: i64,
    /// Verb, e.g. "create", "update", "delete", "transition", "decide".
    pub action: String,
    /// Entity class, e.g. "customer", "quote".
    pub entity: String,
    pub entity_id: i64,
    pub detail: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewActivity {
    pub company_id: i64,
    pub user_id: i64,
    pub action: String,
    pub entity: String,
    pub entity_id: i64,
    pub detail: Option<String>,
}

#[async_trait]
pub trait ActivityLogRepository: Send + Sync {
    /// Newest first.
    async fn list(&self, scope: &TenantScope) -> Result<Vec<ActivityLog>, CrmError>;
    async fn record(&self, new: NewActivity) -> Result<ActivityLog, CrmError>;
}
