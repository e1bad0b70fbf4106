use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{CrmError, TenantScope};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub company_id: i64,
    pub user_id: i64,
    pub title: String,
    pub body: String,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn is_read(&self) -> bool {
        self.read_at.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct NewNotification {
    pub company_id: i64,
    pub user_id: i64,
    pub title: String,
    pub body: String,
}

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Notifications addressed to `user_id`, newest first.
    async fn list_for_user(
        &self,
        scope: &TenantScope,
        user_id: i64,
    ) -> Result<Vec<Notification>, CrmError>;
    async fn create(&self, new: NewNotification) -> Result<Notification, CrmError>;
    /// Marks a notification read; only the addressee may do so.
    async fn mark_read(
        &self,
        scope: &TenantScope,
        id: i64,
        user_id: i64,
    ) -> Result<Notification, CrmError>;
}
