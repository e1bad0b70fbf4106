use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::authz::Role;
use crate::CrmError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub hashed_password: String,
    pub role: Role,
    /// None for super-admins.
    pub company_id: Option<i64>,
    /// Joined from the companies table; None for super-admins.
    pub company_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub hashed_password: String,
    pub role: Role,
    pub company_id: Option<i64>,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, CrmError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, CrmError>;
    async fn create_user(&self, new: NewUser) -> Result<User, CrmError>;
}
