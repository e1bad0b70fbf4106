mod config;
mod cookie;
mod memory_store;
mod repository;

use chrono::{DateTime, Utc};
pub use config::{SameSite, SessionConfig};
pub use cookie::{removal_cookie_header, session_cookie_header, sign_session_id, verify_signed_cookie};
pub use memory_store::InMemorySessionRepository;
pub use repository::SessionRepository;
use serde::{Deserialize, Serialize};

use crate::authz::Role;

/// Everything a request needs to know about its caller, resolved once at
/// login and revalidated on every request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    pub user_id: i64,
    pub email: String,
    pub name: String,
    pub role: Role,
    /// None for super-admins, who are not bound to a tenant.
    pub company_id: Option<i64>,
    pub company_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub data: SessionData,
}

impl Session {
    pub fn new(id: String, data: SessionData) -> Self {
        Self { id, data }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() > self.data.expires_at
    }

    /// Derives the tenant scope every downstream query is filtered by.
    pub fn scope(&self) -> TenantScope {
        TenantScope::for_user(self.data.role, self.data.company_id)
    }
}

/// Row-level visibility for queries.
///
/// Non-super-admin callers are always scoped to their own company;
/// super-admins query across tenants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TenantScope {
    Company(i64),
    Global,
}

impl TenantScope {
    pub fn for_user(role: Role, company_id: Option<i64>) -> Self {
        match (role, company_id) {
            (Role::SuperAdmin, _) => TenantScope::Global,
            (_, Some(id)) => TenantScope::Company(id),
            // A tenant user without a company cannot see any rows.
            (_, None) => TenantScope::Company(-1),
        }
    }

    pub fn company_id(&self) -> Option<i64> {
        match self {
            TenantScope::Company(id) => Some(*id),
            TenantScope::Global => None,
        }
    }

    /// Key under which report cache entries for this scope are stored.
    pub fn cache_key(&self) -> String {
        match self {
            TenantScope::Company(id) => id.to_string(),
            TenantScope::Global => "global".to_owned(),
        }
    }

    /// True if a row belonging to `company_id` is visible in this scope.
    pub fn can_see(&self, company_id: i64) -> bool {
        match self {
            TenantScope::Company(own) => *own == company_id,
            TenantScope::Global => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn session_data(role: Role, company_id: Option<i64>) -> SessionData {
        SessionData {
            user_id: 1,
            email: "test@example.com".to_owned(),
            name: "Test User".to_owned(),
            role,
            company_id,
            company_name: company_id.map(|_| "Acme".to_owned()),
            created_at: Utc::now(),
            expires_at: Utc::now() + Duration::hours(2),
        }
    }

    #[test]
    fn test_session_not_expired() {
        let session = Session::new("s1".to_owned(), session_data(Role::Agent, Some(7)));
        assert!(!session.is_expired());
    }

    #[test]
    fn test_session_expired() {
        let mut data = session_data(Role::Agent, Some(7));
        data.expires_at = Utc::now() - Duration::hours(1);
        let session = Session::new("s1".to_owned(), data);
        assert!(session.is_expired());
    }

    #[test]
    fn test_scope_for_tenant_user() {
        let session = Session::new("s1".to_owned(), session_data(Role::Manager, Some(7)));
        assert_eq!(session.scope(), TenantScope::Company(7));
        assert!(session.scope().can_see(7));
        assert!(!session.scope().can_see(8));
    }

    #[test]
    fn test_scope_for_super_admin() {
        let session = Session::new("s1".to_owned(), session_data(Role::SuperAdmin, None));
        assert_eq!(session.scope(), TenantScope::Global);
        assert!(session.scope().can_see(7));
        assert!(session.scope().can_see(8));
    }

    #[test]
    fn test_scope_for_orphaned_tenant_user_sees_nothing() {
        let scope = TenantScope::for_user(Role::Agent, None);
        assert!(!scope.can_see(1));
        assert!(!scope.can_see(7));
    }

    #[test]
    fn test_cache_key() {
        assert_eq!(TenantScope::Company(42).cache_key(), "42");
        assert_eq!(TenantScope::Global.cache_key(), "global");
    }
}
