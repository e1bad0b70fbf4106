//! Central authorization policy.
//!
//! Every handler consults [`authorize`] exactly once before touching a
//! repository. Roles are tenant-scoped except [`Role::SuperAdmin`], which
//! operates across tenants.

use serde::{Deserialize, Serialize};

use crate::CrmError;

/// A user's role within their company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    SuperAdmin,
    Admin,
    Manager,
    Agent,
}

impl Role {
    /// String form used for database storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "SUPER_ADMIN",
            Role::Admin => "ADMIN",
            Role::Manager => "MANAGER",
            Role::Agent => "AGENT",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "SUPER_ADMIN" => Some(Role::SuperAdmin),
            "ADMIN" => Some(Role::Admin),
            "MANAGER" => Some(Role::Manager),
            "AGENT" => Some(Role::Agent),
            _ => None,
        }
    }

    pub fn is_super_admin(&self) -> bool {
        matches!(self, Role::SuperAdmin)
    }
}

/// A protected resource class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Customer,
    Deal,
    Quote,
    Invoice,
    Shipment,
    Task,
    Ticket,
    Vendor,
    Approval,
    Notification,
    Report,
    Assist,
    Activity,
}

/// An operation on a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    List,
    Read,
    Create,
    Update,
    Delete,
    Transition,
    Decide,
}

/// Returns true if `role` may perform `action` on `resource`.
pub fn allows(role: Role, resource: Resource, action: Action) -> bool {
    match role {
        // Admins are unrestricted; super-admins additionally bypass the
        // tenant filter at query time (see session::TenantScope).
        Role::SuperAdmin | Role::Admin => true,

        Role::Manager => match (resource, action) {
            // Deciding approvals stays with admins.
            (Resource::Approval, Action::Decide) => false,
            // Issued financial documents are not deletable by managers.
            (Resource::Invoice, Action::Delete) => false,
            _ => true,
        },

        Role::Agent => match action {
            Action::Delete | Action::Decide => false,
            _ => !matches!(resource, Resource::Vendor) || action == Action::List || action == Action::Read,
        },
    }
}

/// Policy check that maps a denial to [`CrmError::Forbidden`].
pub fn authorize(role: Role, resource: Resource, action: Action) -> Result<(), CrmError> {
    if allows(role, resource, action) {
        Ok(())
    } else {
        log::warn!(
            target: "atrium::authz",
            "msg=\"denied\" role=\"{}\" resource={resource:?} action={action:?}",
            role.as_str()
        );
        Err(CrmError::Forbidden)
    }
}
