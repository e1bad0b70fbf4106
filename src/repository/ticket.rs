use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{CrmError, TenantScope};

use super::task::TaskPriority;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub id: i64,
    pub company_id: i64,
    pub customer_id: i64,
    pub subject: String,
    pub body: String,
    pub status: TicketStatus,
    pub priority: TaskPriority,
    pub assignee_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// OPEN → PENDING → RESOLVED → CLOSED, with reopen paths until closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketStatus {
    Open,
    Pending,
    Resolved,
    Closed,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Open => "OPEN",
            TicketStatus::Pending => "PENDING",
            TicketStatus::Resolved => "RESOLVED",
            TicketStatus::Closed => "CLOSED",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "OPEN" => Some(TicketStatus::Open),
            "PENDING" => Some(TicketStatus::Pending),
            "RESOLVED" => Some(TicketStatus::Resolved),
            "CLOSED" => Some(TicketStatus::Closed),
            _ => None,
        }
    }

    pub fn can_transition(&self, next: TicketStatus) -> bool {
        use TicketStatus::*;
        matches!(
            (self, next),
            (Open, Pending)
                | (Pending, Open)
                | (Open, Resolved)
                | (Pending, Resolved)
                | (Resolved, Open)
                | (Resolved, Closed)
        )
    }

    pub fn transition(&self, next: TicketStatus) -> Result<TicketStatus, CrmError> {
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
pub struct NewTicket {
    pub customer_id: i64,
    pub subject: String,
    pub body: String,
    pub priority: Option<TaskPriority>,
    pub assignee_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TicketUpdate {
    pub subject: String,
    pub body: String,
    pub priority: TaskPriority,
    pub assignee_id: Option<i64>,
}

#[async_trait]
pub trait TicketRepository: Send + Sync {
    async fn list(&self, scope: &TenantScope) -> Result<Vec<Ticket>, CrmError>;
    async fn find(&self, scope: &TenantScope, id: i64) -> Result<Option<Ticket>, CrmError>;
    async fn create(&self, company_id: i64, new: NewTicket) -> Result<Ticket, CrmError>;
    async fn update(
        &self,
        scope: &TenantScope,
        id: i64,
        update: TicketUpdate,
    ) -> Result<Ticket, CrmError>;
    async fn set_status(
        &self,
        scope: &TenantScope,
        id: i64,
        status: TicketStatus,
    ) -> Result<Ticket, CrmError>;
    async fn delete(&self, scope: &TenantScope, id: i64) -> Result<(), CrmError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_and_close() {
        assert!(TicketStatus::Open.can_transition(TicketStatus::Resolved));
        assert!(TicketStatus::Resolved.can_transition(TicketStatus::Closed));
    }

    #[test]
    fn test_reopen_before_close() {
        assert!(TicketStatus::Resolved.can_transition(TicketStatus::Open));
        assert!(TicketStatus::Pending.can_transition(TicketStatus::Open));
    }

    #[test]
    fn test_closed_is_final() {
        for next in [
            TicketStatus::Open,
            TicketStatus::Pending,
            TicketStatus::Resolved,
        ] {
            assert!(!TicketStatus::Closed.can_transition(next));
        }
    }

    #[test]
    fn test_cannot_close_unresolved() {
        assert!(!TicketStatus::Open.can_transition(TicketStatus::Closed));
        assert!(!TicketStatus::Pending.can_transition(TicketStatus::Closed));
    }
}
