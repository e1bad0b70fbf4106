use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{CrmError, TenantScope};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub id: i64,
    pub company_id: i64,
    pub customer_id: i64,
    pub quote_id: Option<i64>,
    pub number: String,
    pub total_cents: i64,
    pub currency: String,
    pub status: InvoiceStatus,
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// DRAFT → ISSUED → PAID | VOID. An issued invoice can still be voided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceStatus {
    Draft,
    Issued,
    Paid,
    Void,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "DRAFT",
            InvoiceStatus::Issued => "ISSUED",
            InvoiceStatus::Paid => "PAID",
            InvoiceStatus::Void => "VOID",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "DRAFT" => Some(InvoiceStatus::Draft),
            "ISSUED" => Some(InvoiceStatus::Issued),
            "PAID" => Some(InvoiceStatus::Paid),
            "VOID" => Some(InvoiceStatus::Void),
            _ => None,
        }
    }

    pub fn can_transition(&self, next: InvoiceStatus) -> bool {
        use InvoiceStatus::*;
        matches!(
            (self, next),
            (Draft, Issued) | (Draft, Void) | (Issued, Paid) | (Issued, Void)
        )
    }

    pub fn transition(&self, next: InvoiceStatus) -> Result<InvoiceStatus, CrmError> {
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
pub struct NewInvoice {
    pub customer_id: i64,
    pub quote_id: Option<i64>,
    pub number: String,
    pub total_cents: i64,
    pub currency: String,
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InvoiceUpdate {
    pub total_cents: i64,
    pub currency: String,
    pub due_date: Option<NaiveDate>,
}

#[async_trait]
pub trait InvoiceRepository: Send + Sync {
    async fn list(&self, scope: &TenantScope) -> Result<Vec<Invoice>, CrmError>;
    async fn find(&self, scope: &TenantScope, id: i64) -> Result<Option<Invoice>, CrmError>;
    async fn create(&self, company_id: i64, new: NewInvoice) -> Result<Invoice, CrmError>;
    /// Only draft invoices are editable; implementations enforce this.
    async fn update(
        &self,
        scope: &TenantScope,
        id: i64,
        update: InvoiceUpdate,
    ) -> Result<Invoice, CrmError>;
    async fn set_status(
        &self,
        scope: &TenantScope,
        id: i64,
        status: InvoiceStatus,
    ) -> Result<Invoice, CrmError>;
    async fn delete(&self, scope: &TenantScope, id: i64) -> Result<(), CrmError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_then_pay() {
        assert!(InvoiceStatus::Draft.can_transition(InvoiceStatus::Issued));
        assert!(InvoiceStatus::Issued.can_transition(InvoiceStatus::Paid));
    }

    #[test]
    fn test_void_paths() {
        assert!(InvoiceStatus::Draft.can_transition(InvoiceStatus::Void));
        assert!(InvoiceStatus::Issued.can_transition(InvoiceStatus::Void));
        assert!(!InvoiceStatus::Paid.can_transition(InvoiceStatus::Void));
    }

    #[test]
    fn test_cannot_pay_draft() {
        assert!(!InvoiceStatus::Draft.can_transition(InvoiceStatus::Paid));
    }

    #[test]
    fn test_terminal_states() {
        for next in [
            InvoiceStatus::Draft,
            InvoiceStatus::Issued,
            InvoiceStatus::Paid,
            InvoiceStatus::Void,
        ] {
            assert!(!InvoiceStatus::Paid.can_transition(next));
            assert!(!InvoiceStatus::Void.can_transition(next));
        }
    }
}
