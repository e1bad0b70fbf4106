use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{CrmError, TenantScope};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalRequest {
    pub id: i64,
    pub company_id: i64,
    pub kind: ApprovalKind,
    /// ID of the record the approval concerns (quote, invoice, ...).
    pub subject_id: i64,
    pub requested_by: i64,
    pub status: ApprovalStatus,
    pub decided_by: Option<i64>,
    pub decided_at: Option<DateTime<Utc>>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalKind {
    QuoteDiscount,
    InvoiceVoid,
    DealClosure,
}

impl ApprovalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalKind::QuoteDiscount => "QUOTE_DISCOUNT",
            ApprovalKind::InvoiceVoid => "INVOICE_VOID",
            ApprovalKind::DealClosure => "DEAL_CLOSURE",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "QUOTE_DISCOUNT" => Some(ApprovalKind::QuoteDiscount),
            "INVOICE_VOID" => Some(ApprovalKind::InvoiceVoid),
            "DEAL_CLOSURE" => Some(ApprovalKind::DealClosure),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "PENDING",
            ApprovalStatus::Approved => "APPROVED",
            ApprovalStatus::Rejected => "REJECTED",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(ApprovalStatus::Pending),
            "APPROVED" => Some(ApprovalStatus::Approved),
            "REJECTED" => Some(ApprovalStatus::Rejected),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewApproval {
    pub kind: ApprovalKind,
    pub subject_id: i64,
    pub note: Option<String>,
}

#[async_trait]
pub trait ApprovalRepository: Send + Sync {
    async fn list(&self, scope: &TenantScope) -> Result<Vec<ApprovalRequest>, CrmError>;
    async fn find(&self, scope: &TenantScope, id: i64)
        -> Result<Option<ApprovalRequest>, CrmError>;
    async fn create(
        &self,
        company_id: i64,
        requested_by: i64,
        new: NewApproval,
    ) -> Result<ApprovalRequest, CrmError>;
    /// Records a decision on a pending request.
    async fn decide(
        &self,
        scope: &TenantScope,
        id: i64,
        status: ApprovalStatus,
        decided_by: i64,
        note: Option<String>,
    ) -> Result<ApprovalRequest, CrmError>;
}
