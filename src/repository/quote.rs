use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{CrmError, TenantScope};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub id: i64,
    pub company_id: i64,
    pub customer_id: i64,
    pub deal_id: Option<i64>,
    pub number: String,
    pub total_cents: i64,
    pub currency: String,
    pub status: QuoteStatus,
    pub valid_until: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// DRAFT → SENT → ACCEPTED | DECLINED. Accepted and declined are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuoteStatus {
    Draft,
    Sent,
    Accepted,
    Declined,
}

impl QuoteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteStatus::Draft => "DRAFT",
            QuoteStatus::Sent => "SENT",
            QuoteStatus::Accepted => "ACCEPTED",
            QuoteStatus::Declined => "DECLINED",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "DRAFT" => Some(QuoteStatus::Draft),
            "SENT" => Some(QuoteStatus::Sent),
            "ACCEPTED" => Some(QuoteStatus::Accepted),
            "DECLINED" => Some(QuoteStatus::Declined),
            _ => None,
        }
    }

    pub fn can_transition(&self, next: QuoteStatus) -> bool {
        use QuoteStatus::*;
        matches!((self, next), (Draft, Sent) | (Sent, Accepted) | (Sent, Declined))
    }

    pub fn transition(&self, next: QuoteStatus) -> Result<QuoteStatus, CrmError> {
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
pub struct NewQuote {
    pub customer_id: i64,
    pub deal_id: Option<i64>,
    pub number: String,
    pub total_cents: i64,
    pub currency: String,
    pub valid_until: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuoteUpdate {
    pub total_cents: i64,
    pub currency: String,
    pub valid_until: Option<NaiveDate>,
}

#[async_trait]
pub trait QuoteRepository: Send + Sync {
    async fn list(&self, scope: &TenantScope) -> Result<Vec<Quote>, CrmError>;
    async fn find(&self, scope: &TenantScope, id: i64) -> Result<Option<Quote>, CrmError>;
    async fn create(&self, company_id: i64, new: NewQuote) -> Result<Quote, CrmError>;
    /// Only draft quotes are editable; implementations enforce this.
    async fn update(
        &self,
        scope: &TenantScope,
        id: i64,
        update: QuoteUpdate,
    ) -> Result<Quote, CrmError>;
    async fn set_status(
        &self,
        scope: &TenantScope,
        id: i64,
        status: QuoteStatus,
    ) -> Result<Quote, CrmError>;
    async fn delete(&self, scope: &TenantScope, id: i64) -> Result<(), CrmError>;
}
