use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{CrmError, TenantScope};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deal {
    pub id: i64,
    pub company_id: i64,
    pub customer_id: i64,
    pub title: String,
    /// Product or service this deal is for, used by the products report.
    pub product: Option<String>,
    pub value_cents: i64,
    pub currency: String,
    pub stage: DealStage,
    pub owner_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Kanban pipeline stages. `Won` and `Lost` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DealStage {
    Qualification,
    Proposal,
    Negotiation,
    Won,
    Lost,
}

impl DealStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            DealStage::Qualification => "QUALIFICATION",
            DealStage::Proposal => "PROPOSAL",
            DealStage::Negotiation => "NEGOTIATION",
            DealStage::Won => "WON",
            DealStage::Lost => "LOST",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "QUALIFICATION" => Some(DealStage::Qualification),
            "PROPOSAL" => Some(DealStage::Proposal),
            "NEGOTIATION" => Some(DealStage::Negotiation),
            "WON" => Some(DealStage::Won),
            "LOST" => Some(DealStage::Lost),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, DealStage::Won | DealStage::Lost)
    }

    /// Stage transition table. Deals move forward one stage at a time,
    /// may fall back one stage, and can be lost from any open stage.
    pub fn can_transition(&self, next: DealStage) -> bool {
        use DealStage::*;
        matches!(
            (self, next),
            (Qualification, Proposal)
                | (Proposal, Negotiation)
                | (Proposal, Qualification)
                | (Negotiation, Proposal)
                | (Negotiation, Won)
                | (Qualification, Lost)
                | (Proposal, Lost)
                | (Negotiation, Lost)
        )
    }

    pub fn transition(&self, next: DealStage) -> Result<DealStage, CrmError> {
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
pub struct NewDeal {
    pub customer_id: i64,
    pub title: String,
    pub product: Option<String>,
    pub value_cents: i64,
    pub currency: String,
    pub owner_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DealUpdate {
    pub title: String,
    pub product: Option<String>,
    pub value_cents: i64,
    pub currency: String,
    pub owner_id: Option<i64>,
}

#[async_trait]
pub trait DealRepository: Send + Sync {
    async fn list(&self, scope: &TenantScope) -> Result<Vec<Deal>, CrmError>;
    async fn find(&self, scope: &TenantScope, id: i64) -> Result<Option<Deal>, CrmError>;
    async fn create(&self, company_id: i64, new: NewDeal) -> Result<Deal, CrmError>;
    async fn update(
        &self,
        scope: &TenantScope,
        id: i64,
        update: DealUpdate,
    ) -> Result<Deal, CrmError>;
    /// Persists an already-validated stage change.
    async fn set_stage(
        &self,
        scope: &TenantScope,
        id: i64,
        stage: DealStage,
    ) -> Result<Deal, CrmError>;
    async fn delete(&self, scope: &TenantScope, id: i64) -> Result<(), CrmError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_roundtrip() {
        for stage in [
            DealStage::Qualification,
            DealStage::Proposal,
            DealStage::Negotiation,
            DealStage::Won,
            DealStage::Lost,
        ] {
            assert_eq!(DealStage::from_str(stage.as_str()), Some(stage));
        }
    }

    #[test]
    fn test_forward_transitions() {
        assert!(DealStage::Qualification.can_transition(DealStage::Proposal));
        assert!(DealStage::Proposal.can_transition(DealStage::Negotiation));
        assert!(DealStage::Negotiation.can_transition(DealStage::Won));
    }

    #[test]
    fn test_no_stage_skipping() {
        assert!(!DealStage::Qualification.can_transition(DealStage::Negotiation));
        assert!(!DealStage::Qualification.can_transition(DealStage::Won));
        assert!(!DealStage::Proposal.can_transition(DealStage::Won));
    }

    #[test]
    fn test_lost_from_any_open_stage() {
        assert!(DealStage::Qualification.can_transition(DealStage::Lost));
        assert!(DealStage::Proposal.can_transition(DealStage::Lost));
        assert!(DealStage::Negotiation.can_transition(DealStage::Lost));
    }

    #[test]
    fn test_terminal_stages_frozen() {
        for next in [
            DealStage::Qualification,
            DealStage::Proposal,
            DealStage::Negotiation,
            DealStage::Won,
            DealStage::Lost,
        ] {
            assert!(!DealStage::Won.can_transition(next));
            assert!(!DealStage::Lost.can_transition(next));
        }
    }

    #[test]
    fn test_transition_error_detail() {
        let err = DealStage::Won.transition(DealStage::Proposal).unwrap_err();
        assert_eq!(
            err,
            CrmError::InvalidTransition {
                from: "WON".to_owned(),
                to: "PROPOSAL".to_owned(),
            }
        );
    }
}
