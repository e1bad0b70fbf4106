use std::sync::Arc;

use crate::repository::{
    ApprovalRepository, ApprovalRequest, ApprovalStatus, NewNotification, NotificationRepository,
};
use crate::{CrmError, TenantScope};

/// Records a decision on an approval request and notifies the requester.
pub struct DecideApprovalAction {
    approvals: Arc<dyn ApprovalRepository>,
    notifications: Arc<dyn NotificationRepository>,
}

impl DecideApprovalAction {
    pub fn new(
        approvals: Arc<dyn ApprovalRepository>,
        notifications: Arc<dyn NotificationRepository>,
    ) -> Self {
        Self {
            approvals,
            notifications,
        }
    }

    pub async fn execute(
        &self,
        scope: &TenantScope,
        approval_id: i64,
        status: ApprovalStatus,
        decided_by: i64,
        note: Option<String>,
    ) -> Result<ApprovalRequest, CrmError> {
        if status == ApprovalStatus::Pending {
            return Err(CrmError::Validation(
                "Decision must be APPROVED or REJECTED".to_owned(),
            ));
        }

        let approval = self
            .approvals
            .decide(scope, approval_id, status, decided_by, note)
            .await?;

        let verdict = match approval.status {
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Rejected => "rejected",
            ApprovalStatus::Pending => unreachable!("decided approvals are never pending"),
        };

        // The decision stands even if the notification write fails.
        if let Err(err) = self
            .notifications
            .create(NewNotification {
                company_id: approval.company_id,
                user_id: approval.requested_by,
                title: format!("Approval request {verdict}"),
                body: format!(
                    "Your {} request #{} was {verdict}.",
                    approval.kind.as_str(),
                    approval.id
                ),
            })
            .await
        {
            log::warn!(
                target: "atrium::approvals",
                "msg=\"notification write failed\" approval_id={} error=\"{err}\"",
                approval.id
            );
        }

        Ok(approval)
    }
}
