use std::sync::Arc;

use serde::Deserialize;

use crate::assist::CompletionClient;
use crate::CrmError;

/// What kind of text the caller wants drafted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComposeKind {
    FollowupEmail,
    DealSummary,
    TicketReply,
}

impl ComposeKind {
    fn instruction(&self) -> &'static str {
        match self {
            ComposeKind::FollowupEmail => {
                "Write a short, professional follow-up email based on the following context."
            }
            ComposeKind::DealSummary => {
                "Summarize the state of the following deal in a few sentences."
            }
            ComposeKind::TicketReply => {
                "Draft a courteous support reply for the following ticket."
            }
        }
    }
}

/// Provider-backed text drafting for the assist endpoint.
pub struct ComposeAction {
    client: Arc<dyn CompletionClient>,
}

impl ComposeAction {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self { client }
    }

    pub async fn execute(&self, kind: ComposeKind, context: &str) -> Result<String, CrmError> {
        let context = context.trim();
        if context.is_empty() {
            return Err(CrmError::Validation("Context cannot be empty".to_owned()));
        }
        if context.len() > 8000 {
            return Err(CrmError::Validation(
                "Context is too long (max 8000 characters)".to_owned(),
            ));
        }

        let prompt = format!("{}\n\n{}", kind.instruction(), context);
        self.client.complete(&prompt).await
    }
}

#[cfg(test)]
mod tests {
    use crate::assist::MockCompletionClient;

    use super::*;

    #[tokio::test]
    async fn test_compose_returns_generated_text() {
        let action = ComposeAction::new(Arc::new(MockCompletionClient::new("Hello Jane, ...")));
        let text = action
            .execute(ComposeKind::FollowupEmail, "Customer: Jane, met at expo")
            .await
            .unwrap();
        assert_eq!(text, "Hello Jane, ...");
    }

    #[tokio::test]
    async fn test_empty_context_rejected() {
        let action = ComposeAction::new(Arc::new(MockCompletionClient::default()));
        let err = action.execute(ComposeKind::DealSummary, "   ").await.unwrap_err();
        assert!(matches!(err, CrmError::Validation(_)));
    }

    #[tokio::test]
    async fn test_oversized_context_rejected() {
        let action = ComposeAction::new(Arc::new(MockCompletionClient::default()));
        let err = action
            .execute(ComposeKind::TicketReply, &"x".repeat(8001))
            .await
            .unwrap_err();
        assert!(matches!(err, CrmError::Validation(_)));
    }
}
