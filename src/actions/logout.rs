use std::sync::Arc;

use crate::session::SessionRepository;
use crate::CrmError;

/// Destroys the server-side session record.
pub struct LogoutAction {
    sessions: Arc<dyn SessionRepository>,
}

impl LogoutAction {
    pub fn new(sessions: Arc<dyn SessionRepository>) -> Self {
        Self { sessions }
    }

    pub async fn execute(&self, session_id: &str) -> Result<(), CrmError> {
        self.sessions.destroy(session_id).await
    }
}
