//! In-memory session storage.
//!
//! Suitable for development, testing, and single-instance deployments.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::crypto::generate_token;
use crate::CrmError;

use super::repository::SessionRepository;
use super::{Session, SessionData};

/// Sessions in a `HashMap` behind a `RwLock`, keyed by session ID.
///
/// Sessions are lost when the process restarts.
#[derive(Clone, Default)]
pub struct InMemorySessionRepository {
    sessions: Arc<RwLock<HashMap<String, SessionData>>>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.read().map(|guard| guard.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn create(&self, data: SessionData) -> Result<String, CrmError> {
        let session_id = generate_token(32);

        self.sessions
            .write()
            .map_err(|_| CrmError::DatabaseError("Lock poisoned".to_owned()))?
            .insert(session_id.clone(), data);

        Ok(session_id)
    }

    async fn find(&self, session_id: &str) -> Result<Option<Session>, CrmError> {
        let sessions = self
            .sessions
            .read()
            .map_err(|_| CrmError::DatabaseError("Lock poisoned".to_owned()))?;

        Ok(sessions.get(session_id).map(|data| Session {
            id: session_id.to_owned(),
            data: data.clone(),
        }))
    }

    async fn extend(
        &self,
        session_id: &str,
        new_expires_at: DateTime<Utc>,
    ) -> Result<(), CrmError> {
        if let Some(data) = self
            .sessions
            .write()
            .map_err(|_| CrmError::DatabaseError("Lock poisoned".to_owned()))?
            .get_mut(session_id)
        {
            data.expires_at = new_expires_at;
        }

        Ok(())
    }

    async fn destroy(&self, session_id: &str) -> Result<(), CrmError> {
        self.sessions
            .write()
            .map_err(|_| CrmError::DatabaseError("Lock poisoned".to_owned()))?
            .remove(session_id);

        Ok(())
    }

    async fn destroy_user_sessions(&self, user_id: i64) -> Result<(), CrmError> {
        self.sessions
            .write()
            .map_err(|_| CrmError::DatabaseError("Lock poisoned".to_owned()))?
            .retain(|_, data| data.user_id != user_id);

        Ok(())
    }

    #[allow(clippy::significant_drop_tightening)]
    async fn prune_expired(&self) -> Result<u64, CrmError> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| CrmError::DatabaseError("Lock poisoned".to_owned()))?;

        let now = Utc::now();
        let before_count = sessions.len();

        sessions.retain(|_, data| data.expires_at > now);

        let pruned = before_count.saturating_sub(sessions.len());
        Ok(u64::try_from(pruned).unwrap_or(u64::MAX))
    }
}
