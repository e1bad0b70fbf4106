//! Session repository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::CrmError;

use super::{Session, SessionData};

/// Storage for server-side session records.
///
/// Implementations:
/// - [`InMemorySessionRepository`](super::InMemorySessionRepository): for tests and single-instance runs
/// - [`SqliteSessionRepository`](crate::sqlite::SqliteSessionRepository): persistent storage
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Creates a new session and returns the session ID.
    async fn create(&self, data: SessionData) -> Result<String, CrmError>;

    /// Finds a session by its ID.
    async fn find(&self, session_id: &str) -> Result<Option<Session>, CrmError>;

    /// Extends a session's expiry time (for sliding window).
    async fn extend(&self, session_id: &str, new_expires_at: DateTime<Utc>)
        -> Result<(), CrmError>;

    /// Destroys a session.
    async fn destroy(&self, session_id: &str) -> Result<(), CrmError>;

    /// Destroys all sessions for a user.
    async fn destroy_user_sessions(&self, user_id: i64) -> Result<(), CrmError>;

    /// Removes expired sessions.
    ///
    /// Returns the number of sessions pruned.
    async fn prune_expired(&self) -> Result<u64, CrmError>;
}
