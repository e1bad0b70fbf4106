//! Failed-login tracking for brute-force lockout.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::CrmError;

#[derive(Debug, Clone)]
pub struct LoginAttempt {
    pub email: String,
    pub success: bool,
    pub ip_address: Option<String>,
    pub attempted_at: DateTime<Utc>,
}

#[async_trait]
pub trait RateLimiterRepository: Send + Sync {
    async fn record_attempt(
        &self,
        email: &str,
        success: bool,
        ip_address: Option<&str>,
    ) -> Result<(), CrmError>;

    /// Number of failed attempts for `email` since `since`.
    async fn recent_failed_attempts(
        &self,
        email: &str,
        since: DateTime<Utc>,
    ) -> Result<u32, CrmError>;

    /// Clears attempts after a successful login.
    async fn clear_attempts(&self, email: &str) -> Result<(), CrmError>;
}

/// In-memory attempt log for tests and single-instance runs.
#[derive(Clone, Default)]
pub struct InMemoryRateLimiter {
    attempts: Arc<Mutex<Vec<LoginAttempt>>>,
}

impl InMemoryRateLimiter {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RateLimiterRepository for InMemoryRateLimiter {
    async fn record_attempt(
        &self,
        email: &str,
        success: bool,
        ip_address: Option<&str>,
    ) -> Result<(), CrmError> {
        self.attempts
            .lock()
            .map_err(|_| CrmError::DatabaseError("Lock poisoned".to_owned()))?
            .push(LoginAttempt {
                email: email.to_owned(),
                success,
                ip_address: ip_address.map(ToOwned::to_owned),
                attempted_at: Utc::now(),
            });
        Ok(())
    }

    async fn recent_failed_attempts(
        &self,
        email: &str,
        since: DateTime<Utc>,
    ) -> Result<u32, CrmError> {
        let attempts = self
            .attempts
            .lock()
            .map_err(|_| CrmError::DatabaseError("Lock poisoned".to_owned()))?;

        let count = attempts
            .iter()
            .filter(|a| a.email == email && !a.success && a.attempted_at >= since)
            .count();

        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }

    async fn clear_attempts(&self, email: &str) -> Result<(), CrmError> {
        self.attempts
            .lock()
            .map_err(|_| CrmError::DatabaseError("Lock poisoned".to_owned()))?
            .retain(|a| a.email != email);
        Ok(())
    }
}
