use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::config::RateLimitConfig;
use crate::crypto::PasswordHasher;
use crate::rate_limit::RateLimiterRepository;
use crate::repository::{User, UserRepository};
use crate::session::{SessionData, SessionRepository};
use crate::validators::validate_email;
use crate::{CrmError, SecretString};

#[derive(Debug)]
pub struct LoginOutcome {
    pub user: User,
    pub session_id: String,
    pub data: SessionData,
}

/// Credential check plus session creation, with failed-attempt lockout.
pub struct LoginAction {
    users: Arc<dyn UserRepository>,
    sessions: Arc<dyn SessionRepository>,
    rate_limiter: Arc<dyn RateLimiterRepository>,
    hasher: PasswordHasher,
    rate_limit: RateLimitConfig,
    session_lifetime: Duration,
}

impl LoginAction {
    pub fn new(
        users: Arc<dyn UserRepository>,
        sessions: Arc<dyn SessionRepository>,
        rate_limiter: Arc<dyn RateLimiterRepository>,
        rate_limit: RateLimitConfig,
        session_lifetime: Duration,
    ) -> Self {
        Self {
            users,
            sessions,
            rate_limiter,
            hasher: PasswordHasher::default(),
            rate_limit,
            session_lifetime,
        }
    }

    pub async fn execute(
        &self,
        email: &str,
        password: &SecretString,
        ip_address: Option<&str>,
    ) -> Result<LoginOutcome, CrmError> {
        validate_email(email)?;

        let window_start = Utc::now() - self.rate_limit.lockout_window;
        let failures = self
            .rate_limiter
            .recent_failed_attempts(email, window_start)
            .await?;
        if failures >= self.rate_limit.max_failed_attempts {
            log::warn!(target: "atrium::auth", "msg=\"login locked out\" email=\"{email}\"");
            return Err(CrmError::TooManyAttempts);
        }

        let found = self.users.find_user_by_email(email).await?;
        let verified = match &found {
            Some(user) => self.hasher.verify(password, &user.hashed_password)?,
            None => false,
        };
        let Some(user) = found.filter(|_| verified) else {
            self.rate_limiter
                .record_attempt(email, false, ip_address)
                .await?;
            return Err(CrmError::InvalidCredentials);
        };

        self.rate_limiter
            .record_attempt(email, true, ip_address)
            .await?;
        self.rate_limiter.clear_attempts(email).await?;

        let now = Utc::now();
        let data = SessionData {
            user_id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
            company_id: user.company_id,
            company_name: user.company_name.clone(),
            created_at: now,
            expires_at: now + self.session_lifetime,
        };

        let session_id = self.sessions.create(data.clone()).await?;

        log::info!(
            target: "atrium::auth",
            "msg=\"login\" user_id={} role=\"{}\"",
            user.id,
            user.role.as_str()
        );

        Ok(LoginOutcome {
            user,
            session_id,
            data,
        })
    }
}
