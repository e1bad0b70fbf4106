//! Session resolution for request handlers.

use axum::extract::FromRequestParts;
use axum::http::header::COOKIE;
use axum::http::request::Parts;
use axum::http::HeaderMap;

use crate::authz::Role;
use crate::session::{verify_signed_cookie, Session};
use crate::{CrmError, TenantScope};

use super::error::AppError;
use super::routes::AppState;

/// The resolved caller: a live, unexpired session whose user still exists.
///
/// Every authenticated handler takes this extractor; failures map to 401
/// before the handler body runs.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    session: Session,
}

impl CurrentUser {
    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_id(&self) -> &str {
        &self.session.id
    }

    pub fn user_id(&self) -> i64 {
        self.session.data.user_id
    }

    pub fn role(&self) -> Role {
        self.session.data.role
    }

    pub fn scope(&self) -> TenantScope {
        self.session.scope()
    }

    /// The tenant that newly created rows belong to.
    ///
    /// Super-admins are not bound to a tenant and therefore cannot create
    /// tenant-owned rows.
    pub fn tenant_for_create(&self) -> Result<i64, CrmError> {
        self.session.data.company_id.ok_or_else(|| {
            CrmError::Validation("A tenant identity is required to create records".to_owned())
        })
    }
}

/// Pulls the named cookie's value out of the `Cookie` header.
pub(crate) fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_owned())
}

/// Best-effort client address for the login attempt log.
pub fn client_ip(headers: &HeaderMap) -> Option<String> {
    if let Some(forwarded) = headers.get("x-forwarded-for") {
        if let Ok(value) = forwarded.to_str() {
            // X-Forwarded-For can carry a chain; the first hop is the client.
            if let Some(ip) = value.split(',').next() {
                return Some(ip.trim().to_owned());
            }
        }
    }

    headers
        .get("x-real-ip")
        .and_then(|value| value.to_str().ok())
        .map(ToOwned::to_owned)
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let cookie = extract_cookie(&parts.headers, &state.session_config.cookie_name)
            .ok_or(AppError(CrmError::Unauthorized))?;

        let session_id = verify_signed_cookie(&cookie, &state.session_config.secret_key)
            .ok_or(AppError(CrmError::Unauthorized))?;

        let session = state
            .sessions
            .find(&session_id)
            .await
            .map_err(AppError)?
            .ok_or(AppError(CrmError::Unauthorized))?;

        if session.is_expired() {
            // Expired sessions are destroyed on sight.
            let _ = state.sessions.destroy(&session_id).await;
            return Err(AppError(CrmError::Unauthorized));
        }

        // A session whose user has since been deleted is no session at all.
        if state
            .users
            .find_user_by_id(session.data.user_id)
            .await
            .map_err(AppError)?
            .is_none()
        {
            let _ = state.sessions.destroy(&session_id).await;
            return Err(AppError(CrmError::Unauthorized));
        }

        Ok(CurrentUser { session })
    }
}
