//! Login, logout, and session introspection.

use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::actions::{LoginAction, LogoutAction};
use crate::api::extract::extract_cookie;
use crate::api::types::LoginRequest;
use crate::api::{client_ip, AppError, AppState, CurrentUser, MessageResponse, SessionUserResponse};
use crate::session::{removal_cookie_header, session_cookie_header, sign_session_id, verify_signed_cookie};
use crate::{CrmError, SecretString};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
}

fn set_cookie(response: &mut Response, value: &str) -> Result<(), AppError> {
    let header_value = HeaderValue::from_str(value)
        .map_err(|_| AppError(CrmError::ConfigurationError("invalid cookie value".to_owned())))?;
    response.headers_mut().insert(header::SET_COOKIE, header_value);
    Ok(())
}

/// POST /api/auth/login
async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<LoginRequest>,
) -> Result<Response, AppError> {
    let action = LoginAction::new(
        state.users.clone(),
        state.sessions.clone(),
        state.rate_limiter.clone(),
        state.rate_limit.clone(),
        state.session_config.session_lifetime,
    );

    let ip = client_ip(&headers);
    let outcome = action
        .execute(&body.email, &SecretString::new(&body.password), ip.as_deref())
        .await?;

    let signed = sign_session_id(&outcome.session_id, &state.session_config.secret_key);
    let cookie = session_cookie_header(&signed, &state.session_config);

    let mut response = Json(SessionUserResponse {
        user_id: outcome.user.id,
        email: outcome.user.email,
        name: outcome.user.name,
        role: outcome.user.role,
        company_id: outcome.user.company_id,
        company_name: outcome.user.company_name,
    })
    .into_response();
    set_cookie(&mut response, &cookie)?;

    Ok(response)
}

/// POST /api/auth/logout
///
/// Destroys the session if the cookie resolves to one; clears the cookie
/// either way.
async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, AppError> {
    if let Some(cookie) = extract_cookie(&headers, &state.session_config.cookie_name) {
        if let Some(session_id) = verify_signed_cookie(&cookie, &state.session_config.secret_key) {
            LogoutAction::new(state.sessions.clone())
                .execute(&session_id)
                .await?;
        }
    }

    let mut response = (
        StatusCode::OK,
        Json(MessageResponse {
            message: "Successfully logged out".to_owned(),
        }),
    )
        .into_response();
    set_cookie(&mut response, &removal_cookie_header(&state.session_config))?;

    Ok(response)
}

/// GET /api/auth/me
async fn me(user: CurrentUser) -> Json<SessionUserResponse> {
    let data = &user.session().data;
    Json(SessionUserResponse {
        user_id: data.user_id,
        email: data.email.clone(),
        name: data.name.clone(),
        role: data.role,
        company_id: data.company_id,
        company_name: data.company_name.clone(),
    })
}
