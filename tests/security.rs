//! Session security: tampered cookies, expired sessions, deleted users.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use tower::ServiceExt;

use atrium::api::{api_routes, AppState};
use atrium::assist::MockCompletionClient;
use atrium::authz::Role;
use atrium::config::{RateLimitConfig, ReportCacheConfig};
use atrium::rate_limit::InMemoryRateLimiter;
use atrium::report::ReportCache;
use atrium::repository::mocks::{
    MockActivityLogRepository, MockApprovalRepository, MockCustomerRepository, MockDealRepository,
    MockInvoiceRepository, MockNotificationRepository, MockQuoteRepository,
    MockReportCacheRepository, MockShipmentRepository, MockTaskRepository, MockTicketRepository,
    MockUserRepository, MockVendorRepository,
};
use atrium::repository::{NewUser, UserRepository};
use atrium::session::{
    sign_session_id, InMemorySessionRepository, SessionConfig, SessionData, SessionRepository,
};
use atrium::SecretString;

const SECRET: &str = "test-session-secret-key-that-is-long-enough";

struct TestApp {
    app: Router,
    users: Arc<MockUserRepository>,
    sessions: Arc<InMemorySessionRepository>,
}

fn test_app() -> TestApp {
    let users = Arc::new(MockUserRepository::new());
    let sessions = Arc::new(InMemorySessionRepository::new());

    let state = AppState {
        users: users.clone(),
        sessions: sessions.clone(),
        rate_limiter: Arc::new(InMemoryRateLimiter::new()),
        customers: Arc::new(MockCustomerRepository::new()),
        deals: Arc::new(MockDealRepository::new()),
        quotes: Arc::new(MockQuoteRepository::new()),
        invoices: Arc::new(MockInvoiceRepository::new()),
        shipments: Arc::new(MockShipmentRepository::new()),
        tasks: Arc::new(MockTaskRepository::new()),
        tickets: Arc::new(MockTicketRepository::new()),
        vendors: Arc::new(MockVendorRepository::new()),
        approvals: Arc::new(MockApprovalRepository::new()),
        notifications: Arc::new(MockNotificationRepository::new()),
        activity: Arc::new(MockActivityLogRepository::new()),
        report_cache: ReportCache::new(Arc::new(MockReportCacheRepository::new())),
        assist: Arc::new(MockCompletionClient::default()),
        session_config: Arc::new(SessionConfig {
            secret_key: SecretString::new(SECRET),
            cookie_secure: false,
            session_lifetime: Duration::hours(2),
            ..Default::default()
        }),
        rate_limit: RateLimitConfig::default(),
        report_ttls: ReportCacheConfig::default(),
    };

    TestApp {
        app: Router::new().nest("/api", api_routes()).with_state(state),
        users,
        sessions,
    }
}

async fn seed_user(users: &MockUserRepository, email: &str) -> i64 {
    users
        .create_user(NewUser {
            email: email.to_owned(),
            name: "Test User".to_owned(),
            hashed_password: "irrelevant".to_owned(),
            role: Role::Agent,
            company_id: Some(1),
        })
        .await
        .unwrap()
        .id
}

fn session_data(user_id: i64, expires_in: Duration) -> SessionData {
    let now = Utc::now();
    SessionData {
        user_id,
        email: "agent@acme.test".to_owned(),
        name: "Test User".to_owned(),
        role: Role::Agent,
        company_id: Some(1),
        company_name: Some("Acme".to_owned()),
        created_at: now,
        expires_at: now + expires_in,
    }
}

async fn request_with_cookie(app: &Router, cookie_value: &str) -> StatusCode {
    let request = Request::builder()
        .method("GET")
        .uri("/api/customers")
        .header(header::COOKIE, format!("atrium_session={cookie_value}"))
        .body(Body::empty())
        .unwrap();

    app.clone().oneshot(request).await.unwrap().status()
}

#[tokio::test]
async fn test_valid_signed_cookie_authenticates() {
    let ctx = test_app();
    let user_id = seed_user(&ctx.users, "agent@acme.test").await;
    let session_id = ctx
        .sessions
        .create(session_data(user_id, Duration::hours(1)))
        .await
        .unwrap();

    let signed = sign_session_id(&session_id, &SecretString::new(SECRET));
    assert_eq!(request_with_cookie(&ctx.app, &signed).await, StatusCode::OK);
}

#[tokio::test]
async fn test_unsigned_session_id_rejected() {
    let ctx = test_app();
    let user_id = seed_user(&ctx.users, "agent@acme.test").await;
    let session_id = ctx
        .sessions
        .create(session_data(user_id, Duration::hours(1)))
        .await
        .unwrap();

    // A raw session ID without a valid signature must not authenticate.
    assert_eq!(
        request_with_cookie(&ctx.app, &session_id).await,
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn test_cookie_signed_with_wrong_secret_rejected() {
    let ctx = test_app();
    let user_id = seed_user(&ctx.users, "agent@acme.test").await;
    let session_id = ctx
        .sessions
        .create(session_data(user_id, Duration::hours(1)))
        .await
        .unwrap();

    let forged = sign_session_id(
        &session_id,
        &SecretString::new("attacker-chosen-secret-of-sufficient-length"),
    );
    assert_eq!(
        request_with_cookie(&ctx.app, &forged).await,
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn test_expired_session_rejected_and_destroyed() {
    let ctx = test_app();
    let user_id = seed_user(&ctx.users, "agent@acme.test").await;
    let session_id = ctx
        .sessions
        .create(session_data(user_id, Duration::hours(-1)))
        .await
        .unwrap();

    let signed = sign_session_id(&session_id, &SecretString::new(SECRET));
    assert_eq!(
        request_with_cookie(&ctx.app, &signed).await,
        StatusCode::UNAUTHORIZED
    );

    // The stored artifact was cleared, not just refused.
    assert!(ctx.sessions.find(&session_id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_session_for_deleted_user_rejected() {
    let ctx = test_app();
    // User id 999 does not exist in the user repository.
    let session_id = ctx
        .sessions
        .create(session_data(999, Duration::hours(1)))
        .await
        .unwrap();

    let signed = sign_session_id(&session_id, &SecretString::new(SECRET));
    assert_eq!(
        request_with_cookie(&ctx.app, &signed).await,
        StatusCode::UNAUTHORIZED
    );
    assert!(ctx.sessions.find(&session_id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_garbage_cookie_rejected() {
    let ctx = test_app();
    assert_eq!(
        request_with_cookie(&ctx.app, "not-even-a-cookie").await,
        StatusCode::UNAUTHORIZED
    );
}
