//! End-to-end tests for the HTTP API over mock repositories.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::Duration;
use http_body_util::BodyExt;
use tower::ServiceExt;

use atrium::api::{api_routes, AppState};
use atrium::assist::MockCompletionClient;
use atrium::authz::Role;
use atrium::config::{RateLimitConfig, ReportCacheConfig};
use atrium::crypto::PasswordHasher;
use atrium::rate_limit::InMemoryRateLimiter;
use atrium::report::ReportCache;
use atrium::repository::mocks::{
    MockActivityLogRepository, MockApprovalRepository, MockCustomerRepository, MockDealRepository,
    MockInvoiceRepository, MockNotificationRepository, MockQuoteRepository,
    MockReportCacheRepository, MockShipmentRepository, MockTaskRepository, MockTicketRepository,
    MockUserRepository, MockVendorRepository,
};
use atrium::repository::{CustomerRepository, NewCustomer, NewUser, UserRepository};
use atrium::session::{InMemorySessionRepository, SessionConfig};
use atrium::SecretString;

const SECRET: &str = "test-session-secret-key-that-is-long-enough";
const PASSWORD: &str = "correct horse battery staple";

struct TestApp {
    app: Router,
    users: Arc<MockUserRepository>,
    customers: Arc<MockCustomerRepository>,
}

fn test_app() -> TestApp {
    let users = Arc::new(MockUserRepository::new());
    let customers = Arc::new(MockCustomerRepository::new());

    let session_config = SessionConfig {
        secret_key: SecretString::new(SECRET),
        cookie_secure: false,
        session_lifetime: Duration::hours(2),
        ..Default::default()
    };

    let state = AppState {
        users: users.clone(),
        sessions: Arc::new(InMemorySessionRepository::new()),
        rate_limiter: Arc::new(InMemoryRateLimiter::new()),
        customers: customers.clone(),
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
        assist: Arc::new(MockCompletionClient::new("Drafted text.")),
        session_config: Arc::new(session_config),
        rate_limit: RateLimitConfig::default(),
        report_ttls: ReportCacheConfig::default(),
    };

    let app = Router::new().nest("/api", api_routes()).with_state(state);

    TestApp {
        app,
        users,
        customers,
    }
}

async fn seed_user(users: &MockUserRepository, email: &str, role: Role, company_id: Option<i64>) {
    let hashed = PasswordHasher::default()
        .hash(&SecretString::new(PASSWORD))
        .unwrap();
    users
        .create_user(NewUser {
            email: email.to_owned(),
            name: "Test User".to_owned(),
            hashed_password: hashed,
            role,
            company_id,
        })
        .await
        .unwrap();
}

async fn seed_customer(customers: &MockCustomerRepository, company_id: i64, name: &str) {
    customers
        .create(
            company_id,
            NewCustomer {
                name: name.to_owned(),
                email: None,
                phone: None,
                address: None,
                status: None,
                owner_id: None,
            },
        )
        .await
        .unwrap();
}

async fn body_to_json(body: Body) -> serde_json::Value {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Logs in and returns the session cookie pair (`name=value`).
async fn login(app: &Router, email: &str) -> String {
    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::json!({"email": email, "password": PASSWORD}).to_string(),
        ))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("login sets a session cookie")
        .to_str()
        .unwrap();
    set_cookie.split(';').next().unwrap().to_owned()
}

fn get(uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, cookie: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::COOKIE, cookie)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_login_returns_user_payload_and_cookie() {
    let ctx = test_app();
    ctx.users.add_company(1, "Acme");
    seed_user(&ctx.users, "agent@acme.test", Role::Agent, Some(1)).await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::json!({"email": "agent@acme.test", "password": PASSWORD}).to_string(),
        ))
        .unwrap();

    let response = ctx.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key(header::SET_COOKIE));

    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["email"], "agent@acme.test");
    assert_eq!(body["role"], "AGENT");
    assert_eq!(body["company_name"], "Acme");
}

#[tokio::test]
async fn test_login_wrong_password_is_401() {
    let ctx = test_app();
    ctx.users.add_company(1, "Acme");
    seed_user(&ctx.users, "agent@acme.test", Role::Agent, Some(1)).await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::json!({"email": "agent@acme.test", "password": "nope"}).to_string(),
        ))
        .unwrap();

    let response = ctx.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_lockout_after_failures() {
    let ctx = test_app();
    ctx.users.add_company(1, "Acme");
    seed_user(&ctx.users, "agent@acme.test", Role::Agent, Some(1)).await;

    for _ in 0..5 {
        let request = Request::builder()
            .method("POST")
            .uri("/api/auth/login")
            .header("content-type", "application/json")
            .body(Body::from(
                serde_json::json!({"email": "agent@acme.test", "password": "nope"}).to_string(),
            ))
            .unwrap();
        let response = ctx.app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::json!({"email": "agent@acme.test", "password": PASSWORD}).to_string(),
        ))
        .unwrap();
    let response = ctx.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_tenant_scoped_list() {
    let ctx = test_app();
    ctx.users.add_company(1, "Acme");
    ctx.users.add_company(2, "Globex");
    seed_user(&ctx.users, "agent@acme.test", Role::Agent, Some(1)).await;
    seed_customer(&ctx.customers, 1, "Acme Customer").await;
    seed_customer(&ctx.customers, 2, "Globex Customer").await;

    let cookie = login(&ctx.app, "agent@acme.test").await;
    let response = ctx
        .app
        .clone()
        .oneshot(get("/api/customers", &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_to_json(response.into_body()).await;
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert!(rows.iter().all(|c| c["company_id"] == 1));
}

#[tokio::test]
async fn test_super_admin_sees_all_tenants() {
    let ctx = test_app();
    ctx.users.add_company(1, "Acme");
    ctx.users.add_company(2, "Globex");
    seed_user(&ctx.users, "root@atrium.test", Role::SuperAdmin, None).await;
    seed_customer(&ctx.customers, 1, "Acme Customer").await;
    seed_customer(&ctx.customers, 2, "Globex Customer").await;

    let cookie = login(&ctx.app, "root@atrium.test").await;
    let response = ctx
        .app
        .clone()
        .oneshot(get("/api/customers", &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_to_json(response.into_body()).await;
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_cross_tenant_read_is_404() {
    let ctx = test_app();
    ctx.users.add_company(1, "Acme");
    ctx.users.add_company(2, "Globex");
    seed_user(&ctx.users, "agent@acme.test", Role::Agent, Some(1)).await;
    seed_customer(&ctx.customers, 2, "Globex Customer").await;

    let cookie = login(&ctx.app, "agent@acme.test").await;
    let response = ctx
        .app
        .clone()
        .oneshot(get("/api/customers/1", &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_logout_invalidates_session() {
    let ctx = test_app();
    ctx.users.add_company(1, "Acme");
    seed_user(&ctx.users, "agent@acme.test", Role::Agent, Some(1)).await;
    seed_customer(&ctx.customers, 1, "Acme Customer").await;

    let cookie = login(&ctx.app, "agent@acme.test").await;

    // Authenticated before logout.
    let response = ctx
        .app
        .clone()
        .oneshot(get("/api/customers", &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = ctx
        .app
        .clone()
        .oneshot(post_json("/api/auth/logout", &cookie, serde_json::json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The same cookie no longer authenticates.
    let response = ctx
        .app
        .clone()
        .oneshot(get("/api/customers", &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unauthenticated_request_is_401() {
    let ctx = test_app();

    let request = Request::builder()
        .method("GET")
        .uri("/api/customers")
        .body(Body::empty())
        .unwrap();
    let response = ctx.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_agent_cannot_delete() {
    let ctx = test_app();
    ctx.users.add_company(1, "Acme");
    seed_user(&ctx.users, "agent@acme.test", Role::Agent, Some(1)).await;
    seed_customer(&ctx.customers, 1, "Acme Customer").await;

    let cookie = login(&ctx.app, "agent@acme.test").await;
    let request = Request::builder()
        .method("DELETE")
        .uri("/api/customers/1")
        .header(header::COOKIE, &cookie)
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_create_and_transition_deal() {
    let ctx = test_app();
    ctx.users.add_company(1, "Acme");
    seed_user(&ctx.users, "manager@acme.test", Role::Manager, Some(1)).await;
    seed_customer(&ctx.customers, 1, "Acme Customer").await;

    let cookie = login(&ctx.app, "manager@acme.test").await;

    let response = ctx
        .app
        .clone()
        .oneshot(post_json(
            "/api/deals",
            &cookie,
            serde_json::json!({
                "customer_id": 1,
                "title": "Annual license",
                "product": "Widget",
                "value_cents": 120000,
                "currency": "USD",
                "owner_id": null
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let deal = body_to_json(response.into_body()).await;
    assert_eq!(deal["stage"], "QUALIFICATION");

    // Forward one stage.
    let response = ctx
        .app
        .clone()
        .oneshot(post_json(
            "/api/deals/1/stage",
            &cookie,
            serde_json::json!({"stage": "PROPOSAL"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let deal = body_to_json(response.into_body()).await;
    assert_eq!(deal["stage"], "PROPOSAL");

    // Stage skipping is rejected.
    let response = ctx
        .app
        .clone()
        .oneshot(post_json(
            "/api/deals/1/stage",
            &cookie,
            serde_json::json!({"stage": "QUALIFICATION"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = ctx
        .app
        .clone()
        .oneshot(post_json(
            "/api/deals/1/stage",
            &cookie,
            serde_json::json!({"stage": "WON"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["code"], "INVALID_TRANSITION");
}

#[tokio::test]
async fn test_quote_status_flow() {
    let ctx = test_app();
    ctx.users.add_company(1, "Acme");
    seed_user(&ctx.users, "manager@acme.test", Role::Manager, Some(1)).await;
    seed_customer(&ctx.customers, 1, "Acme Customer").await;

    let cookie = login(&ctx.app, "manager@acme.test").await;

    let response = ctx
        .app
        .clone()
        .oneshot(post_json(
            "/api/quotes",
            &cookie,
            serde_json::json!({
                "customer_id": 1,
                "deal_id": null,
                "number": "Q-2025-001",
                "total_cents": 50000,
                "currency": "USD",
                "valid_until": null
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // DRAFT cannot jump straight to ACCEPTED.
    let response = ctx
        .app
        .clone()
        .oneshot(post_json(
            "/api/quotes/1/status",
            &cookie,
            serde_json::json!({"status": "ACCEPTED"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    for status in ["SENT", "ACCEPTED"] {
        let response = ctx
            .app
            .clone()
            .oneshot(post_json(
                "/api/quotes/1/status",
                &cookie,
                serde_json::json!({"status": status}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}

#[tokio::test]
async fn test_validation_error_is_400_with_message() {
    let ctx = test_app();
    ctx.users.add_company(1, "Acme");
    seed_user(&ctx.users, "manager@acme.test", Role::Manager, Some(1)).await;

    let cookie = login(&ctx.app, "manager@acme.test").await;
    let response = ctx
        .app
        .clone()
        .oneshot(post_json(
            "/api/customers",
            &cookie,
            serde_json::json!({
                "name": "",
                "email": null,
                "phone": null,
                "address": null,
                "status": null,
                "owner_id": null
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["error"].as_str().unwrap().contains("Name"));
}

#[tokio::test]
async fn test_approval_decide_requires_admin_and_notifies() {
    let ctx = test_app();
    ctx.users.add_company(1, "Acme");
    seed_user(&ctx.users, "manager@acme.test", Role::Manager, Some(1)).await;
    seed_user(&ctx.users, "admin@acme.test", Role::Admin, Some(1)).await;

    let manager_cookie = login(&ctx.app, "manager@acme.test").await;
    let response = ctx
        .app
        .clone()
        .oneshot(post_json(
            "/api/approvals",
            &manager_cookie,
            serde_json::json!({"kind": "QUOTE_DISCOUNT", "subject_id": 1, "note": "15% off"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // The manager may not decide their own request.
    let response = ctx
        .app
        .clone()
        .oneshot(post_json(
            "/api/approvals/1/decide",
            &manager_cookie,
            serde_json::json!({"status": "APPROVED", "note": null}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let admin_cookie = login(&ctx.app, "admin@acme.test").await;
    let response = ctx
        .app
        .clone()
        .oneshot(post_json(
            "/api/approvals/1/decide",
            &admin_cookie,
            serde_json::json!({"status": "APPROVED", "note": null}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["status"], "APPROVED");

    // The requester finds the decision in their inbox.
    let response = ctx
        .app
        .clone()
        .oneshot(get("/api/notifications", &manager_cookie))
        .await
        .unwrap();
    let inbox = body_to_json(response.into_body()).await;
    assert_eq!(inbox.as_array().unwrap().len(), 1);
    assert!(inbox[0]["title"].as_str().unwrap().contains("approved"));
}

#[tokio::test]
async fn test_assist_compose() {
    let ctx = test_app();
    ctx.users.add_company(1, "Acme");
    seed_user(&ctx.users, "agent@acme.test", Role::Agent, Some(1)).await;

    let cookie = login(&ctx.app, "agent@acme.test").await;
    let response = ctx
        .app
        .clone()
        .oneshot(post_json(
            "/api/assist/compose",
            &cookie,
            serde_json::json!({"kind": "followup_email", "context": "Met Jane at the expo"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["text"], "Drafted text.");
}

#[tokio::test]
async fn test_activity_log_records_mutations() {
    let ctx = test_app();
    ctx.users.add_company(1, "Acme");
    seed_user(&ctx.users, "manager@acme.test", Role::Manager, Some(1)).await;

    let cookie = login(&ctx.app, "manager@acme.test").await;
    let response = ctx
        .app
        .clone()
        .oneshot(post_json(
            "/api/customers",
            &cookie,
            serde_json::json!({
                "name": "Audited Corp",
                "email": null,
                "phone": null,
                "address": null,
                "status": null,
                "owner_id": null
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = ctx
        .app
        .clone()
        .oneshot(get("/api/activity", &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_to_json(response.into_body()).await;
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["action"], "create");
    assert_eq!(rows[0]["entity"], "customer");
}
