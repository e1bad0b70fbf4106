//! Report cache behavior through the HTTP API: hit/miss markers, forced
//! refresh, and tenant scope isolation.

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

    response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_owned()
}

async fn fetch_report(app: &Router, cookie: &str, uri: &str) -> serde_json::Value {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_second_request_is_cache_hit_with_identical_payload() {
    let ctx = test_app();
    ctx.users.add_company(1, "Acme");
    seed_user(&ctx.users, "agent@acme.test", Role::Agent, Some(1)).await;
    seed_customer(&ctx.customers, 1, "Customer A").await;

    let cookie = login(&ctx.app, "agent@acme.test").await;

    let first = fetch_report(&ctx.app, &cookie, "/api/reports/customers").await;
    assert_eq!(first["cached"], false);

    // Data changes after the snapshot; the cached payload must not.
    seed_customer(&ctx.customers, 1, "Customer B").await;

    let second = fetch_report(&ctx.app, &cookie, "/api/reports/customers").await;
    assert_eq!(second["cached"], true);
    assert_eq!(second["report"], first["report"]);
    assert_eq!(second["computed_at"], first["computed_at"]);
    assert_eq!(second["report"]["total"], 1);
}

#[tokio::test]
async fn test_refresh_flag_recomputes() {
    let ctx = test_app();
    ctx.users.add_company(1, "Acme");
    seed_user(&ctx.users, "agent@acme.test", Role::Agent, Some(1)).await;
    seed_customer(&ctx.customers, 1, "Customer A").await;

    let cookie = login(&ctx.app, "agent@acme.test").await;

    let first = fetch_report(&ctx.app, &cookie, "/api/reports/customers").await;
    assert_eq!(first["report"]["total"], 1);

    seed_customer(&ctx.customers, 1, "Customer B").await;

    let refreshed = fetch_report(&ctx.app, &cookie, "/api/reports/customers?refresh=1").await;
    assert_eq!(refreshed["cached"], false);
    assert_eq!(refreshed["report"]["total"], 2);
}

#[tokio::test]
async fn test_tenant_cache_entries_are_isolated() {
    let ctx = test_app();
    ctx.users.add_company(1, "Acme");
    ctx.users.add_company(2, "Globex");
    seed_user(&ctx.users, "acme@acme.test", Role::Agent, Some(1)).await;
    seed_user(&ctx.users, "globex@globex.test", Role::Agent, Some(2)).await;
    seed_customer(&ctx.customers, 1, "Acme One").await;
    seed_customer(&ctx.customers, 1, "Acme Two").await;
    seed_customer(&ctx.customers, 2, "Globex One").await;

    let acme_cookie = login(&ctx.app, "acme@acme.test").await;
    let acme = fetch_report(&ctx.app, &acme_cookie, "/api/reports/customers").await;
    assert_eq!(acme["report"]["total"], 2);

    // Tenant B's first request is a miss and sees only its own rows,
    // even though tenant A's entry is already cached.
    let globex_cookie = login(&ctx.app, "globex@globex.test").await;
    let globex = fetch_report(&ctx.app, &globex_cookie, "/api/reports/customers").await;
    assert_eq!(globex["cached"], false);
    assert_eq!(globex["report"]["total"], 1);
}

#[tokio::test]
async fn test_super_admin_report_spans_tenants() {
    let ctx = test_app();
    ctx.users.add_company(1, "Acme");
    ctx.users.add_company(2, "Globex");
    seed_user(&ctx.users, "root@atrium.test", Role::SuperAdmin, None).await;
    seed_customer(&ctx.customers, 1, "Acme One").await;
    seed_customer(&ctx.customers, 2, "Globex One").await;

    let cookie = login(&ctx.app, "root@atrium.test").await;
    let report = fetch_report(&ctx.app, &cookie, "/api/reports/customers").await;
    assert_eq!(report["report"]["total"], 2);
}

#[tokio::test]
async fn test_sales_and_products_reports_respond() {
    let ctx = test_app();
    ctx.users.add_company(1, "Acme");
    seed_user(&ctx.users, "agent@acme.test", Role::Agent, Some(1)).await;

    let cookie = login(&ctx.app, "agent@acme.test").await;

    let sales = fetch_report(&ctx.app, &cookie, "/api/reports/sales").await;
    assert_eq!(sales["cached"], false);
    assert!(sales["report"]["pipeline"].is_array());

    let products = fetch_report(&ctx.app, &cookie, "/api/reports/products").await;
    assert_eq!(products["cached"], false);
    assert!(products["report"]["products"].is_array());
}
