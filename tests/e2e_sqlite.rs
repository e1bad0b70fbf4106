//! Integration tests against the SQLite repositories.
//!
//! Each test gets its own in-memory database. The pool is capped at one
//! connection so `sqlite::memory:` is not silently split across
//! connections.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use chrono::{Duration, Utc};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use atrium::authz::Role;
use atrium::rate_limit::RateLimiterRepository;
use atrium::repository::{
    ApprovalKind, ApprovalRepository, ApprovalStatus, CustomerRepository, CustomerStatus,
    CustomerUpdate, DealRepository, DealStage, InvoiceRepository, InvoiceStatus, NewApproval,
    NewCustomer, NewDeal, NewInvoice, NewNotification, NewQuote, NewShipment, NewUser,
    NotificationRepository, QuoteRepository, QuoteStatus, ReportCacheEntry,
    ReportCacheRepository, ShipmentRepository, ShipmentStatus, UserRepository,
};
use atrium::session::{SessionData, SessionRepository};
use atrium::sqlite::{create_repositories, migrations, SqliteCompanyStore, SqliteRepositories};
use atrium::{CrmError, TenantScope};

async fn setup() -> (SqlitePool, SqliteRepositories) {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    migrations::run(&pool).await.unwrap();
    let repos = create_repositories(pool.clone());
    (pool, repos)
}

async fn seed_company(pool: &SqlitePool, name: &str) -> i64 {
    SqliteCompanyStore::new(pool.clone())
        .create(name)
        .await
        .unwrap()
}

fn new_customer(name: &str) -> NewCustomer {
    NewCustomer {
        name: name.to_owned(),
        email: None,
        phone: None,
        address: None,
        status: None,
        owner_id: None,
    }
}

#[tokio::test]
async fn test_migrations_are_idempotent() {
    let (pool, _) = setup().await;
    migrations::run(&pool).await.unwrap();
    migrations::run(&pool).await.unwrap();
}

#[tokio::test]
async fn test_user_roundtrip_with_company_join() {
    let (pool, repos) = setup().await;
    let company_id = seed_company(&pool, "Acme").await;

    let created = repos
        .users
        .create_user(NewUser {
            email: "admin@acme.test".to_owned(),
            name: "Admin".to_owned(),
            hashed_password: "hash".to_owned(),
            role: Role::Admin,
            company_id: Some(company_id),
        })
        .await
        .unwrap();

    assert_eq!(created.company_name.as_deref(), Some("Acme"));
    assert_eq!(created.role, Role::Admin);

    let by_email = repos
        .users
        .find_user_by_email("admin@acme.test")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_email.id, created.id);
    assert_eq!(by_email.company_name.as_deref(), Some("Acme"));
}

#[tokio::test]
async fn test_super_admin_without_company() {
    let (_pool, repos) = setup().await;

    let created = repos
        .users
        .create_user(NewUser {
            email: "root@atrium.test".to_owned(),
            name: "Root".to_owned(),
            hashed_password: "hash".to_owned(),
            role: Role::SuperAdmin,
            company_id: None,
        })
        .await
        .unwrap();

    assert_eq!(created.company_id, None);
    assert_eq!(created.company_name, None);
}

#[tokio::test]
async fn test_customer_tenant_isolation() {
    let (pool, repos) = setup().await;
    let acme = seed_company(&pool, "Acme").await;
    let globex = seed_company(&pool, "Globex").await;

    repos.customers.create(acme, new_customer("Acme A")).await.unwrap();
    repos.customers.create(acme, new_customer("Acme B")).await.unwrap();
    let other = repos
        .customers
        .create(globex, new_customer("Globex A"))
        .await
        .unwrap();

    let scoped = repos.customers.list(&TenantScope::Company(acme)).await.unwrap();
    assert_eq!(scoped.len(), 2);
    assert!(scoped.iter().all(|c| c.company_id == acme));

    let global = repos.customers.list(&TenantScope::Global).await.unwrap();
    assert_eq!(global.len(), 3);

    // A cross-tenant find sees nothing; the scoped delete refuses too.
    assert!(repos
        .customers
        .find(&TenantScope::Company(acme), other.id)
        .await
        .unwrap()
        .is_none());
    assert_eq!(
        repos
            .customers
            .delete(&TenantScope::Company(acme), other.id)
            .await
            .unwrap_err(),
        CrmError::NotFound
    );
}

#[tokio::test]
async fn test_customer_update_and_status() {
    let (pool, repos) = setup().await;
    let acme = seed_company(&pool, "Acme").await;
    let scope = TenantScope::Company(acme);

    let customer = repos.customers.create(acme, new_customer("Lead Co")).await.unwrap();
    assert_eq!(customer.status, CustomerStatus::Lead);

    let updated = repos
        .customers
        .update(
            &scope,
            customer.id,
            CustomerUpdate {
                name: "Lead Co".to_owned(),
                email: Some("contact@leadco.test".to_owned()),
                phone: None,
                address: None,
                status: CustomerStatus::Active,
                owner_id: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.status, CustomerStatus::Active);
    assert_eq!(updated.email.as_deref(), Some("contact@leadco.test"));
}

#[tokio::test]
async fn test_deal_stage_persistence() {
    let (pool, repos) = setup().await;
    let acme = seed_company(&pool, "Acme").await;
    let scope = TenantScope::Company(acme);

    let customer = repos.customers.create(acme, new_customer("Buyer")).await.unwrap();
    let deal = repos
        .deals
        .create(
            acme,
            NewDeal {
                customer_id: customer.id,
                title: "Big deal".to_owned(),
                product: Some("Widget".to_owned()),
                value_cents: 100_000,
                currency: "USD".to_owned(),
                owner_id: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(deal.stage, DealStage::Qualification);

    let deal = repos
        .deals
        .set_stage(&scope, deal.id, DealStage::Proposal)
        .await
        .unwrap();
    assert_eq!(deal.stage, DealStage::Proposal);

    let reloaded = repos.deals.find(&scope, deal.id).await.unwrap().unwrap();
    assert_eq!(reloaded.stage, DealStage::Proposal);
}

#[tokio::test]
async fn test_quote_draft_only_editing() {
    let (pool, repos) = setup().await;
    let acme = seed_company(&pool, "Acme").await;
    let scope = TenantScope::Company(acme);

    let customer = repos.customers.create(acme, new_customer("Buyer")).await.unwrap();
    let quote = repos
        .quotes
        .create(
            acme,
            NewQuote {
                customer_id: customer.id,
                deal_id: None,
                number: "Q-1".to_owned(),
                total_cents: 5000,
                currency: "USD".to_owned(),
                valid_until: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(quote.status, QuoteStatus::Draft);

    repos
        .quotes
        .set_status(&scope, quote.id, QuoteStatus::Sent)
        .await
        .unwrap();

    let err = repos
        .quotes
        .update(
            &scope,
            quote.id,
            atrium::repository::QuoteUpdate {
                total_cents: 9999,
                currency: "USD".to_owned(),
                valid_until: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CrmError::Validation(_)));
}

#[tokio::test]
async fn test_shipment_status_stamps_timestamps() {
    let (pool, repos) = setup().await;
    let acme = seed_company(&pool, "Acme").await;
    let scope = TenantScope::Company(acme);

    let customer = repos.customers.create(acme, new_customer("Buyer")).await.unwrap();
    let invoice = repos
        .invoices
        .create(
            acme,
            NewInvoice {
                customer_id: customer.id,
                quote_id: None,
                number: "INV-1".to_owned(),
                total_cents: 5000,
                currency: "USD".to_owned(),
                due_date: None,
            },
        )
        .await
        .unwrap();

    let shipment = repos
        .shipments
        .create(
            acme,
            NewShipment {
                invoice_id: invoice.id,
                carrier: "DHL".to_owned(),
                tracking_number: None,
            },
        )
        .await
        .unwrap();
    assert!(shipment.shipped_at.is_none());

    let shipment = repos
        .shipments
        .set_status(&scope, shipment.id, ShipmentStatus::InTransit)
        .await
        .unwrap();
    assert!(shipment.shipped_at.is_some());
    assert!(shipment.delivered_at.is_none());

    let shipment = repos
        .shipments
        .set_status(&scope, shipment.id, ShipmentStatus::Delivered)
        .await
        .unwrap();
    assert!(shipment.delivered_at.is_some());
}

#[tokio::test]
async fn test_invoice_status_roundtrip() {
    let (pool, repos) = setup().await;
    let acme = seed_company(&pool, "Acme").await;
    let scope = TenantScope::Company(acme);

    let customer = repos.customers.create(acme, new_customer("Buyer")).await.unwrap();
    let invoice = repos
        .invoices
        .create(
            acme,
            NewInvoice {
                customer_id: customer.id,
                quote_id: None,
                number: "INV-1".to_owned(),
                total_cents: 5000,
                currency: "USD".to_owned(),
                due_date: None,
            },
        )
        .await
        .unwrap();

    repos
        .invoices
        .set_status(&scope, invoice.id, InvoiceStatus::Issued)
        .await
        .unwrap();
    let reloaded = repos.invoices.find(&scope, invoice.id).await.unwrap().unwrap();
    assert_eq!(reloaded.status, InvoiceStatus::Issued);
}

#[tokio::test]
async fn test_approval_decide_once() {
    let (pool, repos) = setup().await;
    let acme = seed_company(&pool, "Acme").await;
    let scope = TenantScope::Company(acme);

    let requester = repos
        .users
        .create_user(NewUser {
            email: "m@acme.test".to_owned(),
            name: "M".to_owned(),
            hashed_password: "hash".to_owned(),
            role: Role::Manager,
            company_id: Some(acme),
        })
        .await
        .unwrap();

    let approval = repos
        .approvals
        .create(
            acme,
            requester.id,
            NewApproval {
                kind: ApprovalKind::QuoteDiscount,
                subject_id: 1,
                note: None,
            },
        )
        .await
        .unwrap();

    let decided = repos
        .approvals
        .decide(&scope, approval.id, ApprovalStatus::Rejected, requester.id, None)
        .await
        .unwrap();
    assert_eq!(decided.status, ApprovalStatus::Rejected);
    assert!(decided.decided_at.is_some());

    let err = repos
        .approvals
        .decide(&scope, approval.id, ApprovalStatus::Approved, requester.id, None)
        .await
        .unwrap_err();
    assert!(matches!(err, CrmError::Validation(_)));
}

#[tokio::test]
async fn test_notifications_inbox() {
    let (pool, repos) = setup().await;
    let acme = seed_company(&pool, "Acme").await;
    let scope = TenantScope::Company(acme);

    repos
        .notifications
        .create(NewNotification {
            company_id: acme,
            user_id: 1,
            title: "First".to_owned(),
            body: "body".to_owned(),
        })
        .await
        .unwrap();
    let second = repos
        .notifications
        .create(NewNotification {
            company_id: acme,
            user_id: 1,
            title: "Second".to_owned(),
            body: "body".to_owned(),
        })
        .await
        .unwrap();

    let inbox = repos.notifications.list_for_user(&scope, 1).await.unwrap();
    assert_eq!(inbox.len(), 2);

    let read = repos.notifications.mark_read(&scope, second.id, 1).await.unwrap();
    assert!(read.read_at.is_some());

    // Another user cannot read someone else's notification.
    let err = repos
        .notifications
        .mark_read(&scope, second.id, 2)
        .await
        .unwrap_err();
    assert_eq!(err, CrmError::NotFound);
}

#[tokio::test]
async fn test_session_store_roundtrip_and_prune() {
    let (_pool, repos) = setup().await;

    let now = Utc::now();
    let live_id = repos
        .sessions
        .create(SessionData {
            user_id: 1,
            email: "a@acme.test".to_owned(),
            name: "A".to_owned(),
            role: Role::Agent,
            company_id: Some(1),
            company_name: Some("Acme".to_owned()),
            created_at: now,
            expires_at: now + Duration::hours(1),
        })
        .await
        .unwrap();
    let expired_id = repos
        .sessions
        .create(SessionData {
            user_id: 2,
            email: "b@acme.test".to_owned(),
            name: "B".to_owned(),
            role: Role::Agent,
            company_id: Some(1),
            company_name: Some("Acme".to_owned()),
            created_at: now - Duration::hours(3),
            expires_at: now - Duration::hours(1),
        })
        .await
        .unwrap();

    let session = repos.sessions.find(&live_id).await.unwrap().unwrap();
    assert_eq!(session.data.role, Role::Agent);
    assert_eq!(session.data.company_id, Some(1));

    let pruned = repos.sessions.prune_expired().await.unwrap();
    assert_eq!(pruned, 1);
    assert!(repos.sessions.find(&expired_id).await.unwrap().is_none());
    assert!(repos.sessions.find(&live_id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_report_cache_upsert() {
    let (_pool, repos) = setup().await;

    repos
        .report_cache
        .put(ReportCacheEntry {
            report_type: "sales".to_owned(),
            scope: "1".to_owned(),
            payload: serde_json::json!({"v": 1}),
            computed_at: Utc::now(),
        })
        .await
        .unwrap();
    repos
        .report_cache
        .put(ReportCacheEntry {
            report_type: "sales".to_owned(),
            scope: "1".to_owned(),
            payload: serde_json::json!({"v": 2}),
            computed_at: Utc::now(),
        })
        .await
        .unwrap();

    let entry = repos.report_cache.get("sales", "1").await.unwrap().unwrap();
    assert_eq!(entry.payload["v"], 2);

    // Other scopes remain empty.
    assert!(repos.report_cache.get("sales", "2").await.unwrap().is_none());
    assert!(repos.report_cache.get("sales", "global").await.unwrap().is_none());
}

#[tokio::test]
async fn test_rate_limiter_window() {
    let (_pool, repos) = setup().await;
    let since = Utc::now() - Duration::minutes(15);

    repos
        .rate_limiter
        .record_attempt("a@acme.test", false, Some("10.0.0.1"))
        .await
        .unwrap();
    repos
        .rate_limiter
        .record_attempt("a@acme.test", false, None)
        .await
        .unwrap();
    repos
        .rate_limiter
        .record_attempt("a@acme.test", true, None)
        .await
        .unwrap();

    assert_eq!(
        repos
            .rate_limiter
            .recent_failed_attempts("a@acme.test", since)
            .await
            .unwrap(),
        2
    );

    repos.rate_limiter.clear_attempts("a@acme.test").await.unwrap();
    assert_eq!(
        repos
            .rate_limiter
            .recent_failed_attempts("a@acme.test", since)
            .await
            .unwrap(),
        0
    );
}
