use std::sync::Arc;

use axum::routing::get;
use axum::Router;

use crate::assist::CompletionClient;
use crate::config::{RateLimitConfig, ReportCacheConfig};
use crate::rate_limit::RateLimiterRepository;
use crate::report::ReportCache;
use crate::repository::{
    ActivityLogRepository, ApprovalRepository, CustomerRepository, DealRepository,
    InvoiceRepository, NotificationRepository, QuoteRepository, ShipmentRepository,
    TaskRepository, TicketRepository, UserRepository, VendorRepository,
};
use crate::session::{SessionConfig, SessionRepository};

use super::handlers;

/// Everything the handlers need, injected explicitly.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub sessions: Arc<dyn SessionRepository>,
    pub rate_limiter: Arc<dyn RateLimiterRepository>,
    pub customers: Arc<dyn CustomerRepository>,
    pub deals: Arc<dyn DealRepository>,
    pub quotes: Arc<dyn QuoteRepository>,
    pub invoices: Arc<dyn InvoiceRepository>,
    pub shipments: Arc<dyn ShipmentRepository>,
    pub tasks: Arc<dyn TaskRepository>,
    pub tickets: Arc<dyn TicketRepository>,
    pub vendors: Arc<dyn VendorRepository>,
    pub approvals: Arc<dyn ApprovalRepository>,
    pub notifications: Arc<dyn NotificationRepository>,
    pub activity: Arc<dyn ActivityLogRepository>,
    pub report_cache: ReportCache,
    pub assist: Arc<dyn CompletionClient>,
    pub session_config: Arc<SessionConfig>,
    pub rate_limit: RateLimitConfig,
    pub report_ttls: ReportCacheConfig,
}

/// The `/api` surface.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", handlers::auth::routes())
        .nest("/customers", handlers::customers::routes())
        .nest("/deals", handlers::deals::routes())
        .nest("/quotes", handlers::quotes::routes())
        .nest("/invoices", handlers::invoices::routes())
        .nest("/shipments", handlers::shipments::routes())
        .nest("/tasks", handlers::tasks::routes())
        .nest("/tickets", handlers::tickets::routes())
        .nest("/vendors", handlers::vendors::routes())
        .nest("/approvals", handlers::approvals::routes())
        .nest("/notifications", handlers::notifications::routes())
        .nest("/reports", handlers::reports::routes())
        .nest("/assist", handlers::assist::routes())
        .route("/activity", get(handlers::activity::list))
}
