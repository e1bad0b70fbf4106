//! SQLite repository implementations.
//!
//! Runtime-checked `sqlx` queries; statuses are stored as their string
//! forms and parsed back through each enum's `from_str`.

mod activity_log;
mod approval;
mod company;
mod customer;
mod deal;
mod invoice;
pub mod migrations;
mod notification;
mod quote;
mod rate_limiter;
mod report_cache;
mod session;
mod shipment;
mod task;
mod ticket;
mod user;
mod vendor;

use std::sync::Arc;

use sqlx::SqlitePool;

pub use activity_log::SqliteActivityLogRepository;
pub use approval::SqliteApprovalRepository;
pub use company::SqliteCompanyStore;
pub use customer::SqliteCustomerRepository;
pub use deal::SqliteDealRepository;
pub use invoice::SqliteInvoiceRepository;
pub use notification::SqliteNotificationRepository;
pub use quote::SqliteQuoteRepository;
pub use rate_limiter::SqliteRateLimiterRepository;
pub use report_cache::SqliteReportCacheRepository;
pub use session::SqliteSessionRepository;
pub use shipment::SqliteShipmentRepository;
pub use task::SqliteTaskRepository;
pub use ticket::SqliteTicketRepository;
pub use user::SqliteUserRepository;
pub use vendor::SqliteVendorRepository;

use crate::rate_limit::RateLimiterRepository;
use crate::repository::{
    ActivityLogRepository, ApprovalRepository, CustomerRepository, DealRepository,
    InvoiceRepository, NotificationRepository, QuoteRepository, ReportCacheRepository,
    ShipmentRepository, TaskRepository, TicketRepository, UserRepository, VendorRepository,
};
use crate::session::SessionRepository;
use crate::CrmError;

/// The full repository set backed by one pool, ready for `AppState`.
pub struct SqliteRepositories {
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
    pub report_cache: Arc<dyn ReportCacheRepository>,
}

pub fn create_repositories(pool: SqlitePool) -> SqliteRepositories {
    SqliteRepositories {
        users: Arc::new(SqliteUserRepository::new(pool.clone())),
        sessions: Arc::new(SqliteSessionRepository::new(pool.clone())),
        rate_limiter: Arc::new(SqliteRateLimiterRepository::new(pool.clone())),
        customers: Arc::new(SqliteCustomerRepository::new(pool.clone())),
        deals: Arc::new(SqliteDealRepository::new(pool.clone())),
        quotes: Arc::new(SqliteQuoteRepository::new(pool.clone())),
        invoices: Arc::new(SqliteInvoiceRepository::new(pool.clone())),
        shipments: Arc::new(SqliteShipmentRepository::new(pool.clone())),
        tasks: Arc::new(SqliteTaskRepository::new(pool.clone())),
        tickets: Arc::new(SqliteTicketRepository::new(pool.clone())),
        vendors: Arc::new(SqliteVendorRepository::new(pool.clone())),
        approvals: Arc::new(SqliteApprovalRepository::new(pool.clone())),
        notifications: Arc::new(SqliteNotificationRepository::new(pool.clone())),
        activity: Arc::new(SqliteActivityLogRepository::new(pool.clone())),
        report_cache: Arc::new(SqliteReportCacheRepository::new(pool)),
    }
}

pub(crate) fn db_err(operation: &str, e: sqlx::Error) -> CrmError {
    log::error!(target: "atrium::sqlite", "msg=\"database error\" operation=\"{operation}\" error=\"{e}\"");
    CrmError::DatabaseError(e.to_string())
}

/// Parses a stored status string, treating unknown values as corruption.
pub(crate) fn parse_stored<T>(
    value: Option<T>,
    column: &str,
    raw: &str,
) -> Result<T, CrmError> {
    value.ok_or_else(|| {
        log::error!(target: "atrium::sqlite", "msg=\"unrecognized stored value\" column=\"{column}\" value=\"{raw}\"");
        CrmError::DatabaseError(format!("unrecognized {column}: {raw}"))
    })
}
