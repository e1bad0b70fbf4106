//! Entity types and repository traits, one file per resource.
//!
//! Every query method takes a [`TenantScope`](crate::TenantScope); the
//! implementations apply the `company_id` filter so cross-tenant rows are
//! simply invisible rather than forbidden.

mod activity_log;
mod approval;
mod customer;
mod deal;
mod invoice;
mod notification;
mod quote;
mod report_cache;
mod shipment;
mod task;
mod ticket;
mod user;
mod vendor;

pub mod mocks;

pub use activity_log::{ActivityLog, ActivityLogRepository, NewActivity};
pub use approval::{ApprovalKind, ApprovalRepository, ApprovalRequest, ApprovalStatus, NewApproval};
pub use customer::{Customer, CustomerRepository, CustomerStatus, CustomerUpdate, NewCustomer};
pub use deal::{Deal, DealRepository, DealStage, DealUpdate, NewDeal};
pub use invoice::{Invoice, InvoiceRepository, InvoiceStatus, InvoiceUpdate, NewInvoice};
pub use notification::{NewNotification, Notification, NotificationRepository};
pub use quote::{NewQuote, Quote, QuoteRepository, QuoteStatus, QuoteUpdate};
pub use report_cache::{ReportCacheEntry, ReportCacheRepository};
pub use shipment::{NewShipment, Shipment, ShipmentRepository, ShipmentStatus, ShipmentUpdate};
pub use task::{NewTask, TaskItem, TaskPriority, TaskRepository, TaskStatus, TaskUpdate};
pub use ticket::{NewTicket, Ticket, TicketRepository, TicketStatus, TicketUpdate};
pub use user::{NewUser, User, UserRepository};
pub use vendor::{NewVendor, Vendor, VendorRepository, VendorUpdate};
