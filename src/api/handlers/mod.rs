pub mod activity;
pub mod approvals;
pub mod assist;
pub mod auth;
pub mod customers;
pub mod deals;
pub mod invoices;
pub mod notifications;
pub mod quotes;
pub mod reports;
pub mod shipments;
pub mod tasks;
pub mod tickets;
pub mod vendors;
