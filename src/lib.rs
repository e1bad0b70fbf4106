pub mod actions;
pub mod api;
pub mod assist;
pub mod authz;
pub mod config;
pub mod crypto;
pub mod rate_limit;
pub mod report;
pub mod repository;
pub mod session;
pub mod sqlite;
pub mod validators;

use std::fmt;

pub use authz::{Action, Resource, Role};
pub use crypto::SecretString;
pub use session::{Session, SessionData, SessionRepository, TenantScope};

pub use repository::{
    ActivityLogRepository, ApprovalRepository, CustomerRepository, DealRepository,
    InvoiceRepository, NotificationRepository, QuoteRepository, ReportCacheRepository,
    ShipmentRepository, TaskRepository, TicketRepository, UserRepository, VendorRepository,
};

#[derive(Debug, Clone, PartialEq)]
pub enum CrmError {
    Unauthorized,
    Forbidden,
    InvalidCredentials,
    TooManyAttempts,
    NotFound,
    Validation(String),
    InvalidTransition { from: String, to: String },
    PasswordHashError,
    DatabaseError(String),
    UpstreamError(String),
    ConfigurationError(String),
}

impl std::error::Error for CrmError {}

impl fmt::Display for CrmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrmError::Unauthorized => write!(f, "Authentication required"),
            CrmError::Forbidden => write!(f, "Not allowed"),
            CrmError::InvalidCredentials => write!(f, "Invalid email or password"),
            CrmError::TooManyAttempts => write!(f, "Too many failed attempts, try again later"),
            CrmError::NotFound => write!(f, "Not found"),
            CrmError::Validation(msg) => write!(f, "{msg}"),
            CrmError::InvalidTransition { from, to } => {
                write!(f, "Invalid status transition from {from} to {to}")
            }
            CrmError::PasswordHashError => write!(f, "Failed to hash password"),
            CrmError::DatabaseError(msg) => write!(f, "Database error: {msg}"),
            CrmError::UpstreamError(msg) => write!(f, "Upstream service error: {msg}"),
            CrmError::ConfigurationError(msg) => write!(f, "Configuration error: {msg}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_error_names_both_states() {
        let err = CrmError::InvalidTransition {
            from: "DRAFT".to_owned(),
            to: "ACCEPTED".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("DRAFT"));
        assert!(msg.contains("ACCEPTED"));
    }

    #[test]
    fn test_validation_message_passthrough() {
        let err = CrmError::Validation("name cannot be empty".to_owned());
        assert_eq!(err.to_string(), "name cannot be empty");
    }
}
