use serde::{Deserialize, Serialize};

use crate::authz::Role;
use crate::CrmError;

// Request DTOs shared across handlers; resource-specific bodies live with
// their handlers.

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

// Response DTOs

#[derive(Debug, Serialize)]
pub struct SessionUserResponse {
    pub user_id: i64,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub company_id: Option<i64>,
    pub company_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl From<CrmError> for ErrorResponse {
    fn from(err: CrmError) -> Self {
        let code = match &err {
            CrmError::Unauthorized => "UNAUTHORIZED",
            CrmError::Forbidden => "FORBIDDEN",
            CrmError::InvalidCredentials => "INVALID_CREDENTIALS",
            CrmError::TooManyAttempts => "TOO_MANY_ATTEMPTS",
            CrmError::NotFound => "NOT_FOUND",
            CrmError::Validation(_) => "VALIDATION_ERROR",
            CrmError::InvalidTransition { .. } => "INVALID_TRANSITION",
            CrmError::PasswordHashError => "PASSWORD_HASH_ERROR",
            CrmError::DatabaseError(_) => "DATABASE_ERROR",
            CrmError::UpstreamError(_) => "UPSTREAM_ERROR",
            CrmError::ConfigurationError(_) => "CONFIGURATION_ERROR",
        };

        // Internal detail stays in the logs; callers get a generic message.
        let error = match &err {
            CrmError::DatabaseError(_) => "Internal server error".to_owned(),
            CrmError::UpstreamError(_) => "Upstream service error".to_owned(),
            _ => err.to_string(),
        };

        ErrorResponse {
            error,
            code: code.to_owned(),
        }
    }
}
