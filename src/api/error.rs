use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::CrmError;

use super::ErrorResponse;

/// Converts `CrmError` into the HTTP response, in one place.
#[derive(Debug)]
pub struct AppError(pub CrmError);

impl From<CrmError> for AppError {
    fn from(err: CrmError) -> Self {
        Self(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let error_response = ErrorResponse::from(self.0.clone());
        let status = match &self.0 {
            CrmError::Unauthorized | CrmError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            CrmError::Forbidden => StatusCode::FORBIDDEN,
            CrmError::NotFound => StatusCode::NOT_FOUND,
            CrmError::TooManyAttempts => StatusCode::TOO_MANY_REQUESTS,
            CrmError::Validation(_) | CrmError::InvalidTransition { .. } => {
                StatusCode::BAD_REQUEST
            }
            CrmError::PasswordHashError
            | CrmError::DatabaseError(_)
            | CrmError::UpstreamError(_)
            | CrmError::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(error_response)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (CrmError::Unauthorized, StatusCode::UNAUTHORIZED),
            (CrmError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (CrmError::Forbidden, StatusCode::FORBIDDEN),
            (CrmError::NotFound, StatusCode::NOT_FOUND),
            (CrmError::TooManyAttempts, StatusCode::TOO_MANY_REQUESTS),
            (
                CrmError::Validation("x".to_owned()),
                StatusCode::BAD_REQUEST,
            ),
            (
                CrmError::InvalidTransition {
                    from: "A".to_owned(),
                    to: "B".to_owned(),
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                CrmError::DatabaseError("x".to_owned()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            let response = AppError(err).into_response();
            assert_eq!(response.status(), expected);
        }
    }
}
