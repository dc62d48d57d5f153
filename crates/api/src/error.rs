//! API error types with HTTP response mapping.

use axum::Json;
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use domain::{DomainError, IdError};
use serde::Serialize;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// No route or resource matches the request.
    NotFound(String),
    /// Malformed request input, such as a non-numeric path id.
    BadRequest(String),
    /// The route exists but not for this method.
    MethodNotAllowed(String),
    /// Tagged failure from the domain services.
    Domain(DomainError),
}

impl ApiError {
    /// Returns the HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) | ApiError::Domain(DomainError::NotFound(_)) => {
                StatusCode::NOT_FOUND
            }
            ApiError::BadRequest(_) | ApiError::Domain(DomainError::Validation(_)) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Domain(DomainError::Business(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::NotFound(msg)
            | ApiError::BadRequest(msg)
            | ApiError::MethodNotAllowed(msg) => msg,
            ApiError::Domain(err) => err.message(),
        }
    }

    /// Binds the error to the request path reported in the response body.
    pub fn at(self, uri: &Uri) -> RequestError {
        RequestError {
            error: self,
            path: uri.path().to_string(),
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Domain(err)
    }
}

impl From<IdError> for ApiError {
    fn from(err: IdError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

/// JSON body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub status: u16,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub path: String,
}

/// An [`ApiError`] raised while serving a request path.
#[derive(Debug)]
pub struct RequestError {
    pub error: ApiError,
    pub path: String,
}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        let status = self.error.status();
        let message = self.error.message();

        if status.is_server_error() {
            tracing::error!(path = %self.path, error = %message, "request failed");
        } else {
            tracing::warn!(
                path = %self.path,
                status = status.as_u16(),
                error = %message,
                "request rejected"
            );
        }

        metrics::counter!("api_errors_total", "status" => status.as_u16().to_string()).increment(1);

        let body = ErrorResponse {
            status: status.as_u16(),
            message: message.to_string(),
            timestamp: Utc::now(),
            path: self.path,
        };
        (status, Json(body)).into_response()
    }
}

/// Result type for route handlers.
pub type ApiResult<T> = Result<T, RequestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_map_to_statuses() {
        let cases = [
            (DomainError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (DomainError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (
                DomainError::Business("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn invalid_id_is_a_bad_request() {
        let err = ApiError::from("abc".parse::<domain::CartId>().unwrap_err());
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), "CartId must be an integer, got 'abc'");
    }

    #[test]
    fn request_error_records_path() {
        let uri: Uri = "/carts/7?x=1".parse().unwrap();
        let err = ApiError::NotFound("gone".into()).at(&uri);
        assert_eq!(err.path, "/carts/7");
    }
}
