//! Route handlers.

pub mod carts;
pub mod health;
pub mod metrics;
pub mod recipes;

use axum::http::{Method, Uri};

use crate::error::{ApiError, RequestError};

/// Fallback for paths no route matches.
pub async fn not_found(uri: Uri) -> RequestError {
    ApiError::NotFound("Resource Not Found".to_string()).at(&uri)
}

/// Fallback for known paths requested with an unsupported method.
pub async fn method_not_allowed(method: Method, uri: Uri) -> RequestError {
    ApiError::MethodNotAllowed(format!("Request method '{method}' is not supported")).at(&uri)
}
