//! Domain error types.

use thiserror::Error;

use crate::model::ModelError;
use crate::repository::RepositoryError;

/// Expected failures of a domain operation.
///
/// Services return these instead of propagating faults; the presentation
/// layer maps them to status codes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// A referenced entity does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Malformed input or a storage constraint violation.
    #[error("{0}")]
    Validation(String),

    /// Any other domain-level fault caught during orchestration.
    #[error("{0}")]
    Business(String),
}

impl DomainError {
    /// Returns the human-readable message carried by the error.
    pub fn message(&self) -> &str {
        match self {
            DomainError::NotFound(message)
            | DomainError::Validation(message)
            | DomainError::Business(message) => message,
        }
    }
}

/// Result of a domain operation: the value, or a tagged error.
pub type DomainResult<T> = std::result::Result<T, DomainError>;

impl From<RepositoryError> for DomainError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::ConstraintViolation(message) => DomainError::Validation(message),
            other => DomainError::Business(other.to_string()),
        }
    }
}

impl From<ModelError> for DomainError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::NegativePrice { .. }
            | ModelError::InvalidId(_)
            | ModelError::TotalOverflow { .. } => DomainError::Validation(err.to_string()),
            ModelError::Identity(_) => DomainError::Business(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::IdentityError;
    use common::{CartId, Version};

    #[test]
    fn constraint_violation_becomes_validation_error() {
        let err = DomainError::from(RepositoryError::ConstraintViolation(
            "Cart validation failed: duplicate".to_string(),
        ));
        assert_eq!(
            err,
            DomainError::Validation("Cart validation failed: duplicate".to_string())
        );
    }

    #[test]
    fn other_repository_faults_become_business_errors() {
        let err = DomainError::from(RepositoryError::NotFound("Product not found: 4".to_string()));
        assert_eq!(err, DomainError::Business("Product not found: 4".to_string()));

        let err = DomainError::from(RepositoryError::ConcurrencyConflict {
            cart_id: CartId::new(1).unwrap(),
            expected: Version::first(),
            actual: Version::new(2),
        });
        assert!(matches!(err, DomainError::Business(_)));
    }

    #[test]
    fn model_errors_are_classified() {
        let err = DomainError::from(ModelError::NegativePrice { price: -5 });
        assert!(matches!(err, DomainError::Validation(_)));

        let err = DomainError::from(ModelError::Identity(IdentityError::Unassigned {
            entity: "Cart",
        }));
        assert_eq!(err.message(), "Cart ID has not been assigned yet");
        assert!(matches!(err, DomainError::Business(_)));

        let err = DomainError::from(ModelError::TotalOverflow {
            total: i64::MAX,
            amount: 1,
        });
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
