use domain::{IdError, IdentityError, ModelError, RepositoryError};
use thiserror::Error;

/// SQLSTATE reported when a REPEATABLE READ transaction loses a write race.
const SERIALIZATION_FAILURE: &str = "40001";

/// Errors that can occur inside the PostgreSQL store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A stored row could not be turned back into an entity.
    #[error("Corrupt row in {table}: {reason}")]
    CorruptRow { table: &'static str, reason: String },

    /// The store rejected the operation with a repository-level error.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

impl StoreError {
    pub(crate) fn corrupt(table: &'static str, err: impl std::fmt::Display) -> Self {
        Self::CorruptRow {
            table,
            reason: err.to_string(),
        }
    }

    /// Returns true if the database aborted the transaction on a write race.
    pub fn is_serialization_failure(&self) -> bool {
        matches!(
            self,
            Self::Database(sqlx::Error::Database(db))
                if db.code().as_deref() == Some(SERIALIZATION_FAILURE)
        )
    }

    /// Converts into the repository error seen by the services.
    ///
    /// Unique, foreign key and check violations become constraint
    /// violations prefixed with the entity being saved; everything else is
    /// a backend failure.
    pub fn into_repository_error(self, entity: &str) -> RepositoryError {
        match self {
            Self::Repository(err) => err,
            Self::Database(sqlx::Error::Database(db))
                if db.is_unique_violation()
                    || db.is_foreign_key_violation()
                    || db.is_check_violation() =>
            {
                RepositoryError::ConstraintViolation(format!(
                    "{entity} validation failed: {}",
                    db.message()
                ))
            }
            other => RepositoryError::Backend(Box::new(other)),
        }
    }
}

impl From<IdError> for StoreError {
    fn from(err: IdError) -> Self {
        Self::corrupt("identity", err)
    }
}

impl From<ModelError> for StoreError {
    fn from(err: ModelError) -> Self {
        Self::corrupt("entity", err)
    }
}

impl From<IdentityError> for StoreError {
    fn from(err: IdentityError) -> Self {
        Self::corrupt("identity", err)
    }
}
