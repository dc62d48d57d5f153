//! PostgreSQL persistence for the recipe cart service.
//!
//! [`PostgresStore`] implements the cart, product and recipe repository
//! contracts from the `domain` crate over a single connection pool.

pub mod error;
pub mod postgres;

pub use error::{Result, StoreError};
pub use postgres::PostgresStore;
