//! Persistence contracts consumed by the services.
//!
//! The services only ever load and save whole aggregates; how they are
//! stored is up to the implementation. [`InMemoryRepository`] ships here
//! for tests and storage-less deployments, the PostgreSQL implementation
//! lives in the `store` crate.

mod memory;

pub use memory::InMemoryRepository;

use async_trait::async_trait;
use common::{CartId, ProductId, RecipeId, Version};
use thiserror::Error;

use crate::model::{Cart, Product, Recipe};

/// Errors raised by repository implementations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// An entity referenced by the saved aggregate is not stored.
    #[error("{0}")]
    NotFound(String),

    /// The storage rejected the write on a constraint.
    #[error("{0}")]
    ConstraintViolation(String),

    /// Another writer saved the cart after it was loaded.
    #[error(
        "Concurrency conflict for cart {cart_id}: expected version {expected}, found {actual}"
    )]
    ConcurrencyConflict {
        cart_id: CartId,
        expected: Version,
        actual: Version,
    },

    /// The storage backend failed.
    #[error("Storage error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, RepositoryError>;

/// Store of cart aggregates, items included.
#[async_trait]
pub trait CartRepository: Send + Sync {
    /// Loads a cart with all its items. Returns None if it doesn't exist.
    async fn find_by_id(&self, id: CartId) -> Result<Option<Cart>>;

    /// Persists a cart and returns the stored state.
    ///
    /// The first save assigns the cart identity. Every save assigns
    /// identities to new items, replaces the stored item list and bumps the
    /// version. Fails with `NotFound` if an identified cart or a referenced
    /// product is missing, and with `ConcurrencyConflict` if the cart
    /// version no longer matches the stored one.
    async fn save(&self, cart: Cart) -> Result<Cart>;
}

/// Store of catalog products.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>>;

    async fn find_all(&self) -> Result<Vec<Product>>;

    /// Inserts or updates a product, assigning its identity on insert.
    async fn save(&self, product: Product) -> Result<Product>;
}

/// Store of recipes and their product lists.
#[async_trait]
pub trait RecipeRepository: Send + Sync {
    async fn find_by_id(&self, id: RecipeId) -> Result<Option<Recipe>>;

    async fn find_all(&self) -> Result<Vec<Recipe>>;

    /// Inserts or updates a recipe. Every listed product must already be
    /// stored, otherwise the save fails with `ConstraintViolation`.
    async fn save(&self, recipe: Recipe) -> Result<Recipe>;
}
