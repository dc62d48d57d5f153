//! Domain layer for the recipe cart service.
//!
//! This crate provides:
//! - Entities (products, recipes, carts, cart items) with write-once identities
//! - The cart aggregation engine that merges recipe products into line items
//! - Repository contracts plus an in-memory implementation
//! - Cart and recipe services returning tagged domain results

pub mod error;
pub mod model;
pub mod repository;
pub mod service;

pub use common::{CartId, CartItemId, IdError, ProductId, RecipeId, Version};
pub use error::{DomainError, DomainResult};
pub use model::{
    Cart, CartItem, Entity, Identity, IdentityError, ModelError, Money, Product, Recipe,
};
pub use repository::{
    CartRepository, InMemoryRepository, ProductRepository, RecipeRepository, RepositoryError,
};
pub use service::{CartService, RecipeService};
