//! Shared types for the recipe cart service.
//!
//! Every persisted entity kind gets its own identifier type so a cart id can
//! never be passed where a recipe id is expected, even though both wrap the
//! same database integer.

pub mod ids;
pub mod version;

pub use ids::{CartId, CartItemId, IdError, ProductId, RecipeId};
pub use version::Version;
