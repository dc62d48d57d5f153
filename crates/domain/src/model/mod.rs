//! Entities of the recipe cart domain.

mod cart;
mod cart_item;
mod identity;
mod money;
mod product;
mod recipe;

pub use cart::Cart;
pub use cart_item::CartItem;
pub use identity::{Entity, Identity, IdentityError};
pub use money::Money;
pub use product::Product;
pub use recipe::Recipe;

use common::IdError;
use thiserror::Error;

/// Errors raised by entity construction and mutation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// Identity misuse: read before assignment or assigned twice.
    #[error(transparent)]
    Identity(#[from] IdentityError),

    /// An identifier failed validation.
    #[error(transparent)]
    InvalidId(#[from] IdError),

    /// Prices are flat and never negative.
    #[error("Invalid price: {price} (must not be negative)")]
    NegativePrice { price: i64 },

    /// A cart total left the representable range.
    #[error("Cart total out of range: {total} cents adjusted by {amount} cents")]
    TotalOverflow { total: i64, amount: i64 },
}
