use common::ProductId;

use super::{Entity, Identity, ModelError, Money};

/// A priced catalog item.
///
/// Immutable after creation apart from identity assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    identity: Identity<ProductId>,
    name: String,
    price: Money,
}

impl Product {
    /// Creates an unsaved product. The price must not be negative.
    pub fn new(name: impl Into<String>, price_in_cents: i64) -> Result<Self, ModelError> {
        if price_in_cents < 0 {
            return Err(ModelError::NegativePrice {
                price: price_in_cents,
            });
        }

        Ok(Self {
            identity: Identity::unassigned(),
            name: name.into(),
            price: Money::from_cents(price_in_cents),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the flat per-unit price.
    pub fn price(&self) -> Money {
        self.price
    }
}

impl Entity for Product {
    type Id = ProductId;
    const KIND: &'static str = "Product";

    fn identity(&self) -> &Identity<ProductId> {
        &self.identity
    }

    fn identity_mut(&mut self) -> &mut Identity<ProductId> {
        &mut self.identity
    }
}
