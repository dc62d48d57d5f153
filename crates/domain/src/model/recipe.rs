use common::RecipeId;

use super::{Entity, Identity, Product};

/// A named bundle of products.
///
/// Products are only ever appended; the same product may be listed twice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    identity: Identity<RecipeId>,
    name: String,
    products: Vec<Product>,
}

impl Recipe {
    /// Creates an unsaved recipe with no products.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            identity: Identity::unassigned(),
            name: name.into(),
            products: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the products in the order they were added.
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn add_product(&mut self, product: Product) {
        self.products.push(product);
    }

    /// Builder-style variant of [`Recipe::add_product`].
    pub fn with_product(mut self, product: Product) -> Self {
        self.add_product(product);
        self
    }
}

impl Entity for Recipe {
    type Id = RecipeId;
    const KIND: &'static str = "Recipe";

    fn identity(&self) -> &Identity<RecipeId> {
        &self.identity
    }

    fn identity_mut(&mut self) -> &mut Identity<RecipeId> {
        &mut self.identity
    }
}
