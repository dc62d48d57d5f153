use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use common::{CartId, CartItemId, RecipeId};

use super::{Entity, Identity, Product};

/// A line item in a cart, claimed by one or more recipes.
///
/// Every recipe that contributed this product to the cart is recorded as a
/// claimant. While the item sits in a cart its claimant set is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItem {
    identity: Identity<CartItemId>,
    cart_id: CartId,
    product: Product,
    created_at: DateTime<Utc>,
    recipe_ids: BTreeSet<RecipeId>,
}

impl CartItem {
    /// Creates an unclaimed, unsaved item.
    pub fn new(cart_id: CartId, product: Product, created_at: DateTime<Utc>) -> Self {
        Self {
            identity: Identity::unassigned(),
            cart_id,
            product,
            created_at,
            recipe_ids: BTreeSet::new(),
        }
    }

    pub fn cart_id(&self) -> CartId {
        self.cart_id
    }

    pub fn product(&self) -> &Product {
        &self.product
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the recipes currently claiming this item.
    pub fn recipe_ids(&self) -> &BTreeSet<RecipeId> {
        &self.recipe_ids
    }

    /// Registers a claimant. Adding an existing claimant has no effect.
    pub fn add_recipe(&mut self, recipe_id: RecipeId) {
        self.recipe_ids.insert(recipe_id);
    }

    pub(crate) fn remove_recipe(&mut self, recipe_id: RecipeId) {
        self.recipe_ids.remove(&recipe_id);
    }

    pub fn is_claimed_by(&self, recipe_id: RecipeId) -> bool {
        self.recipe_ids.contains(&recipe_id)
    }

    /// Returns true unless `recipe_id` is the sole claimant.
    pub fn is_used_by_other_recipes(&self, recipe_id: RecipeId) -> bool {
        self.recipe_ids.len() > 1
            || (self.recipe_ids.len() == 1 && !self.recipe_ids.contains(&recipe_id))
    }
}

impl Entity for CartItem {
    type Id = CartItemId;
    const KIND: &'static str = "CartItem";

    fn identity(&self) -> &Identity<CartItemId> {
        &self.identity
    }

    fn identity_mut(&mut self) -> &mut Identity<CartItemId> {
        &mut self.identity
    }
}
