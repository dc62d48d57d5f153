//! Cart aggregate and the recipe aggregation engine.

use chrono::{DateTime, Utc};
use common::{CartId, ProductId, RecipeId, Version};

use super::{CartItem, Entity, Identity, ModelError, Money, Product};

/// Cart aggregate root.
///
/// Accumulates line items derived from recipes. Each product appears at most
/// once; a line item shared by several recipes is counted once in the total
/// and remembers every recipe that claims it.
///
/// Invariant: `total` always equals the sum of the prices of `items`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cart {
    identity: Identity<CartId>,

    /// Current version for optimistic concurrency.
    version: Version,

    total: Money,
    created_at: DateTime<Utc>,
    items: Vec<CartItem>,
}

impl Default for Cart {
    fn default() -> Self {
        Self::new()
    }
}

impl Cart {
    /// Creates an empty, unsaved cart stamped with the current time.
    pub fn new() -> Self {
        Self::restore(Money::zero(), Utc::now(), Version::initial())
    }

    /// Rebuilds a cart shell from stored state.
    ///
    /// Items are attached afterwards with [`Cart::add_item`]; the total is
    /// taken as stored and not recomputed.
    pub fn restore(total: Money, created_at: DateTime<Utc>, version: Version) -> Self {
        Self {
            identity: Identity::unassigned(),
            version,
            total,
            created_at,
            items: Vec::new(),
        }
    }
}

// Query methods
impl Cart {
    /// Returns the sum of the distinct line item prices.
    pub fn total(&self) -> Money {
        self.total
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn version(&self) -> Version {
        self.version
    }

    /// Returns all line items in insertion order.
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Returns the line item for a product, if present.
    pub fn item(&self, product_id: ProductId) -> Option<&CartItem> {
        self.items
            .iter()
            .find(|item| item.product().id() == Some(product_id))
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn position_of(&self, product_id: ProductId) -> Option<usize> {
        self.items
            .iter()
            .position(|item| item.product().id() == Some(product_id))
    }
}

// Mutations
impl Cart {
    /// Attaches a stored line item while rebuilding a cart.
    ///
    /// The item is skipped if another item already covers the same product.
    /// Leaves the total untouched. Returns whether the item was appended.
    pub fn add_item(&mut self, item: CartItem) -> bool {
        let duplicate = self
            .items
            .iter()
            .any(|existing| existing.product().id() == item.product().id());
        if duplicate {
            return false;
        }
        self.items.push(item);
        true
    }

    /// Adds a recipe's product to the cart.
    ///
    /// If a line item for the product already exists, `recipe_id` becomes an
    /// additional claimant and the total is unchanged. Otherwise a new item
    /// claimed by `recipe_id` is appended and its price added to the total.
    ///
    /// Both the cart and the product must already be persisted. Fails with
    /// `TotalOverflow`, leaving the cart unchanged, if the new total does not
    /// fit in cents.
    pub fn create_item(
        &mut self,
        product: &Product,
        recipe_id: RecipeId,
    ) -> Result<&CartItem, ModelError> {
        let product_id = product.require_id()?;

        if let Some(index) = self.position_of(product_id) {
            tracing::debug!(
                %product_id,
                cart_id = ?self.id(),
                %recipe_id,
                "product already in cart, adding recipe reference"
            );
            self.items[index].add_recipe(recipe_id);
            return Ok(&self.items[index]);
        }

        let cart_id = self.require_id()?;
        let total = self
            .total
            .checked_add(product.price())
            .ok_or(ModelError::TotalOverflow {
                total: self.total.cents(),
                amount: product.price().cents(),
            })?;

        let mut item = CartItem::new(cart_id, product.clone(), Utc::now());
        item.add_recipe(recipe_id);
        self.total = total;
        self.items.push(item);

        let index = self.items.len() - 1;
        Ok(&self.items[index])
    }

    /// Detaches a recipe from the cart.
    ///
    /// Items claimed only by `recipe_id` are removed and their prices
    /// subtracted from the total. Items shared with other recipes stay and
    /// lose `recipe_id` as a claimant. The sole-claimant check runs against
    /// the claimant sets as they were before any claimant is stripped.
    ///
    /// Returns the number of removed items. Fails with `TotalOverflow`,
    /// leaving the cart unchanged, if a stored total cannot absorb the
    /// released amount.
    pub fn remove_recipe_items(&mut self, recipe_id: RecipeId) -> Result<usize, ModelError> {
        let sole_claimant = |item: &CartItem| {
            item.is_claimed_by(recipe_id) && !item.is_used_by_other_recipes(recipe_id)
        };

        let overflow = |amount: Money| ModelError::TotalOverflow {
            total: self.total.cents(),
            amount: amount.cents(),
        };
        let mut released = Money::zero();
        for item in self.items.iter().filter(|item| sole_claimant(*item)) {
            let price = item.product().price();
            released = released.checked_add(price).ok_or_else(|| overflow(price))?;
        }
        let total = self
            .total
            .checked_sub(released)
            .ok_or_else(|| overflow(released))?;

        let before = self.items.len();
        self.items.retain(|item| !sole_claimant(item));
        self.total = total;

        let removed = before - self.items.len();
        tracing::debug!(%recipe_id, removed, "removed items claimed only by recipe");

        for item in self
            .items
            .iter_mut()
            .filter(|item| item.is_claimed_by(recipe_id))
        {
            item.remove_recipe(recipe_id);
        }

        Ok(removed)
    }
}

impl Entity for Cart {
    type Id = CartId;
    const KIND: &'static str = "Cart";

    fn identity(&self) -> &Identity<CartId> {
        &self.identity
    }

    fn identity_mut(&mut self) -> &mut Identity<CartId> {
        &mut self.identity
    }
}
