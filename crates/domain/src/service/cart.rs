use common::{CartId, RecipeId};

use crate::error::{DomainError, DomainResult};
use crate::model::{Cart, Entity};
use crate::repository::{CartRepository, RecipeRepository};

use super::RecipeService;

/// Service for managing carts.
///
/// Loads carts and recipes, runs the aggregation engine on the in-memory
/// cart and saves the result. Repository and model faults come back as
/// tagged [`DomainError`]s, never as panics.
///
/// Adding and removing recipes are read-modify-write operations on one cart.
/// They rely on the repository's version check so that two concurrent
/// writers cannot silently overwrite each other's item list.
#[derive(Debug, Clone)]
pub struct CartService<C, R> {
    carts: C,
    recipes: RecipeService<R>,
}

impl<C, R> CartService<C, R>
where
    C: CartRepository,
    R: RecipeRepository,
{
    /// Creates a new cart service.
    pub fn new(carts: C, recipes: RecipeService<R>) -> Self {
        Self { carts, recipes }
    }

    /// Loads a cart by ID.
    #[tracing::instrument(skip(self))]
    pub async fn get_cart(&self, id: CartId) -> DomainResult<Cart> {
        self.carts
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("Cart entity not found for id: {id}.")))
    }

    /// Creates and persists an empty cart.
    #[tracing::instrument(skip(self))]
    pub async fn create_cart(&self) -> DomainResult<Cart> {
        let cart = self.carts.save(Cart::new()).await?;
        metrics::counter!("carts_created_total").increment(1);
        Ok(cart)
    }

    /// Creates a cart holding every product of a recipe.
    ///
    /// The empty cart is saved once to obtain an identity before items are
    /// created, then saved again with its items.
    #[tracing::instrument(skip(self))]
    pub async fn create_cart_with_recipe(&self, recipe_id: RecipeId) -> DomainResult<Cart> {
        let recipe = self.recipes.get_recipe_by_id(recipe_id).await?;

        let mut cart = self.carts.save(Cart::new()).await?;
        for product in recipe.products() {
            cart.create_item(product, recipe_id)?;
        }
        let cart = self.carts.save(cart).await?;

        metrics::counter!("carts_created_total").increment(1);
        metrics::counter!("cart_recipes_added_total").increment(1);
        tracing::debug!(
            cart_id = ?cart.id(),
            %recipe_id,
            items = cart.item_count(),
            "created cart with recipe"
        );
        Ok(cart)
    }

    /// Adds every product of a recipe to an existing cart.
    ///
    /// Both lookups always run. When both fail, the cart error wins.
    #[tracing::instrument(skip(self))]
    pub async fn add_recipe_to_cart(
        &self,
        cart_id: CartId,
        recipe_id: RecipeId,
    ) -> DomainResult<Cart> {
        let (cart, recipe) = tokio::join!(
            self.get_cart(cart_id),
            self.recipes.get_recipe_by_id(recipe_id)
        );
        let mut cart = cart?;
        let recipe = recipe?;

        for product in recipe.products() {
            cart.create_item(product, recipe_id)?;
        }
        let cart = self.carts.save(cart).await?;

        metrics::counter!("cart_recipes_added_total").increment(1);
        tracing::debug!(
            %cart_id,
            %recipe_id,
            items = cart.item_count(),
            "added recipe to cart"
        );
        Ok(cart)
    }

    /// Detaches a recipe from a cart.
    ///
    /// Items only this recipe claims are dropped; shared items stay.
    /// Both lookups always run. When both fail, the cart error wins.
    #[tracing::instrument(skip(self))]
    pub async fn remove_recipe_from_cart(
        &self,
        cart_id: CartId,
        recipe_id: RecipeId,
    ) -> DomainResult<Cart> {
        let (cart, recipe) = tokio::join!(
            self.get_cart(cart_id),
            self.recipes.get_recipe_by_id(recipe_id)
        );
        let mut cart = cart?;
        recipe?;

        let removed = cart.remove_recipe_items(recipe_id)?;
        let cart = self.carts.save(cart).await?;

        metrics::counter!("cart_recipes_removed_total").increment(1);
        tracing::info!(%cart_id, %recipe_id, removed, "removed recipe from cart");
        Ok(cart)
    }
}
