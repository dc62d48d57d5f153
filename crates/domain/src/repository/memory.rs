use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::{CartId, CartItemId, IdError, ProductId, RecipeId};
use tokio::sync::RwLock;

use super::{CartRepository, ProductRepository, RecipeRepository, RepositoryError, Result};
use crate::model::{Cart, Entity, Product, Recipe};

#[derive(Debug, Default)]
struct State {
    products: BTreeMap<ProductId, Product>,
    recipes: BTreeMap<RecipeId, Recipe>,
    carts: BTreeMap<CartId, Cart>,
    product_seq: i64,
    recipe_seq: i64,
    cart_seq: i64,
    cart_item_seq: i64,
}

/// In-memory repository implementation for testing.
///
/// Implements all three repository contracts over one shared state, with
/// the same identity, version and referential checks as the PostgreSQL
/// implementation. Cloning shares the underlying state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    state: Arc<RwLock<State>>,
}

impl InMemoryRepository {
    /// Creates a new empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored carts.
    pub async fn cart_count(&self) -> usize {
        self.state.read().await.carts.len()
    }
}

fn backend(err: impl std::error::Error + Send + Sync + 'static) -> RepositoryError {
    RepositoryError::Backend(Box::new(err))
}

fn next_id<I>(seq: &mut i64, make: fn(i64) -> std::result::Result<I, IdError>) -> Result<I> {
    *seq += 1;
    make(*seq).map_err(backend)
}

#[async_trait]
impl ProductRepository for InMemoryRepository {
    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>> {
        Ok(self.state.read().await.products.get(&id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Product>> {
        Ok(self.state.read().await.products.values().cloned().collect())
    }

    async fn save(&self, mut product: Product) -> Result<Product> {
        let mut guard = self.state.write().await;
        let state = &mut *guard;

        let id = match product.id() {
            Some(id) => id,
            None => {
                let id = next_id(&mut state.product_seq, ProductId::new)?;
                product.assign_id(id).map_err(backend)?;
                id
            }
        };

        state.products.insert(id, product.clone());
        Ok(product)
    }
}

#[async_trait]
impl RecipeRepository for InMemoryRepository {
    async fn find_by_id(&self, id: RecipeId) -> Result<Option<Recipe>> {
        Ok(self.state.read().await.recipes.get(&id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Recipe>> {
        Ok(self.state.read().await.recipes.values().cloned().collect())
    }

    async fn save(&self, mut recipe: Recipe) -> Result<Recipe> {
        let mut guard = self.state.write().await;
        let state = &mut *guard;

        for product in recipe.products() {
            let stored = product
                .id()
                .is_some_and(|id| state.products.contains_key(&id));
            if !stored {
                return Err(RepositoryError::ConstraintViolation(format!(
                    "Recipe validation failed: product '{}' is not stored",
                    product.name()
                )));
            }
        }

        let id = match recipe.id() {
            Some(id) => id,
            None => {
                let id = next_id(&mut state.recipe_seq, RecipeId::new)?;
                recipe.assign_id(id).map_err(backend)?;
                id
            }
        };

        state.recipes.insert(id, recipe.clone());
        Ok(recipe)
    }
}

#[async_trait]
impl CartRepository for InMemoryRepository {
    async fn find_by_id(&self, id: CartId) -> Result<Option<Cart>> {
        Ok(self.state.read().await.carts.get(&id).cloned())
    }

    async fn save(&self, cart: Cart) -> Result<Cart> {
        let mut guard = self.state.write().await;
        let state = &mut *guard;

        let cart_id = match cart.id() {
            Some(id) => {
                let stored = state
                    .carts
                    .get(&id)
                    .ok_or_else(|| RepositoryError::NotFound(format!("Cart not found: {id}")))?;
                if stored.version() != cart.version() {
                    return Err(RepositoryError::ConcurrencyConflict {
                        cart_id: id,
                        expected: cart.version(),
                        actual: stored.version(),
                    });
                }
                id
            }
            None => next_id(&mut state.cart_seq, CartId::new)?,
        };

        for item in cart.items() {
            let product_id = item.product().require_id().map_err(|e| {
                RepositoryError::ConstraintViolation(format!("Cart validation failed: {e}"))
            })?;
            if !state.products.contains_key(&product_id) {
                return Err(RepositoryError::NotFound(format!(
                    "Product not found: {product_id}"
                )));
            }
        }

        let mut stored = Cart::restore(cart.total(), cart.created_at(), cart.version().next());
        stored.assign_id(cart_id).map_err(backend)?;
        for item in cart.items() {
            let mut item = item.clone();
            if !item.has_id() {
                let item_id = next_id(&mut state.cart_item_seq, CartItemId::new)?;
                item.assign_id(item_id).map_err(backend)?;
            }
            stored.add_item(item);
        }

        state.carts.insert(cart_id, stored.clone());
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::Version;

    async fn stored_product(repo: &InMemoryRepository, name: &str, price: i64) -> Product {
        ProductRepository::save(repo, Product::new(name, price).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn save_assigns_sequential_product_ids() {
        let repo = InMemoryRepository::new();
        let a = stored_product(&repo, "A", 100).await;
        let b = stored_product(&repo, "B", 200).await;

        assert_eq!(a.id(), Some(ProductId::new(1).unwrap()));
        assert_eq!(b.id(), Some(ProductId::new(2).unwrap()));
        assert_eq!(ProductRepository::find_all(&repo).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn recipe_with_unsaved_product_is_rejected() {
        let repo = InMemoryRepository::new();
        let recipe = Recipe::new("Broken").with_product(Product::new("Ghost", 1).unwrap());

        let err = RecipeRepository::save(&repo, recipe).await.unwrap_err();
        assert!(matches!(err, RepositoryError::ConstraintViolation(_)));
    }

    #[tokio::test]
    async fn first_cart_save_assigns_identity_and_version() {
        let repo = InMemoryRepository::new();
        let cart = CartRepository::save(&repo, Cart::new()).await.unwrap();

        assert_eq!(cart.id(), Some(CartId::new(1).unwrap()));
        assert_eq!(cart.version(), Version::first());
        assert_eq!(repo.cart_count().await, 1);
    }

    #[tokio::test]
    async fn cart_save_assigns_item_ids_and_keeps_existing_ones() {
        let repo = InMemoryRepository::new();
        let flour = stored_product(&repo, "Flour", 100).await;
        let eggs = stored_product(&repo, "Eggs", 200).await;
        let recipe = RecipeId::new(1).unwrap();

        let mut cart = CartRepository::save(&repo, Cart::new()).await.unwrap();
        cart.create_item(&flour, recipe).unwrap();
        let mut cart = CartRepository::save(&repo, cart).await.unwrap();
        let first_item_id = cart.items()[0].id();
        assert!(first_item_id.is_some());

        cart.create_item(&eggs, recipe).unwrap();
        let cart = CartRepository::save(&repo, cart).await.unwrap();

        assert_eq!(cart.items()[0].id(), first_item_id);
        assert!(cart.items()[1].has_id());
        assert_eq!(cart.version(), Version::new(3));
    }

    #[tokio::test]
    async fn stale_cart_save_is_a_conflict() {
        let repo = InMemoryRepository::new();
        let cart = CartRepository::save(&repo, Cart::new()).await.unwrap();
        let cart_id = cart.id().unwrap();

        let first = CartRepository::find_by_id(&repo, cart_id).await.unwrap().unwrap();
        let second = CartRepository::find_by_id(&repo, cart_id).await.unwrap().unwrap();

        CartRepository::save(&repo, first).await.unwrap();
        let err = CartRepository::save(&repo, second).await.unwrap_err();

        assert!(matches!(
            err,
            RepositoryError::ConcurrencyConflict { expected, actual, .. }
                if expected == Version::first() && actual == Version::new(2)
        ));
    }

    #[tokio::test]
    async fn saving_unknown_cart_is_not_found() {
        let repo = InMemoryRepository::new();
        let mut cart = Cart::new();
        cart.assign_id(CartId::new(42).unwrap()).unwrap();

        let err = CartRepository::save(&repo, cart).await.unwrap_err();
        assert_eq!(err.to_string(), "Cart not found: 42");
    }

    #[tokio::test]
    async fn cart_item_with_missing_product_is_not_found() {
        let repo = InMemoryRepository::new();
        let mut ghost = Product::new("Ghost", 100).unwrap();
        ghost.assign_id(ProductId::new(77).unwrap()).unwrap();

        let mut cart = CartRepository::save(&repo, Cart::new()).await.unwrap();
        cart.create_item(&ghost, RecipeId::new(1).unwrap()).unwrap();

        let err = CartRepository::save(&repo, cart).await.unwrap_err();
        assert_eq!(err.to_string(), "Product not found: 77");
    }
}
