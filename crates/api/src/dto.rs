//! JSON representations of domain entities.
//!
//! Field names are camelCase on the wire.

use chrono::{DateTime, Utc};
use domain::{Cart, CartId, CartItem, CartItemId, Entity, Product, ProductId, Recipe, RecipeId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    pub id: Option<ProductId>,
    pub name: String,
    pub price_in_cents: i64,
}

impl From<&Product> for ProductDto {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id(),
            name: product.name().to_string(),
            price_in_cents: product.price().cents(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDto {
    pub id: Option<RecipeId>,
    pub name: String,
    pub products: Vec<ProductDto>,
}

impl From<&Recipe> for RecipeDto {
    fn from(recipe: &Recipe) -> Self {
        Self {
            id: recipe.id(),
            name: recipe.name().to_string(),
            products: recipe.products().iter().map(ProductDto::from).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemDto {
    pub id: Option<CartItemId>,
    pub product: ProductDto,
    /// Recipes claiming this item, in ascending id order.
    pub recipe_ids: Vec<RecipeId>,
    pub created_at: DateTime<Utc>,
}

impl From<&CartItem> for CartItemDto {
    fn from(item: &CartItem) -> Self {
        Self {
            id: item.id(),
            product: ProductDto::from(item.product()),
            recipe_ids: item.recipe_ids().iter().copied().collect(),
            created_at: item.created_at(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartDto {
    pub id: Option<CartId>,
    pub total_in_cents: i64,
    pub items: Vec<CartItemDto>,
    pub created_at: DateTime<Utc>,
}

impl From<&Cart> for CartDto {
    fn from(cart: &Cart) -> Self {
        Self {
            id: cart.id(),
            total_in_cents: cart.total().cents(),
            items: cart.items().iter().map(CartItemDto::from).collect(),
            created_at: cart.created_at(),
        }
    }
}
