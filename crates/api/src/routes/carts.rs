//! Cart endpoints.
//!
//! Every handler answers with the full cart after the operation. Path ids
//! are parsed here so malformed or non-positive ids become 400 responses
//! with the regular error body.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{StatusCode, Uri};
use domain::{CartId, RecipeId};

use crate::dto::CartDto;
use crate::error::{ApiError, ApiResult};
use crate::{AppState, Store};

/// Runs a cart operation and attaches the request path to any failure.
async fn respond<F>(uri: &Uri, operation: F) -> ApiResult<Json<CartDto>>
where
    F: Future<Output = Result<domain::Cart, ApiError>>,
{
    let cart = operation.await.map_err(|e| e.at(uri))?;
    Ok(Json(CartDto::from(&cart)))
}

/// GET /carts/{cart_id}: load a cart with its items.
#[tracing::instrument(skip(state))]
pub async fn get<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    uri: Uri,
    Path(cart_id): Path<String>,
) -> ApiResult<Json<CartDto>> {
    respond(&uri, async {
        let cart_id: CartId = cart_id.parse()?;
        Ok::<_, ApiError>(state.cart_service.get_cart(cart_id).await?)
    })
    .await
}

/// POST /carts: create an empty cart.
#[tracing::instrument(skip(state))]
pub async fn create<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    uri: Uri,
) -> ApiResult<(StatusCode, Json<CartDto>)> {
    let cart = state
        .cart_service
        .create_cart()
        .await
        .map_err(|e| ApiError::from(e).at(&uri))?;

    Ok((StatusCode::CREATED, Json(CartDto::from(&cart))))
}

/// POST /carts/with_recipe/{recipe_id}: create a cart holding a recipe's products.
#[tracing::instrument(skip(state))]
pub async fn create_with_recipe<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    uri: Uri,
    Path(recipe_id): Path<String>,
) -> ApiResult<(StatusCode, Json<CartDto>)> {
    let cart = respond(&uri, async {
        let recipe_id: RecipeId = recipe_id.parse()?;
        let cart = state.cart_service.create_cart_with_recipe(recipe_id).await?;
        Ok::<_, ApiError>(cart)
    })
    .await?;
    Ok((StatusCode::CREATED, cart))
}

/// POST /carts/{cart_id}/add_recipe/{recipe_id}: add a recipe's products to a cart.
#[tracing::instrument(skip(state))]
pub async fn add_recipe<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    uri: Uri,
    Path((cart_id, recipe_id)): Path<(String, String)>,
) -> ApiResult<Json<CartDto>> {
    respond(&uri, async {
        let cart_id: CartId = cart_id.parse()?;
        let recipe_id: RecipeId = recipe_id.parse()?;
        let cart = state.cart_service.add_recipe_to_cart(cart_id, recipe_id).await?;
        Ok::<_, ApiError>(cart)
    })
    .await
}

/// DELETE /carts/{cart_id}/recipes/{recipe_id}: drop a recipe's claim on a cart.
#[tracing::instrument(skip(state))]
pub async fn remove_recipe<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    uri: Uri,
    Path((cart_id, recipe_id)): Path<(String, String)>,
) -> ApiResult<Json<CartDto>> {
    respond(&uri, async {
        let cart_id: CartId = cart_id.parse()?;
        let recipe_id: RecipeId = recipe_id.parse()?;
        let cart = state.cart_service.remove_recipe_from_cart(cart_id, recipe_id).await?;
        Ok::<_, ApiError>(cart)
    })
    .await
}
