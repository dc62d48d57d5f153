//! Recipe read endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::Uri;
use domain::RecipeId;

use crate::dto::RecipeDto;
use crate::error::{ApiError, ApiResult};
use crate::{AppState, Store};

/// GET /recipes: list every recipe in the catalog.
#[tracing::instrument(skip(state))]
pub async fn list<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    uri: Uri,
) -> ApiResult<Json<Vec<RecipeDto>>> {
    let recipes = state
        .recipe_service
        .get_all_recipes()
        .await
        .map_err(|e| ApiError::from(e).at(&uri))?;

    Ok(Json(recipes.iter().map(RecipeDto::from).collect()))
}

/// GET /recipes/{id}: load one recipe with its products.
#[tracing::instrument(skip(state))]
pub async fn get<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    uri: Uri,
    Path(id): Path<String>,
) -> ApiResult<Json<RecipeDto>> {
    let recipe = async {
        let id: RecipeId = id.parse()?;
        Ok::<_, ApiError>(state.recipe_service.get_recipe_by_id(id).await?)
    }
    .await
    .map_err(|e| e.at(&uri))?;

    Ok(Json(RecipeDto::from(&recipe)))
}
