use common::RecipeId;

use crate::error::{DomainError, DomainResult};
use crate::model::Recipe;
use crate::repository::RecipeRepository;

/// Read access to recipes.
#[derive(Debug, Clone)]
pub struct RecipeService<R> {
    repository: R,
}

impl<R: RecipeRepository> RecipeService<R> {
    /// Creates a new recipe service over the given repository.
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    /// Returns every stored recipe. An empty catalog is not an error.
    #[tracing::instrument(skip(self))]
    pub async fn get_all_recipes(&self) -> DomainResult<Vec<Recipe>> {
        Ok(self.repository.find_all().await?)
    }

    /// Loads a recipe by ID.
    #[tracing::instrument(skip(self))]
    pub async fn get_recipe_by_id(&self, id: RecipeId) -> DomainResult<Recipe> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("Recipe not found for id: {id}.")))
    }
}
