//! Demo catalog seeding.

use domain::{Entity, Product, ProductRepository, Recipe, RecipeRepository, RepositoryError};

const PRODUCTS: &[(&str, i64)] = &[
    ("Flour", 250),
    ("Sugar", 300),
    ("Eggs", 450),
    ("Milk", 199),
    ("Butter", 525),
    ("Spaghetti", 189),
    ("Tomatoes", 349),
    ("Basil", 299),
    ("Parmesan", 799),
];

const RECIPES: &[(&str, &[&str])] = &[
    ("Pancakes", &["Flour", "Eggs", "Milk", "Butter"]),
    ("Sponge Cake", &["Flour", "Sugar", "Eggs", "Butter"]),
    (
        "Spaghetti al Pomodoro",
        &["Spaghetti", "Tomatoes", "Basil", "Parmesan"],
    ),
];

/// Seeds the demo products and recipes into an empty catalog.
///
/// Returns the number of recipes created, zero if products already exist.
#[tracing::instrument(skip(store))]
pub async fn seed_demo_catalog<S>(store: &S) -> Result<usize, RepositoryError>
where
    S: ProductRepository + RecipeRepository,
{
    if !ProductRepository::find_all(store).await?.is_empty() {
        tracing::info!("Catalog already populated, skipping demo seed");
        return Ok(0);
    }

    let mut products = Vec::with_capacity(PRODUCTS.len());
    for (name, price) in PRODUCTS {
        let product = Product::new(*name, *price)
            .map_err(|e| RepositoryError::ConstraintViolation(e.to_string()))?;
        products.push(ProductRepository::save(store, product).await?);
    }

    for (name, ingredients) in RECIPES {
        let mut recipe = Recipe::new(*name);
        for ingredient in *ingredients {
            if let Some(product) = products.iter().find(|p| p.name() == *ingredient) {
                recipe.add_product(product.clone());
            }
        }
        let recipe = RecipeRepository::save(store, recipe).await?;
        tracing::debug!(recipe_id = ?recipe.id(), name, "Seeded recipe");
    }

    tracing::info!(
        products = products.len(),
        recipes = RECIPES.len(),
        "Seeded demo catalog"
    );
    Ok(RECIPES.len())
}
