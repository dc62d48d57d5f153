use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::{
    Cart, CartId, CartItem, CartItemId, CartRepository, Entity, Money, Product, ProductId,
    ProductRepository, Recipe, RecipeId, RecipeRepository, RepositoryError, Version,
    repository::Result as RepositoryResult,
};
use sqlx::{PgConnection, PgPool, Row, postgres::PgRow};

use crate::{Result, StoreError};

/// PostgreSQL-backed repository for products, recipes and carts.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new PostgreSQL store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    fn row_to_product(row: &PgRow) -> Result<Product> {
        let mut product = Product::new(
            row.try_get::<String, _>("name")?,
            row.try_get::<i64, _>("price_in_cents")?,
        )?;
        product.assign_id(ProductId::new(row.try_get("id")?)?)?;
        Ok(product)
    }

    async fn load_product(conn: &mut PgConnection, id: ProductId) -> Result<Option<Product>> {
        let row = sqlx::query("SELECT id, name, price_in_cents FROM products WHERE id = $1")
            .bind(id.get())
            .fetch_optional(&mut *conn)
            .await?;

        row.as_ref().map(Self::row_to_product).transpose()
    }

    async fn load_recipe(conn: &mut PgConnection, id: RecipeId) -> Result<Option<Recipe>> {
        let Some(row) = sqlx::query("SELECT id, name FROM recipes WHERE id = $1")
            .bind(id.get())
            .fetch_optional(&mut *conn)
            .await?
        else {
            return Ok(None);
        };

        let mut recipe = Recipe::new(row.try_get::<String, _>("name")?);
        recipe.assign_id(id)?;

        let products = sqlx::query(
            r#"
            SELECT p.id, p.name, p.price_in_cents
            FROM recipe_products rp
            JOIN products p ON p.id = rp.product_id
            WHERE rp.recipe_id = $1
            ORDER BY rp.position
            "#,
        )
        .bind(id.get())
        .fetch_all(&mut *conn)
        .await?;

        for row in &products {
            recipe.add_product(Self::row_to_product(row)?);
        }

        Ok(Some(recipe))
    }

    async fn load_all_recipes(conn: &mut PgConnection) -> Result<Vec<Recipe>> {
        let rows = sqlx::query("SELECT id, name FROM recipes ORDER BY id")
            .fetch_all(&mut *conn)
            .await?;

        let mut recipes = BTreeMap::new();
        for row in &rows {
            let id = RecipeId::new(row.try_get("id")?)?;
            let mut recipe = Recipe::new(row.try_get::<String, _>("name")?);
            recipe.assign_id(id)?;
            recipes.insert(id, recipe);
        }

        let product_rows = sqlx::query(
            r#"
            SELECT rp.recipe_id, p.id, p.name, p.price_in_cents
            FROM recipe_products rp
            JOIN products p ON p.id = rp.product_id
            ORDER BY rp.recipe_id, rp.position
            "#,
        )
        .fetch_all(&mut *conn)
        .await?;

        for row in &product_rows {
            let recipe_id = RecipeId::new(row.try_get("recipe_id")?)?;
            let recipe = recipes.get_mut(&recipe_id).ok_or_else(|| {
                StoreError::corrupt("recipe_products", format!("unknown recipe {recipe_id}"))
            })?;
            recipe.add_product(Self::row_to_product(row)?);
        }

        Ok(recipes.into_values().collect())
    }

    async fn load_cart(conn: &mut PgConnection, id: CartId) -> Result<Option<Cart>> {
        let Some(row) = sqlx::query(
            "SELECT id, total_in_cents, created_at, version FROM carts WHERE id = $1",
        )
        .bind(id.get())
        .fetch_optional(&mut *conn)
        .await?
        else {
            return Ok(None);
        };

        let mut cart = Cart::restore(
            Money::from_cents(row.try_get("total_in_cents")?),
            row.try_get::<DateTime<Utc>, _>("created_at")?,
            Version::new(row.try_get("version")?),
        );
        cart.assign_id(id)?;

        let claimant_rows = sqlx::query(
            r#"
            SELECT cir.cart_item_id, cir.recipe_id
            FROM cart_item_recipes cir
            JOIN cart_items ci ON ci.id = cir.cart_item_id
            WHERE ci.cart_id = $1
            "#,
        )
        .bind(id.get())
        .fetch_all(&mut *conn)
        .await?;

        let mut claimants: BTreeMap<i64, Vec<RecipeId>> = BTreeMap::new();
        for row in &claimant_rows {
            claimants
                .entry(row.try_get("cart_item_id")?)
                .or_default()
                .push(RecipeId::new(row.try_get("recipe_id")?)?);
        }

        let item_rows = sqlx::query(
            r#"
            SELECT ci.id AS item_id, ci.created_at, p.id, p.name, p.price_in_cents
            FROM cart_items ci
            JOIN products p ON p.id = ci.product_id
            WHERE ci.cart_id = $1
            ORDER BY ci.id
            "#,
        )
        .bind(id.get())
        .fetch_all(&mut *conn)
        .await?;

        for row in &item_rows {
            let item_id: i64 = row.try_get("item_id")?;
            let mut item = CartItem::new(
                id,
                Self::row_to_product(row)?,
                row.try_get::<DateTime<Utc>, _>("created_at")?,
            );
            item.assign_id(CartItemId::new(item_id)?)?;
            for recipe_id in claimants.remove(&item_id).unwrap_or_default() {
                item.add_recipe(recipe_id);
            }
            cart.add_item(item);
        }

        Ok(Some(cart))
    }

    async fn save_product(&self, mut product: Product) -> Result<Product> {
        let id: i64 = match product.id() {
            Some(id) => {
                sqlx::query_scalar(
                    r#"
                    INSERT INTO products (id, name, price_in_cents)
                    VALUES ($1, $2, $3)
                    ON CONFLICT (id) DO UPDATE
                    SET name = EXCLUDED.name, price_in_cents = EXCLUDED.price_in_cents
                    RETURNING id
                    "#,
                )
                .bind(id.get())
                .bind(product.name())
                .bind(product.price().cents())
                .fetch_one(&self.pool)
                .await?
            }
            None => {
                sqlx::query_scalar(
                    "INSERT INTO products (name, price_in_cents) VALUES ($1, $2) RETURNING id",
                )
                .bind(product.name())
                .bind(product.price().cents())
                .fetch_one(&self.pool)
                .await?
            }
        };

        if !product.has_id() {
            product.assign_id(ProductId::new(id)?)?;
        }
        Ok(product)
    }

    async fn save_recipe(&self, mut recipe: Recipe) -> Result<Recipe> {
        let mut product_ids = Vec::with_capacity(recipe.products().len());
        for product in recipe.products() {
            let id = product.id().ok_or_else(|| {
                RepositoryError::ConstraintViolation(format!(
                    "Recipe validation failed: product '{}' is not stored",
                    product.name()
                ))
            })?;
            product_ids.push(id);
        }

        let mut tx = self.pool.begin().await?;

        let id: i64 = match recipe.id() {
            Some(id) => {
                sqlx::query_scalar(
                    r#"
                    INSERT INTO recipes (id, name) VALUES ($1, $2)
                    ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name
                    RETURNING id
                    "#,
                )
                .bind(id.get())
                .bind(recipe.name())
                .fetch_one(&mut *tx)
                .await?
            }
            None => {
                sqlx::query_scalar("INSERT INTO recipes (name) VALUES ($1) RETURNING id")
                    .bind(recipe.name())
                    .fetch_one(&mut *tx)
                    .await?
            }
        };

        sqlx::query("DELETE FROM recipe_products WHERE recipe_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        for (position, product_id) in (0_i32..).zip(&product_ids) {
            sqlx::query(
                "INSERT INTO recipe_products (recipe_id, position, product_id) VALUES ($1, $2, $3)",
            )
            .bind(id)
            .bind(position)
            .bind(product_id.get())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        if !recipe.has_id() {
            recipe.assign_id(RecipeId::new(id)?)?;
        }
        Ok(recipe)
    }

    async fn save_cart(&self, cart: &Cart) -> Result<Cart> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ")
            .execute(&mut *tx)
            .await?;

        let cart_id = match cart.id() {
            Some(id) => {
                let updated: Option<i64> = sqlx::query_scalar(
                    r#"
                    UPDATE carts SET total_in_cents = $2, version = version + 1
                    WHERE id = $1 AND version = $3
                    RETURNING version
                    "#,
                )
                .bind(id.get())
                .bind(cart.total().cents())
                .bind(cart.version().as_i64())
                .fetch_optional(&mut *tx)
                .await?;

                if updated.is_none() {
                    let actual: Option<i64> =
                        sqlx::query_scalar("SELECT version FROM carts WHERE id = $1")
                            .bind(id.get())
                            .fetch_optional(&mut *tx)
                            .await?;

                    return Err(match actual {
                        Some(actual) => RepositoryError::ConcurrencyConflict {
                            cart_id: id,
                            expected: cart.version(),
                            actual: Version::new(actual),
                        },
                        None => RepositoryError::NotFound(format!("Cart not found: {id}")),
                    }
                    .into());
                }
                id
            }
            None => {
                let id: i64 = sqlx::query_scalar(
                    r#"
                    INSERT INTO carts (total_in_cents, created_at, version)
                    VALUES ($1, $2, $3)
                    RETURNING id
                    "#,
                )
                .bind(cart.total().cents())
                .bind(cart.created_at())
                .bind(cart.version().next().as_i64())
                .fetch_one(&mut *tx)
                .await?;
                CartId::new(id)?
            }
        };

        sqlx::query("DELETE FROM cart_items WHERE cart_id = $1")
            .bind(cart_id.get())
            .execute(&mut *tx)
            .await?;

        for item in cart.items() {
            let product_id = item.product().require_id().map_err(|e| {
                RepositoryError::ConstraintViolation(format!("Cart validation failed: {e}"))
            })?;

            if Self::load_product(&mut *tx, product_id).await?.is_none() {
                return Err(
                    RepositoryError::NotFound(format!("Product not found: {product_id}")).into(),
                );
            }

            let item_id: i64 = sqlx::query_scalar(
                r#"
                INSERT INTO cart_items (id, cart_id, product_id, created_at)
                VALUES (
                    COALESCE($1, nextval(pg_get_serial_sequence('cart_items', 'id'))),
                    $2, $3, $4
                )
                RETURNING id
                "#,
            )
            .bind(item.id().map(|id| id.get()))
            .bind(cart_id.get())
            .bind(product_id.get())
            .bind(item.created_at())
            .fetch_one(&mut *tx)
            .await?;

            for recipe_id in item.recipe_ids() {
                sqlx::query(
                    "INSERT INTO cart_item_recipes (cart_item_id, recipe_id) VALUES ($1, $2)",
                )
                .bind(item_id)
                .bind(recipe_id.get())
                .execute(&mut *tx)
                .await?;
            }
        }

        let stored = Self::load_cart(&mut *tx, cart_id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(format!("Cart not found: {cart_id}")))?;

        tx.commit().await?;
        Ok(stored)
    }
}

#[async_trait]
impl ProductRepository for PostgresStore {
    async fn find_by_id(&self, id: ProductId) -> RepositoryResult<Option<Product>> {
        let load = async {
            let mut conn = self.pool.acquire().await?;
            Self::load_product(&mut *conn, id).await
        };
        load.await.map_err(|e| e.into_repository_error("Product"))
    }

    async fn find_all(&self) -> RepositoryResult<Vec<Product>> {
        let load = async {
            let rows = sqlx::query("SELECT id, name, price_in_cents FROM products ORDER BY id")
                .fetch_all(&self.pool)
                .await?;
            rows.iter().map(Self::row_to_product).collect::<Result<Vec<_>>>()
        };
        load.await.map_err(|e| e.into_repository_error("Product"))
    }

    #[tracing::instrument(skip(self, product), fields(product = product.name()))]
    async fn save(&self, product: Product) -> RepositoryResult<Product> {
        self.save_product(product)
            .await
            .map_err(|e| e.into_repository_error("Product"))
    }
}

#[async_trait]
impl RecipeRepository for PostgresStore {
    async fn find_by_id(&self, id: RecipeId) -> RepositoryResult<Option<Recipe>> {
        let load = async {
            let mut conn = self.pool.acquire().await?;
            Self::load_recipe(&mut *conn, id).await
        };
        load.await.map_err(|e| e.into_repository_error("Recipe"))
    }

    async fn find_all(&self) -> RepositoryResult<Vec<Recipe>> {
        let load = async {
            let mut conn = self.pool.acquire().await?;
            Self::load_all_recipes(&mut *conn).await
        };
        load.await.map_err(|e| e.into_repository_error("Recipe"))
    }

    #[tracing::instrument(skip(self, recipe), fields(recipe = recipe.name()))]
    async fn save(&self, recipe: Recipe) -> RepositoryResult<Recipe> {
        self.save_recipe(recipe)
            .await
            .map_err(|e| e.into_repository_error("Recipe"))
    }
}

#[async_trait]
impl CartRepository for PostgresStore {
    async fn find_by_id(&self, id: CartId) -> RepositoryResult<Option<Cart>> {
        let load = async {
            let mut conn = self.pool.acquire().await?;
            Self::load_cart(&mut *conn, id).await
        };
        load.await.map_err(|e| e.into_repository_error("Cart"))
    }

    #[tracing::instrument(
        skip(self, cart),
        fields(cart_id = ?cart.id(), version = %cart.version())
    )]
    async fn save(&self, cart: Cart) -> RepositoryResult<Cart> {
        match self.save_cart(&cart).await {
            Ok(stored) => {
                tracing::debug!(cart_id = ?stored.id(), items = stored.item_count(), "Cart saved");
                Ok(stored)
            }
            Err(err) if err.is_serialization_failure() => {
                let cart_id = cart.id().ok_or_else(|| err.into_repository_error("Cart"))?;
                tracing::warn!(%cart_id, "Cart save lost a concurrent write");
                let actual: Option<i64> =
                    sqlx::query_scalar("SELECT version FROM carts WHERE id = $1")
                        .bind(cart_id.get())
                        .fetch_optional(&self.pool)
                        .await
                        .map_err(|e| StoreError::from(e).into_repository_error("Cart"))?;
                Err(RepositoryError::ConcurrencyConflict {
                    cart_id,
                    expected: cart.version(),
                    actual: actual.map(Version::new).unwrap_or(cart.version()),
                })
            }
            Err(err) => Err(err.into_repository_error("Cart")),
        }
    }
}
