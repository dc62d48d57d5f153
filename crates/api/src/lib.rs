//! HTTP API server for recipe carts.
//!
//! Provides REST endpoints for carts and recipes over any storage backend
//! implementing the domain repositories, with structured logging (tracing)
//! and Prometheus metrics.

pub mod config;
pub mod dto;
pub mod error;
pub mod routes;
pub mod seed;

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, post};
use domain::{CartRepository, CartService, ProductRepository, RecipeRepository, RecipeService};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Storage backend usable by the API: one value serving all repositories.
pub trait Store:
    CartRepository + ProductRepository + RecipeRepository + Clone + Send + Sync + 'static
{
}

impl<T> Store for T where
    T: CartRepository + ProductRepository + RecipeRepository + Clone + Send + Sync + 'static
{
}

/// Shared application state accessible from all handlers.
pub struct AppState<S: Store> {
    pub cart_service: CartService<S, S>,
    pub recipe_service: RecipeService<S>,
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: Store>(state: Arc<AppState<S>>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/carts", post(routes::carts::create::<S>))
        .route("/carts/{cart_id}", get(routes::carts::get::<S>))
        .route(
            "/carts/with_recipe/{recipe_id}",
            post(routes::carts::create_with_recipe::<S>),
        )
        .route(
            "/carts/{cart_id}/add_recipe/{recipe_id}",
            post(routes::carts::add_recipe::<S>),
        )
        .route(
            "/carts/{cart_id}/recipes/{recipe_id}",
            delete(routes::carts::remove_recipe::<S>),
        )
        .route("/recipes", get(routes::recipes::list::<S>))
        .route("/recipes/{id}", get(routes::recipes::get::<S>))
        .with_state(state)
        .merge(metrics_router)
        .fallback(routes::not_found)
        .method_not_allowed_fallback(routes::method_not_allowed)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the application state with services sharing one store.
pub fn create_default_state<S: Store>(store: S) -> Arc<AppState<S>> {
    let cart_service = CartService::new(store.clone(), RecipeService::new(store.clone()));
    let recipe_service = RecipeService::new(store);

    Arc::new(AppState {
        cart_service,
        recipe_service,
    })
}
