//! Integration tests for the API server.

use std::sync::OnceLock;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use domain::{Entity, InMemoryRepository, Product, ProductRepository, Recipe, RecipeRepository};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::Value;
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

fn setup() -> (axum::Router, InMemoryRepository) {
    let store = InMemoryRepository::new();
    let state = api::create_default_state(store.clone());
    (api::create_app(state, get_metrics_handle()), store)
}

async fn send(app: &axum::Router, method: &str, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or(Value::Null)
    };
    (status, json)
}

async fn product(store: &InMemoryRepository, name: &str, price: i64) -> Product {
    ProductRepository::save(store, Product::new(name, price).unwrap())
        .await
        .unwrap()
}

async fn recipe(store: &InMemoryRepository, name: &str, products: &[&Product]) -> i64 {
    let mut recipe = Recipe::new(name);
    for product in products {
        recipe.add_product((*product).clone());
    }
    RecipeRepository::save(store, recipe)
        .await
        .unwrap()
        .id()
        .unwrap()
        .get()
}

fn assert_error_body(json: &Value, status: StatusCode, path: &str) {
    assert_eq!(json["status"], status.as_u16());
    assert_eq!(json["path"], path);
    assert!(json["timestamp"].is_string());
    assert!(json["message"].is_string());
}

#[tokio::test]
async fn test_health_check() {
    let (app, _) = setup();

    let (status, json) = send(&app, "GET", "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_create_empty_cart() {
    let (app, _) = setup();

    let (status, json) = send(&app, "POST", "/carts").await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(json["id"].as_i64().is_some());
    assert_eq!(json["totalInCents"], 0);
    assert_eq!(json["items"], serde_json::json!([]));
    assert!(json["createdAt"].is_string());
}

#[tokio::test]
async fn test_create_cart_with_recipe() {
    let (app, store) = setup();
    let p1 = product(&store, "Product 1", 100).await;
    let p2 = product(&store, "Product 2", 200).await;
    let recipe_id = recipe(&store, "Recipe", &[&p1, &p2]).await;

    let (status, json) = send(&app, "POST", &format!("/carts/with_recipe/{recipe_id}")).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["totalInCents"], 300);
    let items = json["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert!(
        items
            .iter()
            .all(|item| item["recipeIds"] == serde_json::json!([recipe_id]))
    );
}

#[tokio::test]
async fn test_full_cart_workflow() {
    let (app, store) = setup();
    let p1 = product(&store, "Product 1", 100).await;
    let p2 = product(&store, "Product 2", 200).await;
    let p3 = product(&store, "Product 3", 400).await;
    let recipe1 = recipe(&store, "Recipe 1", &[&p1, &p3]).await;
    let recipe2 = recipe(&store, "Recipe 2", &[&p2, &p3]).await;

    let (_, cart) = send(&app, "POST", "/carts").await;
    let cart_id = cart["id"].as_i64().unwrap();

    let (status, cart) = send(
        &app,
        "POST",
        &format!("/carts/{cart_id}/add_recipe/{recipe1}"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["totalInCents"], 500);
    assert_eq!(cart["items"].as_array().unwrap().len(), 2);

    let (status, cart) = send(
        &app,
        "POST",
        &format!("/carts/{cart_id}/add_recipe/{recipe2}"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["totalInCents"], 700);
    assert_eq!(cart["items"].as_array().unwrap().len(), 3);

    let (status, cart) = send(
        &app,
        "DELETE",
        &format!("/carts/{cart_id}/recipes/{recipe1}"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["totalInCents"], 600);
    let items = cart["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    let names: Vec<&str> = items
        .iter()
        .map(|item| item["product"]["name"].as_str().unwrap())
        .collect();
    assert!(!names.contains(&"Product 1"));
    for item in items {
        assert_eq!(item["recipeIds"], serde_json::json!([recipe2]));
    }

    let (status, fetched) = send(&app, "GET", &format!("/carts/{cart_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, cart);
}

#[tokio::test]
async fn test_get_missing_cart_is_not_found() {
    let (app, _) = setup();

    let (status, json) = send(&app, "GET", "/carts/999").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_error_body(&json, StatusCode::NOT_FOUND, "/carts/999");
    assert_eq!(json["message"], "Cart entity not found for id: 999.");
}

#[tokio::test]
async fn test_add_missing_recipe_is_not_found() {
    let (app, _) = setup();
    let (_, cart) = send(&app, "POST", "/carts").await;
    let cart_id = cart["id"].as_i64().unwrap();

    let (status, json) = send(&app, "POST", &format!("/carts/{cart_id}/add_recipe/42")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], "Recipe not found for id: 42.");
}

#[tokio::test]
async fn test_malformed_ids_are_bad_requests() {
    let (app, _) = setup();

    for uri in ["/carts/abc", "/carts/0", "/carts/-5", "/recipes/x1"] {
        let (status, json) = send(&app, "GET", uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_error_body(&json, StatusCode::BAD_REQUEST, uri);
    }

    let (status, _) = send(&app, "POST", "/carts/1/add_recipe/zero").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_recipes_endpoints() {
    let (app, store) = setup();
    let flour = product(&store, "Flour", 250).await;
    let eggs = product(&store, "Eggs", 450).await;
    let id = recipe(&store, "Pancakes", &[&flour, &eggs]).await;

    let (status, json) = send(&app, "GET", "/recipes").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 1);

    let (status, json) = send(&app, "GET", &format!("/recipes/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["id"], id);
    assert_eq!(json["name"], "Pancakes");
    assert_eq!(json["products"][0]["name"], "Flour");
    assert_eq!(json["products"][1]["priceInCents"], 450);

    let (status, json) = send(&app, "GET", "/recipes/77").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], "Recipe not found for id: 77.");
}

#[tokio::test]
async fn test_empty_recipe_list() {
    let (app, _) = setup();

    let (status, json) = send(&app, "GET", "/recipes").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, serde_json::json!([]));
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let (app, _) = setup();

    let (status, json) = send(&app, "GET", "/nope").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_error_body(&json, StatusCode::NOT_FOUND, "/nope");
    assert_eq!(json["message"], "Resource Not Found");
}

#[tokio::test]
async fn test_wrong_method_is_not_allowed() {
    let (app, _) = setup();

    let (status, json) = send(&app, "DELETE", "/recipes").await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_error_body(&json, StatusCode::METHOD_NOT_ALLOWED, "/recipes");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let (app, _) = setup();
    send(&app, "POST", "/carts").await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("carts_created_total"));
}
