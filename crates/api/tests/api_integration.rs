//! API integration tests.
//!
//! These tests drive the full router against a mock database.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use chrono::Utc;
use foodgram_api::{
    AppState, middleware::auth_middleware, router as api_router, short_link_router,
};
use foodgram_common::config::{Config, DatabaseConfig, RecipeLimits, ServerConfig};
use foodgram_db::entities::{amount_ingredient, ingredient, recipe, tag, user};
use maplit::btreemap;
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, Value};
use serde_json::Value as Json;
use tower::ServiceExt;

const TOKEN: &str = "0123456789abcdef0123456789abcdef";

/// Create a test configuration.
fn create_test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8000,
            url: "https://foodgram.example".to_string(),
        },
        database: DatabaseConfig {
            url: "postgres://localhost/test".to_string(),
            max_connections: 10,
            min_connections: 1,
        },
        recipes: RecipeLimits::default(),
    }
}

fn create_test_user() -> user::Model {
    user::Model {
        id: "user1".to_string(),
        username: "alice".to_string(),
        email: "alice@example.com".to_string(),
        first_name: "Alice".to_string(),
        last_name: "Cook".to_string(),
        token: Some(TOKEN.to_string()),
        avatar_url: None,
        is_admin: false,
        created_at: Utc::now().into(),
    }
}

/// Build the application router the way the server does.
fn create_test_router(db: DatabaseConnection) -> Router {
    let state = AppState::new(Arc::new(db), &create_test_config());

    Router::new()
        .nest("/api", api_router())
        .merge(short_link_router())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .with_state(state)
}

async fn body_json(response: axum::response::Response) -> Json {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn create_test_recipe() -> recipe::Model {
    recipe::Model {
        id: "recipe1".to_string(),
        author_id: "user1".to_string(),
        name: "Pancakes".to_string(),
        image: "recipes/images/pancakes.png".to_string(),
        text: "Mix and fry.".to_string(),
        cooking_time: 20,
        short_code: "aB3dE9".to_string(),
        created_at: Utc::now().into(),
    }
}

fn authed_json(method: &str, uri: &str, body: &Json) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Token {TOKEN}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn authed_get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Token {TOKEN}"))
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_download_requires_auth() {
    let app = create_test_router(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/recipes/download_shopping_cart")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_download_empty_cart() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        // token lookup
        .append_query_results([[create_test_user()]])
        // cart recipe ids
        .append_query_results([Vec::<BTreeMap<&str, Value>>::new()])
        .into_connection();
    let app = create_test_router(db);

    let response = app
        .oneshot(authed_get("/api/recipes/download_shopping_cart"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "EMPTY_CART");
}

#[tokio::test]
async fn test_download_shopping_list() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[create_test_user()]])
        .append_query_results([vec![
            btreemap! { "recipe_id" => Value::from("recipeA") },
            btreemap! { "recipe_id" => Value::from("recipeB") },
        ]])
        .append_query_results([vec![
            btreemap! {
                "name" => Value::from("flour"),
                "measurement_unit" => Value::from("g"),
                "total_amount" => Value::from(500_i64),
            },
            btreemap! {
                "name" => Value::from("sugar"),
                "measurement_unit" => Value::from("g"),
                "total_amount" => Value::from(50_i64),
            },
        ]])
        .into_connection();
    let app = create_test_router(db);

    let response = app
        .oneshot(authed_get("/api/recipes/download_shopping_cart"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/plain; charset=utf-8"
    );
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"shopping_list.txt\""
    );

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"flour - 500 g\nsugar - 50 g");
}

#[tokio::test]
async fn test_create_recipe_requires_auth() {
    let app = create_test_router(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/recipes")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_list_tags() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[tag::Model {
            id: "tag1".to_string(),
            name: "Breakfast".to_string(),
            slug: "breakfast".to_string(),
        }]])
        .into_connection();
    let app = create_test_router(db);

    let response = app
        .oneshot(Request::builder().uri("/api/tags").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"][0]["slug"], "breakfast");
}

#[tokio::test]
async fn test_current_user_hides_token() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[create_test_user()]])
        .into_connection();
    let app = create_test_router(db);

    let response = app.oneshot(authed_get("/api/users/me")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["username"], "alice");
    assert!(body["data"].get("token").is_none());
}

#[tokio::test]
async fn test_short_link_redirects() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[create_test_recipe()]])
        .into_connection();
    let app = create_test_router(db);

    let response = app
        .oneshot(Request::builder().uri("/s/aB3dE9").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.headers()[header::LOCATION], "/recipes/recipe1");
}

#[tokio::test]
async fn test_create_recipe_with_oversized_image() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[create_test_user()]])
        .into_connection();
    let app = create_test_router(db);

    let body = serde_json::json!({
        "name": "Pancakes",
        "image": "x".repeat(2000),
        "text": "Mix and fry.",
        "cooking_time": 20,
        "tags": ["breakfast"],
        "ingredients": [{ "id": "flour", "amount": 200 }],
    });
    let response = app
        .oneshot(authed_json("POST", "/api/recipes", &body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_recipe_ingredients() {
    let row = amount_ingredient::Model {
        recipe_id: "recipe1".to_string(),
        ingredient_id: "flour".to_string(),
        amount: 200,
    };
    let flour = ingredient::Model {
        id: "flour".to_string(),
        name: "flour".to_string(),
        measurement_unit: "g".to_string(),
    };

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[create_test_recipe()]])
        .append_query_results([[(row, flour)]])
        .into_connection();
    let app = create_test_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/recipes/recipe1/ingredients")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"][0]["name"], "flour");
    assert_eq!(body["data"][0]["amount"], 200);
}

#[tokio::test]
async fn test_replace_ingredients_with_empty_list() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        // token lookup, then the author check
        .append_query_results([[create_test_user()]])
        .append_query_results([[create_test_recipe()]])
        .into_connection();
    let app = create_test_router(db);

    let response = app
        .oneshot(authed_json(
            "PUT",
            "/api/recipes/recipe1/ingredients",
            &serde_json::json!([]),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_unknown_endpoint_returns_404() {
    let app = create_test_router(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/nonexistent")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
