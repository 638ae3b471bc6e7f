//! JSON REST API for Catalog.
//!
//! Exposes an axum [`Router`] backed by any [`catalog_core::DocumentStore`].
//! Sessions, TLS and transport concerns are the caller's responsibility; the
//! caller supplies an [`AuthGate`] that decides whether write routes are
//! reachable.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .merge(catalog_api::api_router(store.clone(), sessions.clone()))
//! ```

pub mod auth;
pub mod error;
pub mod resource;

use std::sync::Arc;

use axum::Router;
use catalog_core::{DocumentStore, PRODUCTS, ResourceHandler, USERS};

pub use auth::{AuthGate, Authenticated};
pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be merged into any parent router regardless
/// of its own state type.
pub fn api_router<S, G>(store: Arc<S>, gate: G) -> Router<()>
where
  S: DocumentStore + 'static,
  G: AuthGate,
{
  Router::new()
    .merge(resource::routes(
      "/users",
      ResourceHandler::new(store.clone(), &USERS),
      gate.clone(),
    ))
    .merge(resource::routes(
      "/products",
      ResourceHandler::new(store, &PRODUCTS),
      gate,
    ))
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use axum::{
    body::Body,
    http::{HeaderMap, Request, StatusCode, header},
  };
  use catalog_core::is_valid_identifier;
  use catalog_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  use super::*;

  /// Gate with a fixed answer.
  #[derive(Clone)]
  struct StaticGate(bool);

  impl AuthGate for StaticGate {
    async fn is_authenticated(&self, _: &HeaderMap) -> bool { self.0 }
  }

  async fn app(authenticated: bool) -> Router {
    let store = SqliteStore::open_in_memory().await.unwrap();
    store.ensure_unique_index("users", "email").await.unwrap();
    api_router(Arc::new(store), StaticGate(authenticated))
  }

  async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
      Some(json) => builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json.to_string()))
        .unwrap(),
      None => builder.body(Body::empty()).unwrap(),
    };
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
  }

  async fn send_raw(
    app:          &Router,
    method:       &str,
    uri:          &str,
    content_type: Option<&str>,
    body:         &str,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(content_type) = content_type {
      builder = builder.header(header::CONTENT_TYPE, content_type);
    }
    let resp = app
      .clone()
      .oneshot(builder.body(Body::from(body.to_owned())).unwrap())
      .await
      .unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
  }

  fn pen() -> Value {
    json!({ "name": "Pen", "description": "Blue pen", "price": 1.5, "category": "office" })
  }

  fn ada() -> Value {
    json!({ "firstName": "Ada", "lastName": "Lovelace", "email": "ada@example.com" })
  }

  const MISSING: &str = "507f1f77bcf86cd799439011";

  // ── Products ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn create_product_then_get_applies_defaults() {
    let app = app(true).await;
    let (status, body) = send(&app, "POST", "/products", Some(pen())).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["id"].as_str().unwrap().to_owned();
    assert!(is_valid_identifier(&id));

    let (status, product) = send(&app, "GET", &format!("/products/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(product["_id"], json!(id));
    assert_eq!(product["name"], json!("Pen"));
    assert_eq!(product["stock"], json!(0));
    assert_eq!(product["manufacturer"], json!(""));
    assert!(product["releaseDate"].is_string());
  }

  #[tokio::test]
  async fn negative_price_is_400_and_creates_nothing() {
    let app = app(true).await;
    let mut body = pen();
    body["price"] = json!(-5);
    let (status, err) = send(&app, "POST", "/products", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["kind"], json!("validation_failure"));

    let (_, list) = send(&app, "GET", "/products", None).await;
    assert_eq!(list, json!([]));
  }

  #[tokio::test]
  async fn get_well_formed_missing_product_is_404() {
    let app = app(false).await;
    let (status, err) = send(&app, "GET", &format!("/products/{MISSING}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err["kind"], json!("not_found"));
  }

  #[tokio::test]
  async fn get_malformed_id_is_400() {
    let app = app(false).await;
    let (status, err) = send(&app, "GET", "/products/xyz", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["kind"], json!("invalid_identifier"));
  }

  #[tokio::test]
  async fn update_product_reports_counts() {
    let app = app(true).await;
    let (_, created) = send(&app, "POST", "/products", Some(pen())).await;
    let id = created["id"].as_str().unwrap();

    let (status, body) =
      send(&app, "PUT", &format!("/products/{id}"), Some(json!({ "stock": 10 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "matchedCount": 1, "modifiedCount": 1 }));

    let (status, body) =
      send(&app, "PUT", &format!("/products/{id}"), Some(json!({ "stock": 10 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "matchedCount": 1, "modifiedCount": 0 }));

    let (status, _) =
      send(&app, "PUT", &format!("/products/{id}"), Some(json!({ "price": -1 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  // ── Users ───────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn list_users_in_insertion_order() {
    let app = app(true).await;
    let (_, a) = send(&app, "POST", "/users", Some(ada())).await;
    let mut grace = ada();
    grace["email"] = json!("grace@example.com");
    let (_, b) = send(&app, "POST", "/users", Some(grace)).await;

    let (status, list) = send(&app, "GET", "/users", None).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<_> = list.as_array().unwrap().iter().map(|u| u["_id"].clone()).collect();
    assert_eq!(ids, vec![a["id"].clone(), b["id"].clone()]);
  }

  #[tokio::test]
  async fn update_user_with_empty_body_is_400() {
    let app = app(true).await;
    let (_, created) = send(&app, "POST", "/users", Some(ada())).await;
    let id = created["id"].as_str().unwrap();

    let (status, err) = send(&app, "PUT", &format!("/users/{id}"), Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["kind"], json!("validation_failure"));
  }

  #[tokio::test]
  async fn update_missing_user_is_404() {
    let app = app(true).await;
    let (status, _) =
      send(&app, "PUT", &format!("/users/{MISSING}"), Some(json!({ "firstName": "X" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn delete_user_twice_is_204_then_404() {
    let app = app(true).await;
    let (_, created) = send(&app, "POST", "/users", Some(ada())).await;
    let id = created["id"].as_str().unwrap();

    let (status, body) = send(&app, "DELETE", &format!("/users/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, _) = send(&app, "DELETE", &format!("/users/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn delete_malformed_user_id_is_400() {
    let app = app(true).await;
    let (status, err) = send(&app, "DELETE", "/users/xyz", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["kind"], json!("invalid_identifier"));
  }

  #[tokio::test]
  async fn duplicate_email_is_409() {
    let app = app(true).await;
    let (status, _) = send(&app, "POST", "/users", Some(ada())).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, err) = send(&app, "POST", "/users", Some(ada())).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(err["kind"], json!("conflict"));
  }

  #[tokio::test]
  async fn missing_required_user_fields_are_named() {
    let app = app(true).await;
    let (status, err) =
      send(&app, "POST", "/users", Some(json!({ "firstName": "Ada" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = err["error"].as_str().unwrap();
    assert!(message.contains("lastName") && message.contains("email"), "{message}");
  }

  #[tokio::test]
  async fn duplicate_email_on_update_is_409() {
    let app = app(true).await;
    send(&app, "POST", "/users", Some(ada())).await;
    let mut grace = ada();
    grace["email"] = json!("grace@example.com");
    let (_, created) = send(&app, "POST", "/users", Some(grace)).await;
    let id = created["id"].as_str().unwrap();

    let (status, err) = send(
      &app,
      "PUT",
      &format!("/users/{id}"),
      Some(json!({ "email": "ada@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(err["kind"], json!("conflict"));
  }

  // ── Request bodies ──────────────────────────────────────────────────────────

  #[tokio::test]
  async fn non_object_body_is_validation_failure() {
    let app = app(true).await;
    let (status, err) =
      send_raw(&app, "POST", "/products", Some("application/json"), "[1,2]").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["kind"], json!("validation_failure"));
    assert!(err["error"].is_string());

    let (_, list) = send(&app, "GET", "/products", None).await;
    assert_eq!(list, json!([]));
  }

  #[tokio::test]
  async fn missing_content_type_is_validation_failure() {
    let app = app(true).await;
    let (status, err) = send_raw(&app, "PUT", &format!("/users/{MISSING}"), None, "").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["kind"], json!("validation_failure"));
  }

  #[tokio::test]
  async fn malformed_json_is_validation_failure() {
    let app = app(true).await;
    let (status, err) =
      send_raw(&app, "POST", "/users", Some("application/json"), "{bad").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["kind"], json!("validation_failure"));
  }

  // ── Auth gate ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn writes_require_authentication() {
    let app = app(false).await;

    let (status, err) = send(&app, "POST", "/users", Some(ada())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(err["kind"], json!("unauthorized"));

    let (status, _) =
      send(&app, "PUT", &format!("/products/{MISSING}"), Some(json!({ "name": "x" }))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "DELETE", &format!("/users/{MISSING}"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn reads_are_public() {
    let app = app(false).await;
    let (status, list) = send(&app, "GET", "/users", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list, json!([]));
  }
}
