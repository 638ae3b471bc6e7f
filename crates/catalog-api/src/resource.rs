//! Handlers shared by every resource collection.
//!
//! | Method   | Path | Auth | Notes |
//! |----------|------|------|-------|
//! | `GET`    | `/<resource>` | no | JSON array in store order |
//! | `GET`    | `/<resource>/:id` | no | 400 on malformed id, 404 if absent |
//! | `POST`   | `/<resource>` | yes | returns 201 + `{"id": "..."}` |
//! | `PUT`    | `/<resource>/:id` | yes | partial merge; returns `{"matchedCount", "modifiedCount"}` |
//! | `DELETE` | `/<resource>/:id` | yes | returns 204 |

use axum::{
  Json, Router,
  extract::{FromRequest, Path, Request, State},
  http::StatusCode,
  response::IntoResponse,
  routing::get,
};
use catalog_core::{
  ObjectId, ResourceHandler,
  store::{Document, DocumentStore, UpdateResult},
};
use serde::Serialize;

use crate::{
  auth::{AuthGate, Authenticated},
  error::ApiError,
};

/// State for one resource's routes.
pub struct ResourceState<S, G> {
  pub handler: ResourceHandler<S>,
  pub gate:    G,
}

impl<S, G: Clone> Clone for ResourceState<S, G> {
  fn clone(&self) -> Self {
    Self {
      handler: self.handler.clone(),
      gate:    self.gate.clone(),
    }
  }
}

/// Mount the five operations of `handler` under `prefix` (e.g. `/users`).
pub fn routes<S, G>(prefix: &str, handler: ResourceHandler<S>, gate: G) -> Router<()>
where
  S: DocumentStore + 'static,
  G: AuthGate,
{
  Router::new()
    .route(prefix, get(list::<S, G>).post(create::<S, G>))
    .route(
      &format!("{prefix}/{{id}}"),
      get(get_one::<S, G>)
        .put(update::<S, G>)
        .delete(delete::<S, G>),
    )
    .with_state(ResourceState { handler, gate })
}

// ─── Body ─────────────────────────────────────────────────────────────────────

/// A JSON object request body; any rejection is a validation failure.
pub struct JsonBody(pub Document);

impl<St> FromRequest<St> for JsonBody
where
  St: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request(req: Request, state: &St) -> Result<Self, Self::Rejection> {
    let Json(body) = Json::<Document>::from_request(req, state).await?;
    Ok(JsonBody(body))
  }
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /<resource>`
pub async fn list<S, G>(
  State(state): State<ResourceState<S, G>>,
) -> Result<Json<Vec<Document>>, ApiError>
where
  S: DocumentStore,
{
  Ok(Json(state.handler.list().await?))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /<resource>/:id`
pub async fn get_one<S, G>(
  State(state): State<ResourceState<S, G>>,
  Path(id): Path<String>,
) -> Result<Json<Document>, ApiError>
where
  S: DocumentStore,
{
  Ok(Json(state.handler.get(&id).await?))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct Created {
  pub id: ObjectId,
}

/// `POST /<resource>`: returns 201 and the generated id.
pub async fn create<S, G>(
  _auth: Authenticated,
  State(state): State<ResourceState<S, G>>,
  JsonBody(body): JsonBody,
) -> Result<impl IntoResponse, ApiError>
where
  S: DocumentStore,
{
  let id = state.handler.create(&body).await?;
  Ok((StatusCode::CREATED, Json(Created { id })))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PUT /<resource>/:id`: the body holds the fields to change.
pub async fn update<S, G>(
  _auth: Authenticated,
  State(state): State<ResourceState<S, G>>,
  Path(id): Path<String>,
  JsonBody(body): JsonBody,
) -> Result<Json<UpdateResult>, ApiError>
where
  S: DocumentStore,
{
  Ok(Json(state.handler.update(&id, &body).await?))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /<resource>/:id`
pub async fn delete<S, G>(
  _auth: Authenticated,
  State(state): State<ResourceState<S, G>>,
  Path(id): Path<String>,
) -> Result<StatusCode, ApiError>
where
  S: DocumentStore,
{
  state.handler.delete(&id).await?;
  Ok(StatusCode::NO_CONTENT)
}
