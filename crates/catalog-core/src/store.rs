//! The `DocumentStore` trait and the result types it reports.
//!
//! The trait is implemented by storage backends (e.g. `catalog-store-sqlite`).
//! [`ResourceHandler`](crate::handler::ResourceHandler) depends on this
//! abstraction, not on any concrete backend.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::id::ObjectId;

/// A schemaless JSON document. Stores return it with the identifier under
/// [`ID_FIELD`].
pub type Document = serde_json::Map<String, serde_json::Value>;

/// Key under which stores expose a document's identifier.
pub const ID_FIELD: &str = "_id";

// ─── Write outcomes ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertOneResult {
  /// `false` when the store accepted the write but cannot confirm it.
  pub acknowledged: bool,
  pub inserted_id:  ObjectId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResult {
  pub matched_count:  u64,
  /// Zero when every field already held the requested value.
  pub modified_count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
  pub deleted_count: u64,
}

// ─── Errors ──────────────────────────────────────────────────────────────────

/// Bound on a backend's error type.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  /// `true` when the write was rejected by a unique index.
  fn is_duplicate_key(&self) -> bool { false }
}

impl StoreError for std::convert::Infallible {}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a document store holding named collections.
///
/// Every method is a single operation on at most one document; atomicity is
/// whatever the backend gives a single-document write.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait DocumentStore: Send + Sync {
  type Error: StoreError;

  /// Every document in `collection`, in insertion order.
  fn find<'a>(
    &'a self,
    collection: &'a str,
  ) -> impl Future<Output = Result<Vec<Document>, Self::Error>> + Send + 'a;

  /// Retrieve a document by id. Returns `None` if not found.
  fn find_one<'a>(
    &'a self,
    collection: &'a str,
    id: ObjectId,
  ) -> impl Future<Output = Result<Option<Document>, Self::Error>> + Send + 'a;

  /// Persist `doc` under a freshly generated identifier. Any `_id` key in
  /// `doc` is ignored.
  fn insert_one<'a>(
    &'a self,
    collection: &'a str,
    doc: Document,
  ) -> impl Future<Output = Result<InsertOneResult, Self::Error>> + Send + 'a;

  /// Merge `set` into the document `id`, leaving other fields untouched.
  fn update_one<'a>(
    &'a self,
    collection: &'a str,
    id: ObjectId,
    set: Document,
  ) -> impl Future<Output = Result<UpdateResult, Self::Error>> + Send + 'a;

  /// Remove the document `id`, irreversibly.
  fn delete_one<'a>(
    &'a self,
    collection: &'a str,
    id: ObjectId,
  ) -> impl Future<Output = Result<DeleteResult, Self::Error>> + Send + 'a;
}
