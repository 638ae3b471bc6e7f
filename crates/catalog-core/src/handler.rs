//! [`ResourceHandler`]: one resource's List/Get/Create/Update/Delete.
//!
//! Each operation performs at most one store call. Identifier and payload
//! checks run first and short-circuit without touching the store.

use std::sync::Arc;

use chrono::Utc;

use crate::{
  Error, Result,
  id::ObjectId,
  schema::ResourceSchema,
  store::{Document, DocumentStore, StoreError, UpdateResult},
};

/// Operations for one resource, backed by an injected store.
///
/// Cloning is cheap; the store is reference-counted.
pub struct ResourceHandler<S> {
  store:  Arc<S>,
  schema: &'static ResourceSchema,
}

impl<S> Clone for ResourceHandler<S> {
  fn clone(&self) -> Self {
    Self {
      store:  Arc::clone(&self.store),
      schema: self.schema,
    }
  }
}

impl<S: DocumentStore> ResourceHandler<S> {
  pub fn new(store: Arc<S>, schema: &'static ResourceSchema) -> Self { Self { store, schema } }

  pub fn schema(&self) -> &'static ResourceSchema { self.schema }

  /// Every document, in store order.
  pub async fn list(&self) -> Result<Vec<Document>> {
    self
      .store
      .find(self.schema.collection)
      .await
      .map_err(|e| self.fault("list", None, e))
  }

  pub async fn get(&self, raw_id: &str) -> Result<Document> {
    let id = parse_id(raw_id)?;
    self
      .store
      .find_one(self.schema.collection, id)
      .await
      .map_err(|e| self.fault("get", Some(id), e))?
      .ok_or_else(|| self.not_found(id))
  }

  /// Validate `body`, apply defaults, insert. Returns the new identifier.
  pub async fn create(&self, body: &Document) -> Result<ObjectId> {
    let doc = self.schema.prepare_insert(body, Utc::now())?;
    let result = self
      .store
      .insert_one(self.schema.collection, doc)
      .await
      .map_err(|e| self.fault("create", None, e))?;

    if !result.acknowledged {
      tracing::error!(
        collection = self.schema.collection,
        id = %result.inserted_id,
        "insert was not acknowledged"
      );
      return Err(Error::Unacknowledged(self.schema.label));
    }
    Ok(result.inserted_id)
  }

  /// Merge the allow-listed fields of `body` into document `raw_id`.
  pub async fn update(&self, raw_id: &str, body: &Document) -> Result<UpdateResult> {
    let id = parse_id(raw_id)?;
    let set = self.schema.prepare_update(body)?;
    let result = self
      .store
      .update_one(self.schema.collection, id, set)
      .await
      .map_err(|e| self.fault("update", Some(id), e))?;

    if result.matched_count == 0 {
      return Err(self.not_found(id));
    }
    Ok(result)
  }

  pub async fn delete(&self, raw_id: &str) -> Result<()> {
    let id = parse_id(raw_id)?;
    let result = self
      .store
      .delete_one(self.schema.collection, id)
      .await
      .map_err(|e| self.fault("delete", Some(id), e))?;

    if result.deleted_count == 0 {
      return Err(self.not_found(id));
    }
    Ok(())
  }

  fn not_found(&self, id: ObjectId) -> Error {
    Error::NotFound {
      resource: self.schema.label,
      id,
    }
  }

  /// Log a store error and classify it.
  fn fault(&self, op: &'static str, id: Option<ObjectId>, e: S::Error) -> Error {
    let id = id.map(|id| id.to_string());
    if e.is_duplicate_key() {
      tracing::warn!(collection = self.schema.collection, op, id, error = %e, "duplicate key");
      Error::Conflict(e.to_string())
    } else {
      tracing::error!(collection = self.schema.collection, op, id, error = %e, "storage fault");
      Error::Storage(Box::new(e))
    }
  }
}

fn parse_id(raw: &str) -> Result<ObjectId> {
  raw
    .parse()
    .map_err(|_| Error::InvalidIdentifier(raw.to_owned()))
}
