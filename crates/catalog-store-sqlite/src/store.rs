//! [`SqliteStore`], the SQLite implementation of [`DocumentStore`].

use std::path::Path;

use catalog_core::{
  ObjectId,
  store::{DeleteResult, Document, DocumentStore, InsertOneResult, UpdateResult},
};
use rusqlite::OptionalExtension as _;

use crate::{
  Error, Result,
  encode::{RawDocument, decode_body, encode_body, encode_id},
  schema::{SCHEMA, is_valid_name, unique_index_sql},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A document store backed by a single SQLite file.
///
/// Clones share one connection thread.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Reject writes that would give two documents in `collection` the same
  /// value for `field`. Documents lacking the field never collide.
  ///
  /// Fails with [`Error::DuplicateKey`] if existing documents already
  /// collide.
  pub async fn ensure_unique_index(&self, collection: &str, field: &str) -> Result<()> {
    for name in [collection, field] {
      if !is_valid_name(name) {
        return Err(Error::InvalidName(name.to_owned()));
      }
    }
    let sql = unique_index_sql(collection, field);

    self
      .conn
      .call(move |conn| {
        conn.execute_batch(&sql)?;
        Ok(())
      })
      .await
      .map_err(Error::from_write)?;

    tracing::debug!(collection, field, "unique index ensured");
    Ok(())
  }
}

/// Carry a crate error out of a `tokio_rusqlite` closure.
fn boxed(e: Error) -> tokio_rusqlite::Error { tokio_rusqlite::Error::Other(Box::new(e)) }

// ─── DocumentStore impl ──────────────────────────────────────────────────────

impl DocumentStore for SqliteStore {
  type Error = Error;

  async fn find(&self, collection: &str) -> Result<Vec<Document>> {
    let collection = collection.to_owned();

    let raws: Vec<RawDocument> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT doc_id, body FROM documents WHERE collection = ?1 ORDER BY seq",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![collection], |row| {
            Ok(RawDocument {
              doc_id: row.get(0)?,
              body:   row.get(1)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawDocument::into_document).collect()
  }

  async fn find_one(&self, collection: &str, id: ObjectId) -> Result<Option<Document>> {
    let collection = collection.to_owned();
    let id_str = encode_id(id);

    let raw: Option<RawDocument> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT doc_id, body FROM documents WHERE collection = ?1 AND doc_id = ?2",
            rusqlite::params![collection, id_str],
            |row| {
              Ok(RawDocument {
                doc_id: row.get(0)?,
                body:   row.get(1)?,
              })
            },
          )
          .optional()?)
      })
      .await?;

    raw.map(RawDocument::into_document).transpose()
  }

  async fn insert_one(&self, collection: &str, doc: Document) -> Result<InsertOneResult> {
    let collection = collection.to_owned();
    let id = ObjectId::new();
    let id_str = encode_id(id);
    let body = encode_body(doc)?;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO documents (collection, doc_id, body) VALUES (?1, ?2, ?3)",
          rusqlite::params![collection, id_str, body],
        )?;
        Ok(())
      })
      .await
      .map_err(Error::from_write)?;

    // SQLite commits synchronously; a returned INSERT is durable.
    Ok(InsertOneResult {
      acknowledged: true,
      inserted_id:  id,
    })
  }

  async fn update_one(
    &self,
    collection: &str,
    id: ObjectId,
    set: Document,
  ) -> Result<UpdateResult> {
    let collection = collection.to_owned();
    let id_str = encode_id(id);

    let result = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let body: Option<String> = tx
          .query_row(
            "SELECT body FROM documents WHERE collection = ?1 AND doc_id = ?2",
            rusqlite::params![collection, id_str],
            |row| row.get(0),
          )
          .optional()?;

        let Some(body) = body else {
          return Ok(UpdateResult {
            matched_count:  0,
            modified_count: 0,
          });
        };

        let mut doc = decode_body(&id_str, &body).map_err(boxed)?;
        let before = doc.clone();
        doc.extend(set);

        if doc == before {
          return Ok(UpdateResult {
            matched_count:  1,
            modified_count: 0,
          });
        }

        let new_body = encode_body(doc).map_err(boxed)?;
        tx.execute(
          "UPDATE documents SET body = ?1 WHERE collection = ?2 AND doc_id = ?3",
          rusqlite::params![new_body, collection, id_str],
        )?;
        tx.commit()?;

        Ok(UpdateResult {
          matched_count:  1,
          modified_count: 1,
        })
      })
      .await
      .map_err(Error::from_write)?;

    Ok(result)
  }

  async fn delete_one(&self, collection: &str, id: ObjectId) -> Result<DeleteResult> {
    let collection = collection.to_owned();
    let id_str = encode_id(id);

    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM documents WHERE collection = ?1 AND doc_id = ?2",
          rusqlite::params![collection, id_str],
        )?)
      })
      .await?;

    Ok(DeleteResult {
      deleted_count: deleted as u64,
    })
  }
}
