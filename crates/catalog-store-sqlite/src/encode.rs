//! Conversion between [`Document`]s and the text stored in SQLite columns.
//!
//! Identifiers are stored as lowercase hex in `doc_id`; bodies are compact
//! JSON objects without the `_id` key, which is re-attached on read.

use catalog_core::{
  ObjectId,
  store::{Document, ID_FIELD},
};
use serde_json::Value;

use crate::{Error, Result};

// ─── ObjectId ────────────────────────────────────────────────────────────────

pub fn encode_id(id: ObjectId) -> String { id.to_string() }

pub fn decode_id(s: &str) -> Result<ObjectId> { Ok(s.parse()?) }

// ─── Body ────────────────────────────────────────────────────────────────────

/// Serialise `doc` for the `body` column, dropping any `_id`.
pub fn encode_body(mut doc: Document) -> Result<String> {
  doc.remove(ID_FIELD);
  Ok(serde_json::to_string(&doc)?)
}

/// Parse a `body` column back into a map, without `_id`.
pub fn decode_body(doc_id: &str, body: &str) -> Result<Document> {
  match serde_json::from_str(body)? {
    Value::Object(map) => Ok(map),
    _ => Err(Error::NotAnObject(doc_id.to_owned())),
  }
}

// ─── Row type ────────────────────────────────────────────────────────────────

/// Raw strings read directly from a `documents` row.
pub struct RawDocument {
  pub doc_id: String,
  pub body:   String,
}

impl RawDocument {
  /// Decode the row and expose its identifier under `_id`.
  pub fn into_document(self) -> Result<Document> {
    let id = decode_id(&self.doc_id)?;
    let mut doc = decode_body(&self.doc_id, &self.body)?;
    doc.insert(ID_FIELD.to_owned(), Value::String(encode_id(id)));
    Ok(doc)
  }
}
