//! Error type for `catalog-store-sqlite`.

use catalog_core::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("stored identifier is malformed: {0}")]
  Id(#[from] catalog_core::id::ParseIdError),

  /// A write would have violated a unique index.
  #[error("duplicate key: {0}")]
  DuplicateKey(String),

  /// A stored body is valid JSON but not an object.
  #[error("document {0} is not a JSON object")]
  NotAnObject(String),

  /// Collection and field names may only use `[A-Za-z0-9_]`.
  #[error("invalid name for index: {0:?}")]
  InvalidName(String),
}

impl Error {
  /// Classify a database error, separating unique-index violations.
  pub(crate) fn from_write(e: tokio_rusqlite::Error) -> Self {
    match e {
      tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(f, msg))
        if f.code == rusqlite::ErrorCode::ConstraintViolation =>
      {
        Error::DuplicateKey(msg.unwrap_or_else(|| f.to_string()))
      }
      other => Error::Database(other),
    }
  }
}

impl StoreError for Error {
  fn is_duplicate_key(&self) -> bool { matches!(self, Error::DuplicateKey(_)) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
