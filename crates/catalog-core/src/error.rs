//! Error types for `catalog-core`.
//!
//! Every resource operation resolves to one of these. The HTTP layer maps
//! [`ErrorKind`] onto status codes; nothing here knows about HTTP.

use serde::Serialize;
use thiserror::Error;

use crate::id::ObjectId;

#[derive(Debug, Error)]
pub enum Error {
  /// The path identifier is not a well-formed [`ObjectId`].
  #[error("invalid identifier: {0:?}")]
  InvalidIdentifier(String),

  /// A required field is missing, a field rule failed, or an update carried
  /// no recognised fields.
  #[error("{0}")]
  Validation(String),

  #[error("{resource} {id} not found")]
  NotFound {
    resource: &'static str,
    id:       ObjectId,
  },

  /// The store rejected a write because it would violate a unique index.
  #[error("duplicate key: {0}")]
  Conflict(String),

  /// The store accepted an insert but could not confirm it.
  #[error("{0} insert was not acknowledged")]
  Unacknowledged(&'static str),

  #[error("store error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Coarse classification of [`Error`], stable across messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
  InvalidIdentifier,
  ValidationFailure,
  NotFound,
  /// Duplicate-key storage fault.
  Conflict,
  StorageFault,
}

impl ErrorKind {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::InvalidIdentifier => "invalid_identifier",
      Self::ValidationFailure => "validation_failure",
      Self::NotFound => "not_found",
      Self::Conflict => "conflict",
      Self::StorageFault => "storage_fault",
    }
  }

  /// `true` for outcomes caused by the request rather than the server.
  pub fn is_client_error(self) -> bool {
    matches!(
      self,
      Self::InvalidIdentifier | Self::ValidationFailure | Self::NotFound
    )
  }
}

impl Error {
  pub fn kind(&self) -> ErrorKind {
    match self {
      Error::InvalidIdentifier(_) => ErrorKind::InvalidIdentifier,
      Error::Validation(_) => ErrorKind::ValidationFailure,
      Error::NotFound { .. } => ErrorKind::NotFound,
      Error::Conflict(_) => ErrorKind::Conflict,
      Error::Unacknowledged(_) | Error::Storage(_) => ErrorKind::StorageFault,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
