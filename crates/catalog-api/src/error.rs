//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! This is the one place where operation outcomes become status codes:
//!
//! | Kind | Status |
//! |------|--------|
//! | `invalid_identifier` | 400 |
//! | `validation_failure` | 400 |
//! | `unauthorized` | 401 |
//! | `not_found` | 404 |
//! | `conflict` | 409 |
//! | `storage_fault` | 500 |

use axum::{
  Json,
  extract::rejection::JsonRejection,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use catalog_core::ErrorKind;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  /// The write routes require an authenticated session.
  #[error("authentication required")]
  Unauthorized,

  #[error(transparent)]
  Core(#[from] catalog_core::Error),
}

impl ApiError {
  pub fn status(&self) -> StatusCode {
    match self {
      ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
      ApiError::Core(e) => status_for(e.kind()),
    }
  }

  pub fn kind(&self) -> &'static str {
    match self {
      ApiError::Unauthorized => "unauthorized",
      ApiError::Core(e) => e.kind().as_str(),
    }
  }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self {
    ApiError::Core(catalog_core::Error::Validation(rejection.body_text()))
  }
}

pub fn status_for(kind: ErrorKind) -> StatusCode {
  match kind {
    ErrorKind::InvalidIdentifier | ErrorKind::ValidationFailure => StatusCode::BAD_REQUEST,
    ErrorKind::NotFound => StatusCode::NOT_FOUND,
    ErrorKind::Conflict => StatusCode::CONFLICT,
    ErrorKind::StorageFault => StatusCode::INTERNAL_SERVER_ERROR,
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    // Backend details are logged by the handler, not sent to clients.
    let message = match &self {
      ApiError::Core(e) if e.kind() == ErrorKind::StorageFault => {
        "internal server error".to_owned()
      }
      other => other.to_string(),
    };
    (status, Json(json!({ "error": message, "kind": self.kind() }))).into_response()
  }
}
