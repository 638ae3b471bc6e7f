//! Error types and axum `IntoResponse` implementation for the login flow.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The provider could not be reached or answered with garbage.
  #[error("oauth transport error: {0}")]
  Http(#[from] reqwest::Error),

  /// The provider answered but refused the request.
  #[error("oauth provider refused: {0}")]
  Provider(String),

  #[error("invalid configuration: {0}")]
  Config(String),
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let status = match &self {
      Error::Http(_) | Error::Provider(_) => StatusCode::BAD_GATEWAY,
      Error::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    tracing::error!(error = %self, "login failed");
    (status, Json(json!({ "error": self.to_string() }))).into_response()
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
