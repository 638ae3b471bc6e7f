//! The authentication seam for write routes.
//!
//! The API never inspects credentials itself. It asks an [`AuthGate`]
//! whether a request is authenticated and rejects with 401 if not.

use std::future::Future;

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, request::Parts},
};

use crate::{error::ApiError, resource::ResourceState};

/// Answers "is this request authenticated?" from its headers.
pub trait AuthGate: Clone + Send + Sync + 'static {
  fn is_authenticated(&self, headers: &HeaderMap) -> impl Future<Output = bool> + Send;
}

/// Zero-size marker: present in the handler means the request was authenticated.
pub struct Authenticated;

impl<S, G> FromRequestParts<ResourceState<S, G>> for Authenticated
where
  S: Send + Sync,
  G: AuthGate,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &ResourceState<S, G>,
  ) -> Result<Self, Self::Rejection> {
    if state.gate.is_authenticated(&parts.headers).await {
      Ok(Authenticated)
    } else {
      Err(ApiError::Unauthorized)
    }
  }
}
