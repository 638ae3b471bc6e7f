//! OAuth login, callback and logout routes.
//!
//! | Route               | Effect |
//! |---------------------|--------|
//! | `GET /auth/login`    | 303 to the provider with a fresh `state` |
//! | `GET /auth/callback` | opens a session, sets the cookie, 303 to `login_redirect` |
//! | `GET /auth/logout`   | drops the session, expires the cookie |

use axum::{
  Router,
  extract::{Query, State},
  http::{HeaderMap, header},
  response::{IntoResponse, Redirect, Response},
  routing::get,
};
use serde::Deserialize;

use crate::{
  AppState,
  error::{Error, Result},
  session::{expired_cookie, session_cookie, session_id},
};

pub fn routes(state: AppState) -> Router<()> {
  Router::new()
    .route("/auth/login", get(login))
    .route("/auth/callback", get(callback))
    .route("/auth/logout", get(logout))
    .with_state(state)
}

// ─── Login ────────────────────────────────────────────────────────────────────

async fn login(State(state): State<AppState>) -> Redirect {
  let csrf = state.sessions.begin_login().await;
  tracing::debug!(provider = ?state.oauth.provider(), "redirecting to oauth provider");
  Redirect::to(&state.oauth.authorize_url(&csrf.to_string()))
}

// ─── Callback ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
  code:  Option<String>,
  state: Option<String>,
  /// Set by the provider when the user declines.
  error: Option<String>,
}

async fn callback(
  State(state): State<AppState>,
  Query(params): Query<CallbackParams>,
) -> Result<Response> {
  let failure = Redirect::to(&state.config.failure_redirect);

  if let Some(error) = params.error {
    tracing::warn!(%error, "oauth provider refused login");
    return Ok(failure.into_response());
  }
  let (Some(code), Some(csrf)) = (params.code, params.state) else {
    tracing::warn!("oauth callback without code or state");
    return Ok(failure.into_response());
  };
  if !state.sessions.finish_login(&csrf).await {
    tracing::warn!("oauth callback with unknown or expired state");
    return Ok(failure.into_response());
  }

  let token = match state.oauth.exchange_code(&code).await {
    Ok(token) => token,
    Err(Error::Provider(reason)) => {
      tracing::warn!(%reason, "oauth code exchange refused");
      return Ok(failure.into_response());
    }
    Err(e) => return Err(e),
  };
  let identity = state.oauth.fetch_identity(&token).await?;

  tracing::info!(
    provider = ?identity.provider,
    subject = %identity.subject,
    "user logged in"
  );
  let id = state.sessions.create(identity).await;
  let cookie = session_cookie(id, state.sessions.ttl(), state.config.secure_cookies());

  Ok(
    (
      [(header::SET_COOKIE, cookie)],
      Redirect::to(&state.config.login_redirect),
    )
      .into_response(),
  )
}

// ─── Logout ───────────────────────────────────────────────────────────────────

async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
  if let Some(id) = session_id(&headers)
    && let Some(session) = state.sessions.remove(id).await
  {
    tracing::info!(subject = %session.identity.subject, "user logged out");
  }

  (
    [(header::SET_COOKIE, expired_cookie(state.config.secure_cookies()))],
    Redirect::to(&state.config.login_redirect),
  )
    .into_response()
}
