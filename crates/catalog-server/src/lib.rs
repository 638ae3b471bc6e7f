//! HTTP server for Catalog.
//!
//! Mounts the JSON API from `catalog-api` next to the OAuth login routes and
//! gates API writes on a session cookie.

pub mod auth;
pub mod error;
pub mod oauth;
pub mod session;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  http::{Method, StatusCode, Uri},
};
use catalog_core::DocumentStore;
use chrono::Duration;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use oauth::{OAuthClient, OAuthConfig};
use session::SessionStore;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `CATALOG_*` environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:             String,
  #[serde(default = "default_port")]
  pub port:             u16,
  #[serde(default = "default_store_path")]
  pub store_path:       PathBuf,
  /// Externally visible base URL, used for the OAuth redirect URI.
  #[serde(default = "default_public_url")]
  pub public_url:       String,
  #[serde(default = "default_redirect")]
  pub login_redirect:   String,
  #[serde(default = "default_redirect")]
  pub failure_redirect: String,
  #[serde(default = "default_session_ttl")]
  pub session_ttl_secs: u32,
  pub oauth:            OAuthConfig,
}

impl ServerConfig {
  /// Cookies get the `Secure` attribute when served over HTTPS.
  pub fn secure_cookies(&self) -> bool { self.public_url.starts_with("https://") }
}

fn default_host() -> String { "127.0.0.1".to_owned() }
fn default_port() -> u16 { 3000 }
fn default_store_path() -> PathBuf { PathBuf::from("catalog.db") }
fn default_public_url() -> String { "http://localhost:3000".to_owned() }
fn default_redirect() -> String { "/".to_owned() }
fn default_session_ttl() -> u32 { 24 * 60 * 60 }

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through the auth handlers.
#[derive(Clone)]
pub struct AppState {
  pub sessions: SessionStore,
  pub oauth:    OAuthClient,
  pub config:   Arc<ServerConfig>,
}

impl AppState {
  pub fn new(config: ServerConfig) -> Result<Self, Error> {
    let oauth = OAuthClient::new(config.oauth.clone(), &config.public_url)?;
    let sessions = SessionStore::new(Duration::seconds(i64::from(config.session_ttl_secs)));
    Ok(Self {
      sessions,
      oauth,
      config: Arc::new(config),
    })
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the complete application router over `store`.
pub fn router<S>(store: Arc<S>, state: AppState) -> Router
where
  S: DocumentStore + 'static,
{
  Router::new()
    .merge(catalog_api::api_router(store, state.sessions.clone()))
    .merge(auth::routes(state))
    .fallback(not_found)
    .method_not_allowed_fallback(not_found)
    .layer(TraceLayer::new_for_http())
}

async fn not_found(method: Method, uri: Uri) -> (StatusCode, String) {
  let target = uri.path_and_query().map_or(uri.path(), |pq| pq.as_str());
  (StatusCode::NOT_FOUND, format!("Cannot {method} {target}"))
}

// ─── Integration tests ────────────────────────────────────────────────────────
