//! In-memory login sessions and one-time OAuth `state` values.
//!
//! Sessions live only as long as the process. The browser holds the session
//! id in the `catalog_session` cookie.

use std::{collections::HashMap, sync::Arc};

use axum::http::{HeaderMap, header};
use catalog_api::AuthGate;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::oauth::Identity;

pub const COOKIE_NAME: &str = "catalog_session";

/// How long a login attempt may take between redirect and callback.
const STATE_TTL_MINUTES: i64 = 10;

#[derive(Debug, Clone)]
pub struct Session {
  pub identity:   Identity,
  pub created_at: DateTime<Utc>,
  pub expires_at: DateTime<Utc>,
}

#[derive(Default)]
struct Inner {
  sessions: HashMap<Uuid, Session>,
  /// Outstanding `state` values and their expiry.
  pending:  HashMap<Uuid, DateTime<Utc>>,
}

#[derive(Clone)]
pub struct SessionStore {
  inner: Arc<RwLock<Inner>>,
  ttl:   Duration,
}

impl SessionStore {
  pub fn new(ttl: Duration) -> Self {
    Self {
      inner: Arc::default(),
      ttl,
    }
  }

  pub fn ttl(&self) -> Duration { self.ttl }

  /// Mint a fresh `state` for a login redirect.
  pub async fn begin_login(&self) -> Uuid {
    let now = Utc::now();
    let state = Uuid::new_v4();
    let mut inner = self.inner.write().await;
    inner.pending.retain(|_, expires| *expires > now);
    inner
      .pending
      .insert(state, now + Duration::minutes(STATE_TTL_MINUTES));
    state
  }

  /// Consume `state`. `true` only the first time, and only before it expires.
  pub async fn finish_login(&self, state: &str) -> bool {
    let Ok(state) = Uuid::parse_str(state) else {
      return false;
    };
    let expires = self.inner.write().await.pending.remove(&state);
    matches!(expires, Some(expires) if expires > Utc::now())
  }

  /// Open a session for `identity` and return its id.
  pub async fn create(&self, identity: Identity) -> Uuid {
    let now = Utc::now();
    let id = Uuid::new_v4();
    let mut inner = self.inner.write().await;
    inner.sessions.retain(|_, s| s.expires_at > now);
    inner.sessions.insert(id, Session {
      identity,
      created_at: now,
      expires_at: now + self.ttl,
    });
    id
  }

  /// The live session for `id`, if any.
  pub async fn get(&self, id: Uuid) -> Option<Session> {
    let inner = self.inner.read().await;
    inner
      .sessions
      .get(&id)
      .filter(|s| s.expires_at > Utc::now())
      .cloned()
  }

  pub async fn remove(&self, id: Uuid) -> Option<Session> {
    self.inner.write().await.sessions.remove(&id)
  }
}

impl AuthGate for SessionStore {
  async fn is_authenticated(&self, headers: &HeaderMap) -> bool {
    match session_id(headers) {
      Some(id) => self.get(id).await.is_some(),
      None => false,
    }
  }
}

// ─── Cookies ─────────────────────────────────────────────────────────────────

/// Pull the session id out of the request's `Cookie` header(s).
pub fn session_id(headers: &HeaderMap) -> Option<Uuid> {
  headers
    .get_all(header::COOKIE)
    .iter()
    .filter_map(|v| v.to_str().ok())
    .flat_map(|v| v.split(';'))
    .filter_map(|pair| pair.trim().split_once('='))
    .find(|(name, _)| *name == COOKIE_NAME)
    .and_then(|(_, value)| Uuid::parse_str(value.trim_matches('"')).ok())
}

/// `Set-Cookie` value that stores `id` for `ttl`.
pub fn session_cookie(id: Uuid, ttl: Duration, secure: bool) -> String {
  cookie(&id.to_string(), ttl.num_seconds(), secure)
}

/// `Set-Cookie` value that makes the browser drop the session cookie.
pub fn expired_cookie(secure: bool) -> String { cookie("", 0, secure) }

fn cookie(value: &str, max_age: i64, secure: bool) -> String {
  let mut cookie =
    format!("{COOKIE_NAME}={value}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}");
  if secure {
    cookie.push_str("; Secure");
  }
  cookie
}
