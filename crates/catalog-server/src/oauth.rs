//! OAuth 2.0 authorization-code client for GitHub and Google.
//!
//! Only the three calls the login flow needs: build the authorize URL,
//! exchange a code for an access token, fetch the user's profile.

use std::{sync::Arc, time::Duration};

use reqwest::{Client, Url, header};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

const USER_AGENT: &str = concat!("catalog-server/", env!("CARGO_PKG_VERSION"));

// ─── Providers ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
  Github,
  Google,
}

impl Provider {
  pub fn authorize_url(self) -> &'static str {
    match self {
      Self::Github => "https://github.com/login/oauth/authorize",
      Self::Google => "https://accounts.google.com/o/oauth2/v2/auth",
    }
  }

  pub fn token_url(self) -> &'static str {
    match self {
      Self::Github => "https://github.com/login/oauth/access_token",
      Self::Google => "https://oauth2.googleapis.com/token",
    }
  }

  pub fn profile_url(self) -> &'static str {
    match self {
      Self::Github => "https://api.github.com/user",
      Self::Google => "https://openidconnect.googleapis.com/v1/userinfo",
    }
  }

  pub fn scope(self) -> &'static str {
    match self {
      Self::Github => "user:email",
      Self::Google => "openid email profile",
    }
  }
}

/// OAuth application credentials, deserialised from the `[oauth]` table.
#[derive(Deserialize, Clone)]
pub struct OAuthConfig {
  pub provider:      Provider,
  pub client_id:     String,
  pub client_secret: String,
}

/// Who logged in, as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
  pub provider: Provider,
  /// Provider-stable user id.
  pub subject:  String,
  pub name:     Option<String>,
  pub email:    Option<String>,
}

/// Map a provider's profile JSON onto an [`Identity`].
pub fn identity_from_profile(provider: Provider, profile: &Value) -> Result<Identity> {
  let text = |key: &str| profile.get(key).and_then(Value::as_str).map(str::to_owned);

  let subject = match provider {
    // GitHub ids are numbers.
    Provider::Github => profile.get("id").and_then(|id| match id {
      Value::Number(n) => Some(n.to_string()),
      Value::String(s) => Some(s.clone()),
      _ => None,
    }),
    Provider::Google => text("sub"),
  }
  .ok_or_else(|| Error::Provider("profile has no user id".to_owned()))?;

  let name = match provider {
    Provider::Github => text("name").or_else(|| text("login")),
    Provider::Google => text("name"),
  };

  Ok(Identity {
    provider,
    subject,
    name,
    email: text("email"),
  })
}

// ─── Client ──────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct TokenResponse {
  access_token:      Option<String>,
  error:             Option<String>,
  error_description: Option<String>,
}

/// Clones share the connection pool of the inner [`reqwest::Client`].
#[derive(Clone)]
pub struct OAuthClient {
  http:         Client,
  config:       Arc<OAuthConfig>,
  authorize:    Url,
  redirect_uri: String,
}

impl OAuthClient {
  /// `public_url` is the externally visible base of this server; the
  /// provider redirects back to `<public_url>/auth/callback`.
  pub fn new(config: OAuthConfig, public_url: &str) -> Result<Self> {
    let redirect_uri = format!("{}/auth/callback", public_url.trim_end_matches('/'));
    Url::parse(&redirect_uri).map_err(|e| Error::Config(format!("public_url: {e}")))?;
    let authorize = Url::parse(config.provider.authorize_url())
      .map_err(|e| Error::Config(format!("authorize url: {e}")))?;

    let http = Client::builder()
      .timeout(Duration::from_secs(30))
      .user_agent(USER_AGENT)
      .build()?;

    Ok(Self {
      http,
      config: Arc::new(config),
      authorize,
      redirect_uri,
    })
  }

  pub fn provider(&self) -> Provider { self.config.provider }

  /// The URL to send the browser to, carrying the one-time `state`.
  pub fn authorize_url(&self, state: &str) -> String {
    let mut url = self.authorize.clone();
    url
      .query_pairs_mut()
      .append_pair("client_id", &self.config.client_id)
      .append_pair("redirect_uri", &self.redirect_uri)
      .append_pair("response_type", "code")
      .append_pair("scope", self.config.provider.scope())
      .append_pair("state", state);
    url.into()
  }

  /// Trade an authorization code for an access token.
  pub async fn exchange_code(&self, code: &str) -> Result<String> {
    let resp: TokenResponse = self
      .http
      .post(self.config.provider.token_url())
      .header(header::ACCEPT, "application/json")
      .form(&[
        ("client_id", self.config.client_id.as_str()),
        ("client_secret", self.config.client_secret.as_str()),
        ("code", code),
        ("redirect_uri", self.redirect_uri.as_str()),
        ("grant_type", "authorization_code"),
      ])
      .send()
      .await?
      .json()
      .await?;

    match resp {
      TokenResponse { access_token: Some(token), .. } => Ok(token),
      TokenResponse { error, error_description, .. } => Err(Error::Provider(
        error_description
          .or(error)
          .unwrap_or_else(|| "no access token in response".to_owned()),
      )),
    }
  }

  /// Fetch the profile of the user who granted `access_token`.
  pub async fn fetch_identity(&self, access_token: &str) -> Result<Identity> {
    let profile: Value = self
      .http
      .get(self.config.provider.profile_url())
      .header(header::ACCEPT, "application/json")
      .bearer_auth(access_token)
      .send()
      .await?
      .error_for_status()?
      .json()
      .await?;

    identity_from_profile(self.config.provider, &profile)
  }
}
