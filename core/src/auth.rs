//! Access-token providers.
//!
//! # Design
//! `FileApiClient` asks an `AuthProvider` for a token before every request
//! and calls `reset_token` when the API answers 401. `TokenProvider` is the
//! default: it signs in with user credentials against the Auth API, caches
//! the token until shortly before it expires, renews it with the refresh
//! token when possible, and falls back to a full sign-in otherwise.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use log::{debug, warn};
use serde::Deserialize;
use serde_json::json;

use crate::envelope;
use crate::error::{ApiError, Result};
use crate::http::{HttpExecutor, HttpMethod, HttpRequest, RequestBody};

pub const DEFAULT_AUTH_URL: &str = "https://api.smartling.com/auth-api/v2";

pub const DEFAULT_TOKEN_TYPE: &str = "Bearer";

/// Tokens are treated as expired this long before the server says so.
const EXPIRY_MARGIN: Duration = Duration::from_secs(10);

/// Supplies the credentials placed in the `Authorization` header.
pub trait AuthProvider: Send + Sync {
    /// A currently valid access token, authenticating if needed.
    fn access_token(&self) -> Result<String>;

    /// Scheme paired with the token, e.g. `Bearer`.
    fn token_type(&self) -> String;

    /// Forget any cached token so the next `access_token` call authenticates.
    fn reset_token(&self);
}

/// A fixed, externally managed token.
#[derive(Debug, Clone)]
pub struct StaticToken {
    token: String,
    token_type: String,
}

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            token_type: DEFAULT_TOKEN_TYPE.to_string(),
        }
    }

    pub fn with_type(token: impl Into<String>, token_type: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            token_type: token_type.into(),
        }
    }
}

impl AuthProvider for StaticToken {
    fn access_token(&self) -> Result<String> {
        Ok(self.token.clone())
    }

    fn token_type(&self) -> String {
        self.token_type.clone()
    }

    fn reset_token(&self) {}
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenData {
    access_token: String,
    refresh_token: String,
    expires_in: u64,
    refresh_expires_in: u64,
    #[serde(default)]
    token_type: Option<String>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    token_type: String,
    refresh_token: String,
    expires_at: Instant,
    refresh_expires_at: Instant,
}

/// `issued_at + secs`, or `MalformedResponse` when the instant overflows.
fn expiry(issued_at: Instant, secs: u64, field: &str) -> Result<Instant> {
    issued_at
        .checked_add(Duration::from_secs(secs))
        .ok_or_else(|| ApiError::MalformedResponse(format!("{field} out of range: {secs}")))
}

impl CachedToken {
    fn from_data(data: TokenData, issued_at: Instant) -> Result<Self> {
        Ok(Self {
            expires_at: expiry(issued_at, data.expires_in, "expiresIn")?,
            refresh_expires_at: expiry(issued_at, data.refresh_expires_in, "refreshExpiresIn")?,
            access_token: data.access_token,
            token_type: data
                .token_type
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| DEFAULT_TOKEN_TYPE.to_string()),
            refresh_token: data.refresh_token,
        })
    }

    fn access_valid(&self, now: Instant) -> bool {
        self.expires_at > now + EXPIRY_MARGIN
    }

    fn refresh_valid(&self, now: Instant) -> bool {
        self.refresh_expires_at > now + EXPIRY_MARGIN
    }
}

/// Signs in against the Auth API with a user identifier and secret.
pub struct TokenProvider {
    user_identifier: String,
    user_secret: String,
    auth_url: String,
    executor: Arc<dyn HttpExecutor>,
    cache: Mutex<Option<CachedToken>>,
}

impl TokenProvider {
    pub fn new(
        user_identifier: impl Into<String>,
        user_secret: impl Into<String>,
        executor: Arc<dyn HttpExecutor>,
    ) -> Self {
        Self::with_auth_url(user_identifier, user_secret, DEFAULT_AUTH_URL, executor)
    }

    pub fn with_auth_url(
        user_identifier: impl Into<String>,
        user_secret: impl Into<String>,
        auth_url: &str,
        executor: Arc<dyn HttpExecutor>,
    ) -> Self {
        Self {
            user_identifier: user_identifier.into(),
            user_secret: user_secret.into(),
            auth_url: auth_url.trim_end_matches('/').to_string(),
            executor,
            cache: Mutex::new(None),
        }
    }

    pub fn build_authenticate(&self) -> HttpRequest {
        self.json_post(
            "authenticate",
            json!({
                "userIdentifier": self.user_identifier,
                "userSecret": self.user_secret,
            }),
        )
    }

    pub fn build_refresh(&self, refresh_token: &str) -> HttpRequest {
        self.json_post("authenticate/refresh", json!({ "refreshToken": refresh_token }))
    }

    fn json_post(&self, path: &str, body: serde_json::Value) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Post,
            url: format!("{}/{path}", self.auth_url),
            headers: vec![
                ("Accept".to_string(), "application/json".to_string()),
                ("Content-Type".to_string(), "application/json".to_string()),
            ],
            body: Some(RequestBody::Bytes(body.to_string().into_bytes())),
        }
    }

    fn request_token(&self, request: HttpRequest) -> Result<CachedToken> {
        let issued_at = Instant::now();
        let response = self.executor.execute(&request)?;
        envelope::check_status(&response)?;
        let data = envelope::unwrap_data(&response.body)?;
        let data: TokenData =
            serde_json::from_value(data).map_err(|e| ApiError::MalformedResponse(e.to_string()))?;
        CachedToken::from_data(data, issued_at)
    }

    fn authenticate(&self) -> Result<CachedToken> {
        debug!("authenticating as {}", self.user_identifier);
        self.request_token(self.build_authenticate())
    }

    fn refresh(&self, refresh_token: &str) -> Result<CachedToken> {
        debug!("refreshing access token");
        self.request_token(self.build_refresh(refresh_token))
    }

    fn lock(&self) -> MutexGuard<'_, Option<CachedToken>> {
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl AuthProvider for TokenProvider {
    fn access_token(&self) -> Result<String> {
        let mut cache = self.lock();
        let now = Instant::now();

        if let Some(cached) = cache.as_ref() {
            if cached.access_valid(now) {
                return Ok(cached.access_token.clone());
            }
        }

        let renewed = match cache.take() {
            Some(cached) if cached.refresh_valid(now) => match self.refresh(&cached.refresh_token) {
                Ok(token) => token,
                Err(e) => {
                    warn!("token refresh failed, signing in again: {e}");
                    self.authenticate()?
                }
            },
            _ => self.authenticate()?,
        };

        let token = renewed.access_token.clone();
        *cache = Some(renewed);
        Ok(token)
    }

    fn token_type(&self) -> String {
        self.lock()
            .as_ref()
            .map(|cached| cached.token_type.clone())
            .unwrap_or_else(|| DEFAULT_TOKEN_TYPE.to_string())
    }

    fn reset_token(&self) {
        debug!("discarding cached access token");
        *self.lock() = None;
    }
}
