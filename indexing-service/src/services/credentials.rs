//! Google service-account credentials and the OAuth 2.0 JWT-bearer grant
//! used to obtain access tokens for the Indexing API.

use super::indexing::IndexingError;
use super::metrics::record_api_call;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::sync::Mutex;

/// OAuth scope required by `urlNotifications.publish` and `getMetadata`.
pub const INDEXING_SCOPE: &str = "https://www.googleapis.com/auth/indexing";

pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
/// Cached tokens are refreshed this long before Google says they expire.
const EXPIRY_MARGIN_SECS: i64 = 60;
/// Upper bound on one token exchange when no request timeout is configured.
pub const DEFAULT_TOKEN_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// The JSON key file Google issues for a service account.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    #[serde(rename = "type")]
    pub key_type: String,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub private_key_id: Option<String>,
    pub private_key: Secret<String>,
    pub client_email: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    /// Accepts either the key JSON itself or a path to a file holding it,
    /// matching both ways `GOOGLE_APPLICATION_CREDENTIALS` is used in practice.
    pub fn from_env_value(value: &str) -> Result<Self, IndexingError> {
        let trimmed = value.trim();
        if trimmed.starts_with('{') {
            Self::from_json(trimmed)
        } else {
            Self::from_file(Path::new(trimmed))
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, IndexingError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            IndexingError::Credentials(format!(
                "Failed to read credentials file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&contents)
    }

    pub fn from_json(json: &str) -> Result<Self, IndexingError> {
        let key: ServiceAccountKey = serde_json::from_str(json).map_err(|e| {
            IndexingError::Credentials(format!("Invalid service account JSON: {}", e))
        })?;
        key.validate()?;
        Ok(key)
    }

    fn validate(&self) -> Result<(), IndexingError> {
        if self.key_type != "service_account" {
            return Err(IndexingError::Credentials(format!(
                "Expected credentials of type 'service_account', got '{}'",
                self.key_type
            )));
        }
        if self.client_email.is_empty() {
            return Err(IndexingError::Credentials(
                "Service account client_email is empty".to_string(),
            ));
        }
        if self.private_key.expose_secret().is_empty() {
            return Err(IndexingError::Credentials(
                "Service account private_key is empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AssertionClaims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

/// Signs RS256 assertions with the service account's private key.
pub struct AssertionSigner {
    client_email: String,
    token_uri: String,
    key_id: Option<String>,
    encoding_key: EncodingKey,
}

impl AssertionSigner {
    pub fn new(key: &ServiceAccountKey) -> Result<Self, IndexingError> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.expose_secret().as_bytes())
            .map_err(|e| {
                IndexingError::Credentials(format!("Failed to parse service account private key: {}", e))
            })?;

        Ok(Self {
            client_email: key.client_email.clone(),
            token_uri: key.token_uri.clone(),
            key_id: key.private_key_id.clone(),
            encoding_key,
        })
    }

    pub fn token_uri(&self) -> &str {
        &self.token_uri
    }

    pub fn sign(&self, issued_at: DateTime<Utc>) -> Result<String, IndexingError> {
        let iat = issued_at.timestamp();
        let claims = AssertionClaims {
            iss: self.client_email.clone(),
            scope: INDEXING_SCOPE.to_string(),
            aud: self.token_uri.clone(),
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key_id.clone();

        encode(&header, &claims, &self.encoding_key)
            .map_err(|e| IndexingError::Credentials(format!("Failed to sign token assertion: {}", e)))
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    ASSERTION_LIFETIME_SECS
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

struct CachedToken {
    access_token: Secret<String>,
    expires_at: DateTime<Utc>,
}

/// Exchanges signed assertions for bearer tokens and caches the result
/// until shortly before it expires.
pub struct AccessTokenProvider {
    signer: AssertionSigner,
    client: Client,
    token_timeout: std::time::Duration,
    cached: Mutex<Option<CachedToken>>,
}

impl AccessTokenProvider {
    pub fn new(
        key: &ServiceAccountKey,
        client: Client,
        token_timeout: std::time::Duration,
    ) -> Result<Self, IndexingError> {
        Ok(Self {
            signer: AssertionSigner::new(key)?,
            client,
            token_timeout,
            cached: Mutex::new(None),
        })
    }

    /// Returns the cached token, or exchanges a fresh assertion for one.
    ///
    /// The exchange runs with the cache lock held, so concurrent callers wait
    /// for it. It is bounded by `token_timeout`; a request that times out
    /// fails with `Authentication` and leaves the cache empty.
    pub async fn access_token(&self) -> Result<String, IndexingError> {
        let mut cached = self.cached.lock().await;
        let now = Utc::now();

        if let Some(token) = cached.as_ref() {
            if token.expires_at > now {
                return Ok(token.access_token.expose_secret().clone());
            }
        }

        let token = self.fetch_token(now).await;
        record_api_call("token", if token.is_ok() { "ok" } else { "error" });
        let token = token?;

        let access_token = token.access_token.clone();
        *cached = Some(CachedToken {
            access_token: Secret::new(token.access_token),
            expires_at: now + Duration::seconds((token.expires_in - EXPIRY_MARGIN_SECS).max(0)),
        });

        Ok(access_token)
    }

    async fn fetch_token(&self, now: DateTime<Utc>) -> Result<TokenResponse, IndexingError> {
        let assertion = self.signer.sign(now)?;

        let response = self
            .client
            .post(self.signer.token_uri())
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .timeout(self.token_timeout)
            .send()
            .await
            .map_err(|e| {
                IndexingError::Authentication(format!("Failed to reach token endpoint: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let reason = match serde_json::from_str::<TokenErrorResponse>(&body) {
                Ok(err) => match err.error_description {
                    Some(description) => format!("{}: {}", err.error, description),
                    None => err.error,
                },
                Err(_) => body,
            };
            return Err(IndexingError::Authentication(format!(
                "Token endpoint returned {}: {}",
                status, reason
            )));
        }

        response.json::<TokenResponse>().await.map_err(|e| {
            IndexingError::Authentication(format!("Failed to parse token response: {}", e))
        })
    }
}
