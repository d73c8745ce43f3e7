//! Service-account authentication for Google Cloud APIs.
//!
//! An RS256-signed JWT assertion is exchanged at the account's `token_uri`
//! for a short-lived bearer token, which is cached until shortly before it
//! expires.

use std::{
    fs,
    path::Path,
    sync::Mutex,
    time::{Duration, Instant},
};

use anyhow::{bail, Context, Result};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
/// Lifetime requested for each assertion (Google's maximum).
const ASSERTION_LIFETIME_SECS: i64 = 3600;
/// Refresh this long before the reported expiry.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Deserialize)]
struct ServiceAccountFile {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    client_email: String,
    private_key: String,
    #[serde(default)]
    token_uri: Option<String>,
}

#[derive(Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    ASSERTION_LIFETIME_SECS as u64
}

/// Parsed service-account key file.
pub struct ServiceAccount {
    client_email: String,
    token_uri: String,
    key: EncodingKey,
}

impl std::fmt::Debug for ServiceAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccount")
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .field("key", &"<redacted>")
            .finish()
    }
}

impl ServiceAccount {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to load {}", path.as_ref().display()))?;
        Self::from_json(&text)
            .with_context(|| format!("Invalid credentials file {}", path.as_ref().display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let file: ServiceAccountFile =
            serde_json::from_str(text).context("credentials are not a service-account JSON key")?;
        if let Some(kind) = file.kind.as_deref() {
            if kind != "service_account" {
                bail!("expected a service_account key, got {kind:?}");
            }
        }
        let key = EncodingKey::from_rsa_pem(file.private_key.as_bytes())
            .context("private_key is not a valid RSA PEM key")?;
        Ok(Self {
            client_email: file.client_email,
            token_uri: file.token_uri.unwrap_or_else(|| DEFAULT_TOKEN_URI.to_string()),
            key,
        })
    }

    pub fn client_email(&self) -> &str {
        &self.client_email
    }

    fn assertion(&self) -> Result<String> {
        let now = chrono::Utc::now().timestamp();
        let claims = AssertionClaims {
            iss: &self.client_email,
            scope: CLOUD_PLATFORM_SCOPE,
            aud: &self.token_uri,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };
        encode(&Header::new(Algorithm::RS256), &claims, &self.key)
            .context("Failed to sign service-account assertion")
    }
}

struct CachedToken {
    value: String,
    refresh_at: Instant,
}

/// Hands out bearer tokens for one service account.
pub(crate) struct TokenSource {
    account: ServiceAccount,
    client: Client,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenSource {
    pub fn new(account: ServiceAccount, client: Client) -> Self {
        Self { account, client, cached: Mutex::new(None) }
    }

    pub fn access_token(&self) -> Result<String> {
        let mut cached = self
            .cached
            .lock()
            .map_err(|_| anyhow::anyhow!("token cache lock poisoned"))?;
        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.refresh_at {
                return Ok(token.value.clone());
            }
        }

        debug!("Requesting access token for {}", self.account.client_email);
        let assertion = self.account.assertion()?;
        let response = self
            .client
            .post(&self.account.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .context("Token request failed")?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().unwrap_or_default();
            bail!("Token endpoint error ({status}): {text}");
        }
        let token: TokenResponse = response.json().context("Malformed token response")?;

        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(EXPIRY_MARGIN);
        *cached = Some(CachedToken {
            value: token.access_token.clone(),
            refresh_at: Instant::now() + lifetime,
        });
        Ok(token.access_token)
    }
}

/// Key file for a throwaway service account whose token endpoint is `token_uri`.
#[cfg(test)]
pub(crate) fn test_key_json(token_uri: &str) -> String {
    serde_json::json!({
        "type": "service_account",
        "project_id": "describe-test",
        "client_email": "tts@describe-test.iam.gserviceaccount.com",
        "private_key": include_str!("../testdata/service_account_key.pem"),
        "token_uri": token_uri,
    })
    .to_string()
}
