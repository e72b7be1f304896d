//! Token refresh client for the Divvy API.
//!
//! The refresh endpoint takes the stored refresh token in the Authorization
//! header. The HTTP status is surfaced as data so callers can apply their own
//! verdict; only transport and parse failures are errors.

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::config::Config;

/// Default base URL for the Divvy API.
pub const DEFAULT_BASE_URL: &str = "https://api.divvy.app";

/// Path of the session refresh endpoint.
pub const REFRESH_PATH: &str = "/v1/session/refresh";

/// A fresh access/refresh token pair from a successful refresh.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenPair {
    /// The access token (short-lived)
    pub access_token: String,
    /// The refresh token (long-lived)
    pub refresh_token: String,
}

/// Outcome of a refresh round-trip that reached the server.
#[derive(Debug, Clone)]
pub struct RefreshResponse {
    /// HTTP status returned by the endpoint.
    pub status: u16,
    /// New tokens, present only for a 200 with a well-formed body.
    pub tokens: Option<TokenPair>,
}

/// Client seam for the refresh endpoint.
pub trait AuthBackend {
    /// Sends the refresh request with the given Authorization header value.
    ///
    /// Any HTTP response, success or not, is `Ok` with its status.
    ///
    /// # Errors
    /// Returns an error if the request cannot be sent or a 200 body cannot
    /// be parsed.
    fn refresh(&self, authorization: &str)
    -> impl Future<Output = Result<RefreshResponse>> + Send;
}

/// HTTP refresh client for the Divvy API.
pub struct HttpAuthBackend {
    base_url: String,
    http: reqwest::Client,
}

impl HttpAuthBackend {
    /// Creates a backend from configuration.
    ///
    /// Base URL resolution order:
    /// 1. `DIVVY_API_BASE_URL` env var (if set and non-empty)
    /// 2. `api_base_url` from config (if set and non-empty)
    /// 3. Default: `https://api.divvy.app`
    ///
    /// # Errors
    /// Returns an error if the resolved URL is not well-formed.
    pub fn from_config(config: &Config) -> Result<Self> {
        let base_url = Self::resolve_base_url(config.effective_api_base_url())?;
        Ok(Self::with_base_url(base_url))
    }

    /// Creates a backend with an explicit base URL.
    ///
    /// # Panics
    /// - In test builds (`#[cfg(test)]`), panics if `base_url` is the production API.
    /// - At runtime, panics if `DIVVY_BLOCK_REAL_API=1` and `base_url` is the production API.
    ///
    /// This prevents tests from accidentally making real network requests.
    /// Use `DIVVY_API_BASE_URL` env var or config to point to a mock server.
    pub fn with_base_url(base_url: String) -> Self {
        // Compile-time guard for unit tests
        #[cfg(test)]
        if base_url == DEFAULT_BASE_URL {
            panic!(
                "Tests must not use the production Divvy API!\n\
                 Set DIVVY_API_BASE_URL to a mock server (e.g., wiremock).\n\
                 Found base_url: {base_url}"
            );
        }

        // Runtime guard for integration tests (set DIVVY_BLOCK_REAL_API=1 in test harness)
        #[cfg(not(test))]
        if std::env::var("DIVVY_BLOCK_REAL_API").is_ok_and(|v| v == "1")
            && base_url == DEFAULT_BASE_URL
        {
            panic!(
                "DIVVY_BLOCK_REAL_API=1 but trying to use production Divvy API!\n\
                 Set DIVVY_API_BASE_URL to a mock server.\n\
                 Found base_url: {base_url}"
            );
        }

        Self {
            base_url,
            http: reqwest::Client::new(),
        }
    }

    /// Returns the resolved base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolves the base URL with precedence: env > config > default.
    /// Validates that the URL is well-formed.
    fn resolve_base_url(config_base_url: Option<&str>) -> Result<String> {
        // Try env var first
        if let Ok(env_url) = std::env::var("DIVVY_API_BASE_URL") {
            let trimmed = env_url.trim();
            if !trimmed.is_empty() {
                Self::validate_url(trimmed)?;
                return Ok(trimmed.to_string());
            }
        }

        // Try config value
        if let Some(config_url) = config_base_url {
            let trimmed = config_url.trim();
            if !trimmed.is_empty() {
                Self::validate_url(trimmed)?;
                return Ok(trimmed.to_string());
            }
        }

        // Default
        Ok(DEFAULT_BASE_URL.to_string())
    }

    /// Validates that a URL is well-formed.
    fn validate_url(url: &str) -> Result<()> {
        url::Url::parse(url).with_context(|| format!("Invalid Divvy base URL: {url}"))?;
        Ok(())
    }
}

impl AuthBackend for HttpAuthBackend {
    async fn refresh(&self, authorization: &str) -> Result<RefreshResponse> {
        let url = format!("{}{}", self.base_url, REFRESH_PATH);

        let response = self
            .http
            .post(&url)
            .header("Authorization", authorization)
            .send()
            .await
            .context("Failed to send token refresh request")?;

        let status = response.status().as_u16();

        // The mobile client only accepts an exact 200; anything else is
        // reported with no tokens and the caller decides what it means.
        if status != 200 {
            return Ok(RefreshResponse {
                status,
                tokens: None,
            });
        }

        let tokens: TokenPair = response
            .json()
            .await
            .context("Failed to parse token refresh response")?;

        Ok(RefreshResponse {
            status,
            tokens: Some(tokens),
        })
    }
}
