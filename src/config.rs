//! Storefront configuration
//!
//! Explicit injected configuration for the backend connection. Nothing in
//! this crate reads ambient global state at call time; the environment is
//! consulted once, here.

use url::Url;

use crate::error::{Result, StorefrontError};

const DEFAULT_API_URL: &str = "http://127.0.0.1:5001/api";

#[derive(Clone, Debug)]
pub struct StorefrontConfig {
    /// Base URL of the backend API, including the `/api` prefix.
    pub api_base: Url,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
}

impl StorefrontConfig {
    pub fn new(api_base: Url) -> Self {
        Self {
            api_base,
            timeout_secs: 30,
            max_retries: 3,
            retry_delay_ms: 250,
        }
    }

    /// Read configuration from the environment (`.env` honored).
    ///
    /// `STOREFRONT_API_URL` defaults to the local backend; the retry knobs
    /// (`STOREFRONT_TIMEOUT_SECS`, `STOREFRONT_MAX_RETRIES`,
    /// `STOREFRONT_RETRY_DELAY_MS`) are optional overrides.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        let raw = std::env::var("STOREFRONT_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.into());
        let api_base = Url::parse(&raw)
            .map_err(|e| StorefrontError::Config(format!("invalid STOREFRONT_API_URL: {e}")))?;
        let mut config = Self::new(api_base);
        if let Ok(v) = std::env::var("STOREFRONT_TIMEOUT_SECS") {
            config.timeout_secs = v
                .parse()
                .map_err(|e| StorefrontError::Config(format!("invalid STOREFRONT_TIMEOUT_SECS: {e}")))?;
        }
        if let Ok(v) = std::env::var("STOREFRONT_MAX_RETRIES") {
            config.max_retries = v
                .parse()
                .map_err(|e| StorefrontError::Config(format!("invalid STOREFRONT_MAX_RETRIES: {e}")))?;
        }
        if let Ok(v) = std::env::var("STOREFRONT_RETRY_DELAY_MS") {
            config.retry_delay_ms = v.parse().map_err(|e| {
                StorefrontError::Config(format!("invalid STOREFRONT_RETRY_DELAY_MS: {e}"))
            })?;
        }
        Ok(config)
    }
}
