use std::fmt;
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

/// Credentials and endpoint for the hosted checkout provider.
#[derive(Clone, Deserialize)]
pub struct SquareConfig {
    pub access_token: String,
    pub api_base_url: String,
    pub api_version: String,
    pub location_id: String,
    pub timeout_secs: u64,
}

impl SquareConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// First few characters of the token, for startup logs.
    pub fn token_hint(&self) -> String {
        let prefix: String = self.access_token.chars().take(5).collect();
        format!("{prefix}...")
    }
}

impl fmt::Debug for SquareConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SquareConfig")
            .field("access_token", &self.token_hint())
            .field("api_base_url", &self.api_base_url)
            .field("api_version", &self.api_version)
            .field("location_id", &self.location_id)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Storefront values that end up inside the checkout payload.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutConfig {
    pub store_name: String,
    pub support_email: String,
    pub redirect_base_url: String,
}

impl CheckoutConfig {
    pub fn success_url(&self) -> String {
        format!("{}/order-success", self.redirect_base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub square: SquareConfig,
    pub checkout: CheckoutConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let square = SquareConfig {
            access_token: std::env::var("SQUARE_ACCESS_TOKEN")
                .context("SQUARE_ACCESS_TOKEN must be set")?,
            api_base_url: std::env::var("SQUARE_API_URL")
                .unwrap_or_else(|_| "https://connect.squareup.com/v2".into()),
            api_version: std::env::var("SQUARE_VERSION").unwrap_or_else(|_| "2023-09-25".into()),
            location_id: std::env::var("SQUARE_LOCATION_ID")
                .context("SQUARE_LOCATION_ID must be set")?,
            timeout_secs: std::env::var("PROVIDER_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(15),
        };
        let checkout = CheckoutConfig {
            store_name: std::env::var("STORE_NAME").unwrap_or_else(|_| "Simchas Gourmet".into()),
            support_email: std::env::var("SUPPORT_EMAIL")
                .unwrap_or_else(|_| "support@simchasgourmet.com".into()),
            redirect_base_url: std::env::var("REDIRECT_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:5173".into()),
        };
        Ok(Self { square, checkout })
    }
}
