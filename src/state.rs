use crate::checkout::square::{PaymentProvider, SquareClient};
use crate::config::AppConfig;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub provider: Arc<dyn PaymentProvider>,
}

impl AppState {
    pub fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let provider = Arc::new(SquareClient::new(&config.square)?) as Arc<dyn PaymentProvider>;
        Ok(Self { config, provider })
    }

    #[cfg(test)]
    pub fn fake(provider: Arc<dyn PaymentProvider>) -> Self {
        use crate::config::{CheckoutConfig, SquareConfig};

        let config = Arc::new(AppConfig {
            square: SquareConfig {
                access_token: "test-token".into(),
                api_base_url: "https://connect.squareupsandbox.com/v2".into(),
                api_version: "2023-09-25".into(),
                location_id: "LTEST".into(),
                timeout_secs: 5,
            },
            checkout: CheckoutConfig {
                store_name: "Simchas Gourmet".into(),
                support_email: "support@simchasgourmet.com".into(),
                redirect_base_url: "http://localhost:5173".into(),
            },
        });
        Self { config, provider }
    }
}
