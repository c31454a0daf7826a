use once_cell::sync::Lazy;
use std::env;
use stripe::{Client, Currency};

pub static STRIPE_CLIENT: Lazy<Client> = Lazy::new(|| {
    let secret_key = env::var("STRIPE_SECRET_KEY").unwrap_or_else(|_| {
        tracing::warn!("STRIPE_SECRET_KEY not set, using empty key for development");
        String::new()
    });

    if secret_key.is_empty() {
        tracing::warn!("Stripe client initialized with empty key - renewals will not be charged");
    }

    Client::new(secret_key)
});

#[derive(Clone, Debug)]
pub struct StripeConfig {
    pub secret_key: String,
    pub currency: Currency,
    pub development_mode: bool,
}

impl StripeConfig {
    pub fn from_env() -> Result<Self, String> {
        let development_mode = env::var("PAYMENT_DEVELOPMENT_MODE")
            .unwrap_or_else(|_| "false".to_string())
            .parse::<bool>()
            .unwrap_or(false);

        let currency = env::var("STRIPE_CURRENCY")
            .unwrap_or_else(|_| "rwf".to_string())
            .parse::<Currency>()
            .map_err(|_| "Invalid STRIPE_CURRENCY value".to_string())?;

        if development_mode {
            tracing::info!("Payment development mode enabled - renewal charges are approved locally");
            return Ok(Self {
                currency,
                ..Self::development()
            });
        }

        // 本番/テストモードの設定
        let secret_key = env::var("STRIPE_SECRET_KEY")
            .map_err(|_| "STRIPE_SECRET_KEY must be set when not in development mode")?;

        if secret_key.starts_with("pk_") {
            tracing::error!("STRIPE_SECRET_KEY is a publishable key, but a secret key is required");
            return Err("Invalid STRIPE_SECRET_KEY: use a secret key (sk_...)".to_string());
        }

        Ok(Self {
            secret_key,
            currency,
            development_mode: false,
        })
    }

    /// 外部呼び出しを行わない開発用設定
    pub fn development() -> Self {
        Self {
            secret_key: String::new(),
            currency: Currency::RWF,
            development_mode: true,
        }
    }

    pub fn is_test_mode(&self) -> bool {
        self.secret_key.starts_with("sk_test_") || self.development_mode
    }
}
