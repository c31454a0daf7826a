// src/config.rs
pub mod app;
pub mod stripe;

pub use app::{AppConfig, LoyaltyConfig, RenewalConfig};
pub use stripe::StripeConfig;

pub type Config = AppConfig;
