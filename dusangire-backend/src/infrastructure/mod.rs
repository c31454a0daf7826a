// src/infrastructure/mod.rs

pub mod notification;
pub mod payment_gateway;

pub use notification::{DatabaseNotifier, Notifier, TracingNotifier};
pub use payment_gateway::{ChargeRequest, PaymentGateway, StripePaymentGateway};
