// src/service/mod.rs
pub mod auto_renewal_service;
pub mod checkout_service;
pub mod loyalty_service;
pub mod payment_event_service;
pub mod referral_service;
pub mod subscription_service;
pub mod vip_service;
