// src/domain/mod.rs
pub mod auto_renewal_model;
pub mod loyalty_points_model;
pub mod loyalty_transaction_model;
pub mod notification_model;
pub mod pricing;
pub mod referral_model;
pub mod subscription_model;
pub mod subscription_plan_model;
pub mod subscription_status;
pub mod vip_status_model;
pub mod vip_tier;
