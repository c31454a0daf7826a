// src/repository/mod.rs
pub mod auto_renewal_repository;
pub mod loyalty_points_repository;
pub mod loyalty_transaction_repository;
pub mod notification_repository;
pub mod referral_repository;
pub mod subscription_plan_repository;
pub mod subscription_repository;
pub mod vip_status_repository;
