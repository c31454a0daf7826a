// src/dto/mod.rs

pub mod checkout_dto;
pub mod loyalty_dto;
pub mod referral_dto;
pub mod subscription_dto;
