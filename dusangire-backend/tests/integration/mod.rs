// tests/integration/mod.rs

pub mod checkout_tests;
pub mod loyalty_tests;
pub mod payment_event_tests;
pub mod referral_tests;
pub mod vip_tests;
