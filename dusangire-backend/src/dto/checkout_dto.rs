// src/dto/checkout_dto.rs

use crate::utils::validation;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// チェックアウト見積もりの入力
///
/// 法人会員かどうかは呼び出し側が明示的に渡す。
#[derive(Deserialize, Serialize, Debug, Clone, Validate)]
pub struct CheckoutQuoteRequest {
    #[validate(custom(function = validation::validate_non_negative_amount))]
    pub subtotal: Decimal,

    #[validate(custom(function = validation::validate_percentage))]
    pub corporate_discount_percent: Option<Decimal>,

    #[validate(range(min = 0, message = "Points to redeem must not be negative"))]
    #[serde(default)]
    pub loyalty_points_to_redeem: i64,

    #[validate(custom(function = validation::validate_non_negative_amount))]
    #[serde(default)]
    pub delivery_charge: Decimal,
}
