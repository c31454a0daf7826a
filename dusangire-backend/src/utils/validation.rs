// src/utils/validation.rs

use crate::error::{AppError, AppResult};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::borrow::Cow;
use validator::ValidationError;

/// 紹介コード用正規表現（英大文字と数字の8桁）
pub static REFERRAL_CODE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z0-9]{8}$").unwrap());

/// Stripe の PaymentMethod ID（pm_ で始まる）
pub static PAYMENT_METHOD_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^pm_[A-Za-z0-9_]+$").unwrap());

pub static STRIPE_CUSTOMER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^cus_[A-Za-z0-9]+$").unwrap());

fn error_with_message(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

/// 紹介コードバリデーション
pub fn validate_referral_code(code: &str) -> Result<(), ValidationError> {
    if REFERRAL_CODE_REGEX.is_match(code) {
        Ok(())
    } else {
        Err(error_with_message(
            "invalid_referral_code",
            "Referral code must be 8 uppercase letters or digits",
        ))
    }
}

pub fn validate_payment_method_id(id: &str) -> Result<(), ValidationError> {
    if PAYMENT_METHOD_REGEX.is_match(id) {
        Ok(())
    } else {
        Err(error_with_message(
            "invalid_payment_method",
            "Payment method id must look like pm_xxx",
        ))
    }
}

pub fn validate_stripe_customer_id(id: &str) -> Result<(), ValidationError> {
    if STRIPE_CUSTOMER_REGEX.is_match(id) {
        Ok(())
    } else {
        Err(error_with_message(
            "invalid_stripe_customer",
            "Stripe customer id must look like cus_xxx",
        ))
    }
}

/// 0〜100 の割引率
pub fn validate_percentage(value: &Decimal) -> Result<(), ValidationError> {
    if *value >= dec!(0) && *value <= dec!(100) {
        Ok(())
    } else {
        Err(error_with_message(
            "invalid_percentage",
            "Percentage must be between 0 and 100",
        ))
    }
}

pub fn validate_non_negative_amount(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        Err(error_with_message(
            "negative_amount",
            "Amount must not be negative",
        ))
    } else {
        Ok(())
    }
}

/// サービス層で金額が負でないことを確認する
pub fn ensure_non_negative(field: &str, value: Decimal) -> AppResult<()> {
    if value < Decimal::ZERO {
        return Err(AppError::ValidationError(format!(
            "{} must not be negative",
            field
        )));
    }
    Ok(())
}
