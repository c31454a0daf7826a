// src/infrastructure/payment_gateway.rs

use crate::config::stripe::{StripeConfig, STRIPE_CLIENT};
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use stripe::{
    CreatePaymentIntent, Currency, CustomerId, PaymentIntent, PaymentIntentOffSession,
    PaymentIntentStatus, PaymentMethodId, RequestStrategy,
};
use tracing::{info, warn};

/// 顧客不在での更新課金
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargeRequest {
    pub payment_method_id: String,
    pub customer_id: Option<String>,
    pub amount: Decimal,
    /// 同じキーの再送は二重課金にならない
    pub idempotency_key: String,
}

/// 保存済み支払い方法への課金
///
/// 失敗はすべて `AppError::PaymentChargeFailure` として返す。
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn charge(&self, request: ChargeRequest) -> AppResult<()>;
}

pub struct StripePaymentGateway {
    config: StripeConfig,
}

impl StripePaymentGateway {
    pub fn new(config: StripeConfig) -> Self {
        Self { config }
    }
}

/// Stripe の最小通貨単位に変換する
fn to_minor_units(amount: Decimal, currency: Currency) -> Option<i64> {
    let zero_decimal = matches!(
        currency,
        Currency::RWF | Currency::JPY | Currency::KRW | Currency::UGX | Currency::XAF
    );
    let minor = if zero_decimal {
        amount.round()
    } else {
        (amount * dec!(100)).round()
    };
    minor.to_i64().filter(|value| *value > 0)
}

/// 保存済みの支払い方法を顧客不在で確定させる PaymentIntent を組み立てる
fn renewal_intent_params<'a>(
    request: &ChargeRequest,
    currency: Currency,
) -> AppResult<CreatePaymentIntent<'a>> {
    let minor_units = to_minor_units(request.amount, currency).ok_or_else(|| {
        AppError::PaymentChargeFailure(format!("Invalid charge amount: {}", request.amount))
    })?;

    let payment_method = request
        .payment_method_id
        .parse::<PaymentMethodId>()
        .map_err(|e| AppError::PaymentChargeFailure(format!("Invalid payment method id: {}", e)))?;

    // 顧客に紐づいた支払い方法は Customer の指定が必須
    let customer = request
        .customer_id
        .as_deref()
        .ok_or_else(|| {
            AppError::PaymentChargeFailure("No Stripe customer on file".to_string())
        })?
        .parse::<CustomerId>()
        .map_err(|e| AppError::PaymentChargeFailure(format!("Invalid customer id: {}", e)))?;

    let mut params = CreatePaymentIntent::new(minor_units, currency);
    params.customer = Some(customer);
    params.payment_method = Some(payment_method);
    params.confirm = Some(true);
    params.off_session = Some(PaymentIntentOffSession::Exists(true));
    params.description = Some("Subscription auto-renewal");
    Ok(params)
}

#[async_trait]
impl PaymentGateway for StripePaymentGateway {
    async fn charge(&self, request: ChargeRequest) -> AppResult<()> {
        // 開発モードでは外部呼び出しを行わずに承認する
        if self.config.development_mode {
            info!(
                payment_method_id = %request.payment_method_id,
                amount = %request.amount,
                "Development mode: approving renewal charge without Stripe"
            );
            return Ok(());
        }

        let params = renewal_intent_params(&request, self.config.currency)?;
        let client = STRIPE_CLIENT
            .clone()
            .with_strategy(RequestStrategy::Idempotent(request.idempotency_key.clone()));

        let intent = PaymentIntent::create(&client, params).await.map_err(|e| {
            warn!(
                idempotency_key = %request.idempotency_key,
                error = %e,
                "Stripe payment intent creation failed"
            );
            AppError::PaymentChargeFailure(e.to_string())
        })?;

        match intent.status {
            PaymentIntentStatus::Succeeded => {
                info!(payment_intent_id = %intent.id, "Renewal charge succeeded");
                Ok(())
            }
            other => Err(AppError::PaymentChargeFailure(format!(
                "Payment intent {} ended in status {:?}",
                intent.id, other
            ))),
        }
    }
}
