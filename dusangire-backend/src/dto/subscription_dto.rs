// src/dto/subscription_dto.rs

use crate::domain::subscription_model;
use crate::utils::validation;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

// --- Request DTOs ---

#[derive(Deserialize, Serialize, Debug, Clone, Validate)]
pub struct CreateSubscriptionRequest {
    pub plan_id: Uuid,

    pub start_date: NaiveDate,

    #[serde(default)]
    pub auto_renewal_enabled: bool,

    #[validate(custom(function = validation::validate_payment_method_id))]
    pub payment_method_id: Option<String>,

    #[validate(custom(function = validation::validate_stripe_customer_id))]
    pub stripe_customer_id: Option<String>,

    #[serde(default = "default_true")]
    pub auto_order_enabled: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, Validate)]
pub struct PauseSubscriptionRequest {
    pub paused_until: Option<NaiveDate>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Validate)]
pub struct AutoRenewalSettingsRequest {
    pub enabled: bool,

    #[validate(custom(function = validation::validate_payment_method_id))]
    pub payment_method_id: Option<String>,

    #[validate(custom(function = validation::validate_stripe_customer_id))]
    pub stripe_customer_id: Option<String>,
}

// --- Response DTOs ---

#[derive(Serialize, Debug, Clone)]
pub struct SubscriptionResponse {
    pub id: Uuid,
    pub plan_id: Uuid,
    pub status: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub next_billing_date: Option<NaiveDate>,
    pub paused_until: Option<NaiveDate>,
    pub auto_renewal_enabled: bool,
}

impl From<subscription_model::Model> for SubscriptionResponse {
    fn from(model: subscription_model::Model) -> Self {
        Self {
            id: model.id,
            plan_id: model.plan_id,
            status: model.status,
            start_date: model.start_date,
            end_date: model.end_date,
            next_billing_date: model.next_billing_date,
            paused_until: model.paused_until,
            auto_renewal_enabled: model.auto_renewal_enabled,
        }
    }
}

/// 日次更新バッチの結果
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenewalRunSummary {
    pub processed: u32,
    pub success: u32,
    pub failed: u32,
    pub retried: u32,
    /// 締め切りを過ぎて次回に持ち越した件数
    pub deferred: u32,
    /// 他のワーカーが処理中だった件数
    pub skipped: u32,
}
