// src/dto/loyalty_dto.rs

use crate::domain::loyalty_points_model::MINIMUM_REDEMPTION_POINTS;
use crate::domain::loyalty_transaction_model;
use crate::domain::vip_tier::VipTier;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

// --- Request DTOs ---

#[derive(Deserialize, Serialize, Debug, Clone, Validate)]
pub struct RedeemPointsRequest {
    #[validate(range(
        min = MINIMUM_REDEMPTION_POINTS,
        message = "Minimum redemption is 100 points"
    ))]
    pub points: i64,

    pub order_id: Option<Uuid>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Validate)]
pub struct AdjustPointsRequest {
    pub points: i64,

    #[validate(length(min = 1, max = 255, message = "Description must be 1-255 characters"))]
    pub description: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, Validate)]
pub struct TransactionHistoryQuery {
    #[validate(range(min = 1, message = "Page must be 1 or greater"))]
    pub page: u64,

    #[validate(range(min = 1, max = 100, message = "Page size must be between 1 and 100"))]
    pub page_size: u64,
}

impl Default for TransactionHistoryQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 20,
        }
    }
}

// --- Response DTOs ---

#[derive(Serialize, Debug, Clone)]
pub struct LoyaltyStatusResponse {
    pub user_id: Uuid,
    pub balance: i64,
    pub earned_total: i64,
    pub redeemed_total: i64,
    pub value_in_rwf: Decimal,
    pub bonus_rate: Decimal,
    pub tier: VipTier,
    pub tier_discount_percent: Decimal,
    pub spending_total: Decimal,
    pub spending_ytd: Decimal,
    pub next_tier_threshold: Option<Decimal>,
    pub progress_to_next_tier: u8,
}

#[derive(Serialize, Debug, Clone)]
pub struct LoyaltyTransactionResponse {
    pub id: Uuid,
    pub transaction_type: String,
    pub points_amount: i64,
    pub description: String,
    pub balance_before: i64,
    pub balance_after: i64,
    pub related_payment_id: Option<Uuid>,
    pub related_order_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<loyalty_transaction_model::Model> for LoyaltyTransactionResponse {
    fn from(model: loyalty_transaction_model::Model) -> Self {
        Self {
            id: model.id,
            transaction_type: model.transaction_type,
            points_amount: model.points_amount,
            description: model.description,
            balance_before: model.balance_before,
            balance_after: model.balance_after,
            related_payment_id: model.related_payment_id,
            related_order_id: model.related_order_id,
            created_at: model.created_at,
        }
    }
}

#[derive(Serialize, Debug, Clone)]
pub struct TransactionHistoryResponse {
    pub items: Vec<LoyaltyTransactionResponse>,
    pub page: u64,
    pub page_size: u64,
    pub total_items: u64,
    pub total_pages: u64,
}

impl TransactionHistoryResponse {
    pub fn new(
        items: Vec<LoyaltyTransactionResponse>,
        page: u64,
        page_size: u64,
        total_items: u64,
    ) -> Self {
        let total_pages = total_items.div_ceil(page_size.max(1));
        Self {
            items,
            page,
            page_size,
            total_items,
            total_pages,
        }
    }
}
