// src/service/checkout_service.rs

use crate::db::DbPool;
use crate::domain::loyalty_points_model::{MINIMUM_REDEMPTION_POINTS, POINT_VALUE_RWF};
use crate::domain::loyalty_transaction_model::{self, RelatedRef};
use crate::domain::pricing::{compute_total, OrderPricing, PricingInput};
use crate::dto::checkout_dto::CheckoutQuoteRequest;
use crate::error::AppResult;
use crate::repository::loyalty_points_repository::LoyaltyPointsRepository;
use crate::service::loyalty_service::LoyaltyService;
use crate::service::referral_service::ReferralService;
use crate::service::vip_service::VipService;
use rust_decimal::Decimal;
use sea_orm::TransactionTrait;
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;
use validator::Validate;

/// 見積もり結果
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutQuote {
    pub pricing: OrderPricing,
    pub vip_discount_percent: Decimal,
    pub referral_discount_percent: Decimal,
    /// 実際に価格へ反映したポイント数
    pub loyalty_points_applied: i64,
}

#[derive(Clone)]
pub struct CheckoutService {
    db: DbPool,
}

impl CheckoutService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    /// ユーザーの特典を集めて注文金額を見積もる
    pub async fn quote_checkout(
        &self,
        user_id: Uuid,
        request: CheckoutQuoteRequest,
    ) -> AppResult<CheckoutQuote> {
        request.validate()?;

        let vip_discount_percent = VipService::discount_percent_in(&self.db, user_id).await?;
        let referral_discount_percent =
            ReferralService::pending_referee_discount_in(&self.db, user_id)
                .await?
                .unwrap_or(Decimal::ZERO);

        let requested = request.loyalty_points_to_redeem;
        let loyalty_points_applied = if requested >= MINIMUM_REDEMPTION_POINTS {
            let balance = LoyaltyPointsRepository::find_by_user(&self.db, user_id)
                .await?
                .map_or(0, |account| account.balance);
            if balance >= requested {
                requested
            } else {
                debug!(
                    user_id = %user_id,
                    requested,
                    balance,
                    "Loyalty points not applied to quote: insufficient balance"
                );
                0
            }
        } else {
            0
        };

        let pricing = compute_total(PricingInput {
            subtotal: request.subtotal,
            vip_discount_percent,
            corporate_discount_percent: request.corporate_discount_percent.unwrap_or_default(),
            referral_discount_percent,
            loyalty_points_to_redeem: loyalty_points_applied,
            loyalty_point_value: Decimal::from(POINT_VALUE_RWF),
            delivery_charge: request.delivery_charge,
        });

        Ok(CheckoutQuote {
            pricing,
            vip_discount_percent,
            referral_discount_percent,
            loyalty_points_applied,
        })
    }

    /// 注文確定時にポイントを交換する
    pub async fn place_order_redemption(
        &self,
        user_id: Uuid,
        points: i64,
        order_id: Uuid,
    ) -> AppResult<loyalty_transaction_model::Model> {
        let txn = self.db.begin().await?;
        let entry = LoyaltyService::redeem_points_in(
            &txn,
            user_id,
            points,
            &format!("Redeemed for order {}", order_id),
            RelatedRef::order(order_id),
        )
        .await?;
        txn.commit().await?;
        Ok(entry)
    }
}
