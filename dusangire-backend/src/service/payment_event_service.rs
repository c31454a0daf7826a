// src/service/payment_event_service.rs

use crate::db::DbPool;
use crate::domain::loyalty_transaction_model::RelatedRef;
use crate::domain::notification_model::NotificationKind;
use crate::error::AppResult;
use crate::infrastructure::notification::Notifier;
use crate::log_with_context;
use crate::repository::loyalty_points_repository::LoyaltyPointsRepository;
use crate::repository::loyalty_transaction_repository::LoyaltyTransactionRepository;
use crate::service::loyalty_service::LoyaltyService;
use crate::service::referral_service::{ReferralOutcome, ReferralService};
use crate::service::vip_service::{TierChange, VipService};
use crate::utils::validation::ensure_non_negative;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::TransactionTrait;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

/// 決済完了イベント
#[derive(Debug, Clone)]
pub struct PaymentCompleted {
    pub user_id: Uuid,
    pub payment_id: Uuid,
    pub amount: Decimal,
    pub description: String,
    /// このユーザーの完了済み支払い件数（今回を含む）
    pub completed_payment_count: u32,
    pub occurred_on: NaiveDate,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentCompletedOutcome {
    /// 同じ支払いを既に処理済みだった
    pub already_processed: bool,
    pub tier: Option<TierChange>,
    pub points_awarded: i64,
    pub referral: Option<ReferralOutcome>,
}

impl PaymentCompletedOutcome {
    fn duplicate() -> Self {
        Self {
            already_processed: true,
            tier: None,
            points_awarded: 0,
            referral: None,
        }
    }
}

/// 決済完了時の処理を明示的な順序で実行する
///
/// 支出記録と階層再計算 → 更新後の倍率でポイント付与 → 初回支払いなら紹介完了。
/// すべて1つのトランザクションで行う。
#[derive(Clone)]
pub struct PaymentEventService {
    db: DbPool,
    notifier: Arc<dyn Notifier>,
}

impl PaymentEventService {
    pub fn new(db: DbPool, notifier: Arc<dyn Notifier>) -> Self {
        Self { db, notifier }
    }

    pub async fn handle_payment_completed(
        &self,
        event: PaymentCompleted,
    ) -> AppResult<PaymentCompletedOutcome> {
        ensure_non_negative("amount", event.amount)?;

        let txn = self.db.begin().await?;

        // ポイント口座をロックしてから重複を確認する
        LoyaltyPointsRepository::get_or_create_for_update(&txn, event.user_id).await?;
        if LoyaltyTransactionRepository::exists_for_payment(&txn, event.payment_id).await? {
            txn.rollback().await?;
            log_with_context!(
                tracing::Level::INFO,
                "Payment already processed, skipping",
                "payment_id" => event.payment_id,
                "user_id" => event.user_id
            );
            return Ok(PaymentCompletedOutcome::duplicate());
        }

        let tier =
            VipService::record_spending_in(&txn, event.user_id, event.amount, event.occurred_on)
                .await?;

        let points_awarded = LoyaltyService::award_points_in(
            &txn,
            event.user_id,
            event.amount,
            tier.bonus_rate,
            &event.description,
            RelatedRef::payment(event.payment_id),
        )
        .await?;

        let referral = if event.completed_payment_count == 1 {
            Some(ReferralService::complete_referral_in(&txn, event.user_id).await?)
        } else {
            None
        };

        txn.commit().await?;

        if tier.promoted() {
            self.notifier
                .notify(
                    event.user_id,
                    NotificationKind::Loyalty,
                    "VIP Tier Upgraded",
                    &format!(
                        "Congratulations! You are now {} and earn points at {}x.",
                        tier.current.display_name(),
                        tier.bonus_rate
                    ),
                )
                .await;
        }

        if points_awarded > 0 {
            self.notifier
                .notify(
                    event.user_id,
                    NotificationKind::Loyalty,
                    "Points Earned",
                    &format!("You earned {} loyalty points.", points_awarded),
                )
                .await;
        }

        if let Some(ReferralOutcome::Completed {
            referrer_id,
            bonus_points,
            ..
        }) = &referral
        {
            self.notifier
                .notify(
                    *referrer_id,
                    NotificationKind::Loyalty,
                    "Referral Bonus",
                    &format!(
                        "Your referral completed their first payment. You earned {} points.",
                        bonus_points
                    ),
                )
                .await;
        }

        Ok(PaymentCompletedOutcome {
            already_processed: false,
            tier: Some(tier),
            points_awarded,
            referral,
        })
    }
}
