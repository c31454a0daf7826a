// src/service/loyalty_service.rs

use crate::db::DbPool;
use crate::domain::loyalty_points_model::{
    self, points_for_spend, ActiveModel as LoyaltyPointsActiveModel, MINIMUM_REDEMPTION_POINTS,
};
use crate::domain::loyalty_transaction_model::{self, RelatedRef, TransactionType};
use crate::dto::loyalty_dto::{
    LoyaltyStatusResponse, LoyaltyTransactionResponse, TransactionHistoryQuery,
    TransactionHistoryResponse,
};
use crate::error::{AppError, AppResult};
use crate::log_with_context;
use crate::repository::loyalty_points_repository::LoyaltyPointsRepository;
use crate::repository::loyalty_transaction_repository::{
    LoyaltyTransactionRepository, NewLedgerEntry,
};
use crate::repository::vip_status_repository::VipStatusRepository;
use crate::utils::validation::ensure_non_negative;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{ConnectionTrait, Set, TransactionTrait};
use uuid::Uuid;
use validator::Validate;

/// ポイント台帳
///
/// 残高の変更は必ず同じトランザクション内で台帳行を1件追記する。
#[derive(Clone)]
pub struct LoyaltyService {
    db: DbPool,
}

impl LoyaltyService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    /// 支出額に応じたポイントを付与する
    ///
    /// 同じ支払いに対する重複付与の防止は呼び出し側の責任。
    pub async fn award_points(
        &self,
        user_id: Uuid,
        spend_amount: Decimal,
        bonus_rate: Decimal,
        reason: &str,
        related: RelatedRef,
    ) -> AppResult<i64> {
        let txn = self.db.begin().await?;
        let points =
            Self::award_points_in(&txn, user_id, spend_amount, bonus_rate, reason, related)
                .await?;
        txn.commit().await?;
        Ok(points)
    }

    pub(crate) async fn award_points_in<C: ConnectionTrait>(
        db: &C,
        user_id: Uuid,
        spend_amount: Decimal,
        bonus_rate: Decimal,
        reason: &str,
        related: RelatedRef,
    ) -> AppResult<i64> {
        ensure_non_negative("spend_amount", spend_amount)?;
        if bonus_rate < Decimal::ONE {
            return Err(AppError::ValidationError(
                "bonus_rate must be at least 1.0".to_string(),
            ));
        }

        let points = points_for_spend(spend_amount, bonus_rate);
        if points <= 0 {
            return Ok(0);
        }

        Self::credit_in(db, user_id, points, TransactionType::Earn, reason, related).await?;

        log_with_context!(
            tracing::Level::INFO,
            "Loyalty points awarded",
            "user_id" => user_id,
            "points" => points,
            "bonus_rate" => bonus_rate
        );

        Ok(points)
    }

    /// 正のポイントを加算し、台帳に記録する
    pub(crate) async fn credit_in<C: ConnectionTrait>(
        db: &C,
        user_id: Uuid,
        points: i64,
        transaction_type: TransactionType,
        description: &str,
        related: RelatedRef,
    ) -> AppResult<loyalty_transaction_model::Model> {
        if points <= 0 {
            return Err(AppError::ValidationError(
                "Credited points must be positive".to_string(),
            ));
        }

        let account = LoyaltyPointsRepository::get_or_create_for_update(db, user_id).await?;
        let balance_before = account.balance;
        let earned_total = account.earned_total;

        let mut active_model: LoyaltyPointsActiveModel = account.into();
        active_model.balance = Set(balance_before + points);
        active_model.earned_total = Set(earned_total + points);
        LoyaltyPointsRepository::update(db, active_model).await?;

        let entry = LoyaltyTransactionRepository::append(
            db,
            NewLedgerEntry {
                user_id,
                transaction_type,
                points_amount: points,
                description: description.to_string(),
                balance_before,
                related,
            },
        )
        .await?;

        Ok(entry)
    }

    /// 残高からポイントを差し引く
    pub async fn redeem_points(
        &self,
        user_id: Uuid,
        points: i64,
        description: &str,
        related: RelatedRef,
    ) -> AppResult<loyalty_transaction_model::Model> {
        let txn = self.db.begin().await?;
        let entry = Self::redeem_points_in(&txn, user_id, points, description, related).await?;
        txn.commit().await?;
        Ok(entry)
    }

    pub(crate) async fn redeem_points_in<C: ConnectionTrait>(
        db: &C,
        user_id: Uuid,
        points: i64,
        description: &str,
        related: RelatedRef,
    ) -> AppResult<loyalty_transaction_model::Model> {
        if points < MINIMUM_REDEMPTION_POINTS {
            return Err(AppError::ValidationError(format!(
                "Minimum redemption is {} points",
                MINIMUM_REDEMPTION_POINTS
            )));
        }

        Self::debit_in(db, user_id, points, TransactionType::Redeem, description, related).await
    }

    /// 正のポイントを減算する（残高不足なら何も書き込まない）
    async fn debit_in<C: ConnectionTrait>(
        db: &C,
        user_id: Uuid,
        points: i64,
        transaction_type: TransactionType,
        description: &str,
        related: RelatedRef,
    ) -> AppResult<loyalty_transaction_model::Model> {
        let Some(account) = LoyaltyPointsRepository::find_by_user_for_update(db, user_id).await?
        else {
            return Err(AppError::InsufficientBalance {
                requested: points,
                available: 0,
            });
        };

        if points > account.balance {
            log_with_context!(
                tracing::Level::INFO,
                "Redemption rejected for insufficient balance",
                "user_id" => user_id,
                "requested" => points,
                "available" => account.balance
            );
            return Err(AppError::InsufficientBalance {
                requested: points,
                available: account.balance,
            });
        }

        let balance_before = account.balance;
        let redeemed_total = account.redeemed_total;

        let mut active_model: LoyaltyPointsActiveModel = account.into();
        active_model.balance = Set(balance_before - points);
        active_model.redeemed_total = Set(redeemed_total + points);
        LoyaltyPointsRepository::update(db, active_model).await?;

        let entry = LoyaltyTransactionRepository::append(
            db,
            NewLedgerEntry {
                user_id,
                transaction_type,
                points_amount: -points,
                description: description.to_string(),
                balance_before,
                related,
            },
        )
        .await?;

        log_with_context!(
            tracing::Level::INFO,
            "Loyalty points debited",
            "user_id" => user_id,
            "points" => points,
            "transaction_type" => transaction_type.as_str()
        );

        Ok(entry)
    }

    /// 管理者によるポイント調整（負の値は残高を超えられない）
    pub async fn adjust_points(
        &self,
        user_id: Uuid,
        points: i64,
        description: &str,
    ) -> AppResult<loyalty_transaction_model::Model> {
        if points == 0 {
            return Err(AppError::ValidationError(
                "Adjustment must not be zero".to_string(),
            ));
        }

        let txn = self.db.begin().await?;
        let entry = if points > 0 {
            Self::credit_in(
                &txn,
                user_id,
                points,
                TransactionType::Adjustment,
                description,
                RelatedRef::default(),
            )
            .await?
        } else {
            Self::debit_in(
                &txn,
                user_id,
                points.saturating_abs(),
                TransactionType::Adjustment,
                description,
                RelatedRef::default(),
            )
            .await?
        };
        txn.commit().await?;

        Ok(entry)
    }

    /// 指定した支払いに対する台帳行が既にあるか
    pub async fn has_award_for_payment(&self, payment_id: Uuid) -> AppResult<bool> {
        Ok(LoyaltyTransactionRepository::exists_for_payment(&self.db, payment_id).await?)
    }

    pub async fn get_account(&self, user_id: Uuid) -> AppResult<Option<loyalty_points_model::Model>> {
        Ok(LoyaltyPointsRepository::find_by_user(&self.db, user_id).await?)
    }

    /// ポイント口座とVIPレコードを（なければ作成して）まとめて返す
    pub async fn get_status(&self, user_id: Uuid, today: NaiveDate) -> AppResult<LoyaltyStatusResponse> {
        let txn = self.db.begin().await?;
        let account = LoyaltyPointsRepository::get_or_create_for_update(&txn, user_id).await?;
        let vip = VipStatusRepository::get_or_create_for_update(&txn, user_id, today).await?;
        txn.commit().await?;

        let tier = vip.tier();
        Ok(LoyaltyStatusResponse {
            user_id,
            balance: account.balance,
            earned_total: account.earned_total,
            redeemed_total: account.redeemed_total,
            value_in_rwf: account.value_in_rwf(),
            bonus_rate: account.bonus_rate(),
            tier,
            tier_discount_percent: tier.benefits().discount_percent,
            spending_total: vip.spending_total,
            spending_ytd: vip.spending_ytd,
            next_tier_threshold: vip.next_tier_threshold(),
            progress_to_next_tier: vip.progress_to_next_tier(),
        })
    }

    /// 新しい順の取引履歴
    pub async fn transaction_history(
        &self,
        user_id: Uuid,
        query: TransactionHistoryQuery,
    ) -> AppResult<TransactionHistoryResponse> {
        query.validate()?;

        let (items, total) = LoyaltyTransactionRepository::find_by_user_paginated(
            &self.db,
            user_id,
            query.page,
            query.page_size,
        )
        .await?;

        Ok(TransactionHistoryResponse::new(
            items.into_iter().map(LoyaltyTransactionResponse::from).collect(),
            query.page,
            query.page_size,
            total,
        ))
    }
}
