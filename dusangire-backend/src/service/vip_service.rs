// src/service/vip_service.rs

use crate::db::DbPool;
use crate::domain::loyalty_points_model::ActiveModel as LoyaltyPointsActiveModel;
use crate::domain::vip_status_model::{self, ActiveModel as VipStatusActiveModel};
use crate::domain::vip_tier::{compute_tier, VipTier};
use crate::error::AppResult;
use crate::log_with_context;
use crate::repository::loyalty_points_repository::LoyaltyPointsRepository;
use crate::repository::vip_status_repository::VipStatusRepository;
use crate::utils::validation::ensure_non_negative;
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use sea_orm::{ConnectionTrait, Set, TransactionTrait};
use serde::Serialize;
use uuid::Uuid;

/// 支出記録後の階層
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TierChange {
    pub previous: VipTier,
    pub current: VipTier,
    /// 以後のポイント付与に使う倍率
    pub bonus_rate: Decimal,
}

impl TierChange {
    pub fn promoted(&self) -> bool {
        self.current > self.previous
    }
}

#[derive(Clone)]
pub struct VipService {
    db: DbPool,
}

impl VipService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    pub async fn record_spending(
        &self,
        user_id: Uuid,
        amount: Decimal,
        today: NaiveDate,
    ) -> AppResult<TierChange> {
        let txn = self.db.begin().await?;
        let change = Self::record_spending_in(&txn, user_id, amount, today).await?;
        txn.commit().await?;
        Ok(change)
    }

    /// 累計支出を加算し、階層を再計算する
    ///
    /// 階層は上がる方向にのみ変化する。昇格時はポイント倍率も同じトランザクションで更新する。
    pub(crate) async fn record_spending_in<C: ConnectionTrait>(
        db: &C,
        user_id: Uuid,
        amount: Decimal,
        today: NaiveDate,
    ) -> AppResult<TierChange> {
        ensure_non_negative("amount", amount)?;

        let vip = VipStatusRepository::get_or_create_for_update(db, user_id, today).await?;
        let account = LoyaltyPointsRepository::get_or_create_for_update(db, user_id).await?;

        let previous = vip.tier();
        let spending_total = vip.spending_total + amount;
        let spending_ytd = if vip.ytd_year == today.year() {
            vip.spending_ytd + amount
        } else {
            amount
        };

        let (computed, benefits) = compute_tier(spending_total);
        let current = previous.max(computed);

        let mut active_model: VipStatusActiveModel = vip.into();
        active_model.spending_total = Set(spending_total);
        active_model.spending_ytd = Set(spending_ytd);
        active_model.ytd_year = Set(today.year());

        let mut bonus_rate = account.bonus_rate();

        if current > previous {
            active_model.tier_level = Set(current.as_str().to_string());
            active_model.achieved_at = Set(today);
            active_model.promotion_percentage = Set(benefits.promotion_percentage());

            bonus_rate = benefits.bonus_rate;
            let mut points_model: LoyaltyPointsActiveModel = account.into();
            points_model.subscription_bonus_rate = Set(bonus_rate);
            LoyaltyPointsRepository::update(db, points_model).await?;

            log_with_context!(
                tracing::Level::INFO,
                "VIP tier promoted",
                "user_id" => user_id,
                "from" => previous.as_str(),
                "to" => current.as_str(),
                "spending_total" => spending_total
            );
        }

        VipStatusRepository::update(db, active_model).await?;

        Ok(TierChange {
            previous,
            current,
            bonus_rate,
        })
    }

    pub async fn get_vip_status(&self, user_id: Uuid) -> AppResult<Option<vip_status_model::Model>> {
        Ok(VipStatusRepository::find_by_user(&self.db, user_id).await?)
    }

    /// 現在の階層の注文割引率（レコードがなければブロンズ扱い）
    pub(crate) async fn discount_percent_in<C: ConnectionTrait>(
        db: &C,
        user_id: Uuid,
    ) -> AppResult<Decimal> {
        let tier = VipStatusRepository::find_by_user(db, user_id)
            .await?
            .map(|vip| vip.tier())
            .unwrap_or_default();
        Ok(tier.benefits().discount_percent)
    }
}
