// src/domain/loyalty_points_model.rs

use super::vip_tier::DEFAULT_BONUS_RATE;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::{ConnectionTrait, DbErr, Set};
use serde::{Deserialize, Serialize};

/// 1ポイントあたりの価値（RWF）
pub const POINT_VALUE_RWF: i64 = 100;

/// 一度に交換できる最小ポイント
pub const MINIMUM_REDEMPTION_POINTS: i64 = 100;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "loyalty_points")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(unique)]
    pub user_id: Uuid,

    pub balance: i64,

    pub earned_total: i64,

    pub redeemed_total: i64,

    #[sea_orm(column_type = "Decimal(Some((5, 2)))")]
    pub subscription_bonus_rate: Decimal,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    fn new() -> Self {
        Self {
            id: Set(Uuid::new_v4()),
            balance: Set(0),
            earned_total: Set(0),
            redeemed_total: Set(0),
            subscription_bonus_rate: Set(DEFAULT_BONUS_RATE),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
            ..ActiveModelTrait::default()
        }
    }

    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if !insert {
            self.updated_at = Set(Utc::now());
        }
        Ok(self)
    }
}

impl Model {
    /// 倍率は小数第2位までの値として扱う
    pub fn bonus_rate(&self) -> Decimal {
        self.subscription_bonus_rate.round_dp(2)
    }

    pub fn value_in_rwf(&self) -> Decimal {
        Decimal::from(self.balance) * Decimal::from(POINT_VALUE_RWF)
    }

    pub fn is_consistent(&self) -> bool {
        self.balance >= 0 && self.balance == self.earned_total - self.redeemed_total
    }
}

/// 支出額とボーナス倍率から付与ポイントを算出する（切り捨て）
pub fn points_for_spend(spend_amount: Decimal, bonus_rate: Decimal) -> i64 {
    use rust_decimal::prelude::ToPrimitive;

    if spend_amount <= Decimal::ZERO {
        return 0;
    }
    (spend_amount / Decimal::from(POINT_VALUE_RWF) * bonus_rate)
        .floor()
        .to_i64()
        .unwrap_or(0)
        .max(0)
}
