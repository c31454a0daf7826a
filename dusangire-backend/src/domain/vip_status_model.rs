// src/domain/vip_status_model.rs

use super::vip_tier::{progress_towards, VipTier};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::{ConnectionTrait, DbErr, Set};
use serde::{Deserialize, Serialize};

/// ユーザーごとのVIPステータス
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vip_tiers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(unique)]
    pub user_id: Uuid,

    pub tier_level: String,

    #[sea_orm(column_type = "Decimal(Some((16, 2)))")]
    pub spending_total: Decimal,

    #[sea_orm(column_type = "Decimal(Some((16, 2)))")]
    pub spending_ytd: Decimal,

    /// `spending_ytd` が対象とする暦年
    pub ytd_year: i32,

    #[sea_orm(column_type = "Decimal(Some((5, 2)))")]
    pub promotion_percentage: Decimal,

    pub achieved_at: NaiveDate,

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
            tier_level: Set(VipTier::Bronze.as_str().to_string()),
            spending_total: Set(Decimal::ZERO),
            spending_ytd: Set(Decimal::ZERO),
            promotion_percentage: Set(Decimal::ZERO),
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
    pub fn tier(&self) -> VipTier {
        self.tier_level.parse().unwrap_or_default()
    }

    /// 次の階層の閾値（最上位の場合は None）
    pub fn next_tier_threshold(&self) -> Option<Decimal> {
        self.tier().next().map(|tier| tier.threshold())
    }

    pub fn progress_to_next_tier(&self) -> u8 {
        match self.next_tier_threshold() {
            Some(threshold) => progress_towards(self.spending_total, threshold),
            None => 100,
        }
    }
}
