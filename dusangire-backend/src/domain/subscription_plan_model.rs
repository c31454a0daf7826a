// src/domain/subscription_plan_model.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "subscription_plans")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(unique)]
    pub name: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    pub plan_type: String,

    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub price: Decimal,

    pub meals_per_cycle: i32,

    pub duration_days: i32,

    #[sea_orm(column_type = "Decimal(Some((5, 2)))")]
    pub discount_percentage: Decimal,

    pub is_active: bool,

    pub subscribers_count: i32,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::subscription_model::Entity")]
    Subscriptions,
}

impl Related<super::subscription_model::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Subscriptions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {
    fn new() -> Self {
        Self {
            id: Set(Uuid::new_v4()),
            is_active: Set(true),
            subscribers_count: Set(0),
            discount_percentage: Set(dec!(0)),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
            ..ActiveModelTrait::default()
        }
    }
}

/// 食事配送の周期
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanType {
    Daily,
    Weekly,
    Monthly,
}

impl PlanType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }

    /// 1周期あたりの日数
    pub fn cycle_days(&self) -> i32 {
        match self {
            Self::Daily => 1,
            Self::Weekly => 7,
            Self::Monthly => 30,
        }
    }
}

impl FromStr for PlanType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            _ => Err(format!("Invalid plan type: {}", s)),
        }
    }
}

impl Model {
    pub fn plan_type(&self) -> PlanType {
        // 不正な値は最も短い周期として扱う
        self.plan_type.parse().unwrap_or(PlanType::Daily)
    }

    pub fn cycle_days(&self) -> i32 {
        self.plan_type().cycle_days()
    }

    /// プラン期間中に提供される食事の総数
    pub fn total_meals(&self) -> i32 {
        (self.duration_days / self.cycle_days()) * self.meals_per_cycle
    }

    pub fn price_per_meal(&self) -> Decimal {
        let meals = self.total_meals();
        if meals <= 0 {
            return self.price;
        }
        (self.price / Decimal::from(meals)).round_dp(2)
    }

    /// プラン自体の割引を適用した価格
    pub fn discounted_price(&self) -> Decimal {
        let discount = self.price * self.discount_percentage / dec!(100);
        (self.price - discount).max(dec!(0)).round_dp(2)
    }
}
