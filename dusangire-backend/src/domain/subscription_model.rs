// src/domain/subscription_model.rs

use super::subscription_status::SubscriptionStatus;
use crate::error::{AppError, AppResult};
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ConnectionTrait, DbErr, Set};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "subscriptions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub user_id: Uuid,

    pub plan_id: Uuid,

    pub status: String,

    pub start_date: NaiveDate,

    pub end_date: NaiveDate,

    #[sea_orm(nullable)]
    pub next_billing_date: Option<NaiveDate>,

    #[sea_orm(nullable)]
    pub paused_until: Option<NaiveDate>,

    pub auto_order_enabled: bool,

    pub auto_renewal_enabled: bool,

    #[sea_orm(nullable)]
    pub cancelled_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::subscription_plan_model::Entity",
        from = "Column::PlanId",
        to = "super::subscription_plan_model::Column::Id"
    )]
    Plan,
    #[sea_orm(has_one = "super::auto_renewal_model::Entity")]
    AutoRenewal,
}

impl Related<super::subscription_plan_model::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Plan.def()
    }
}

impl Related<super::auto_renewal_model::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AutoRenewal.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    fn new() -> Self {
        Self {
            id: Set(Uuid::new_v4()),
            status: Set(SubscriptionStatus::Active.as_str().to_string()),
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
    /// 永続化されたステータス文字列を列挙型に変換
    pub fn status(&self) -> AppResult<SubscriptionStatus> {
        self.status
            .parse()
            .map_err(|e: String| AppError::InternalServerError(e))
    }

    pub fn is_active(&self) -> bool {
        matches!(self.status(), Ok(SubscriptionStatus::Active))
    }

    /// 残り日数（期限切れの場合は0）
    pub fn days_remaining(&self, today: NaiveDate) -> i64 {
        (self.end_date - today).num_days().max(0)
    }
}
