// src/domain/auto_renewal_model.rs

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ConnectionTrait, DbErr, Set};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "subscription_auto_renewals")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(unique)]
    pub subscription_id: Uuid,

    pub auto_renew_enabled: bool,

    pub renewal_date: NaiveDate,

    pub renewal_interval_days: i32,

    #[sea_orm(nullable)]
    pub payment_method_id: Option<String>,

    /// 支払い方法が紐づく Stripe の Customer ID
    #[sea_orm(nullable)]
    pub stripe_customer_id: Option<String>,

    pub failure_count: i32,

    pub max_retries: i32,

    #[sea_orm(nullable)]
    pub next_retry_at: Option<DateTime<Utc>>,

    #[sea_orm(nullable)]
    pub last_renewal_at: Option<DateTime<Utc>>,

    #[sea_orm(nullable)]
    pub last_renewal_status: Option<String>,

    /// 課金済みで延長が未反映の更新日
    #[sea_orm(nullable)]
    pub charged_cycle_date: Option<NaiveDate>,

    /// 処理中のワーカーが設定するリース
    #[sea_orm(nullable)]
    pub claimed_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::subscription_model::Entity",
        from = "Column::SubscriptionId",
        to = "super::subscription_model::Column::Id",
        on_delete = "Cascade"
    )]
    Subscription,
}

impl Related<super::subscription_model::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Subscription.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    fn new() -> Self {
        Self {
            id: Set(Uuid::new_v4()),
            failure_count: Set(0),
            next_retry_at: Set(None),
            last_renewal_at: Set(None),
            last_renewal_status: Set(None),
            charged_cycle_date: Set(None),
            claimed_at: Set(None),
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
    pub fn retries_exhausted(&self) -> bool {
        self.failure_count >= self.max_retries
    }

    /// バックオフ期間中か（日単位で比較）
    pub fn is_backing_off(&self, today: NaiveDate) -> bool {
        self.next_retry_at
            .is_some_and(|retry_at| retry_at.date_naive() > today)
    }

    /// 現在の更新日分の課金が完了しているか
    pub fn is_cycle_charged(&self) -> bool {
        self.charged_cycle_date == Some(self.renewal_date)
    }

    /// 同じ更新日に対する課金要求を重複させないためのキー
    pub fn charge_idempotency_key(&self) -> String {
        format!("renewal-{}-{}", self.id, self.renewal_date)
    }

    pub fn last_status(&self) -> Option<RenewalStatus> {
        self.last_renewal_status
            .as_deref()
            .and_then(|s| s.parse().ok())
    }
}

/// 失敗時の再試行時刻（処理日の翌日 0 時 UTC）
pub fn retry_at_after(today: NaiveDate) -> DateTime<Utc> {
    (today + Duration::days(1)).and_time(NaiveTime::MIN).and_utc()
}

/// 直近の自動更新結果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RenewalStatus {
    Success,
    Failed,
    RetryQueued,
}

impl RenewalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Failed => "FAILED",
            Self::RetryQueued => "RETRY_QUEUED",
        }
    }
}

impl FromStr for RenewalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "SUCCESS" => Ok(Self::Success),
            "FAILED" => Ok(Self::Failed),
            "RETRY_QUEUED" => Ok(Self::RetryQueued),
            _ => Err(format!("Invalid renewal status: {}", s)),
        }
    }
}

impl fmt::Display for RenewalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
