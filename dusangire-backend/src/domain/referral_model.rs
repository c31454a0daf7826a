// src/domain/referral_model.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::{ConnectionTrait, DbErr, Set};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "referral_programs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub referrer_id: Uuid,

    /// 招待が使われるまでは None
    #[sea_orm(nullable)]
    pub referee_id: Option<Uuid>,

    #[sea_orm(unique)]
    pub referral_code: String,

    pub referral_link: String,

    pub status: String,

    pub referrer_bonus_points: i64,

    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub referrer_bonus_rwf: Decimal,

    #[sea_orm(column_type = "Decimal(Some((5, 2)))")]
    pub referee_discount_percent: Decimal,

    #[sea_orm(nullable)]
    pub claimed_at: Option<DateTime<Utc>>,

    #[sea_orm(nullable)]
    pub completed_at: Option<DateTime<Utc>>,

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
            referee_id: Set(None),
            status: Set(ReferralStatus::Pending.as_str().to_string()),
            claimed_at: Set(None),
            completed_at: Set(None),
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
    pub fn status(&self) -> Option<ReferralStatus> {
        self.status.parse().ok()
    }

    pub fn is_pending(&self) -> bool {
        self.status() == Some(ReferralStatus::Pending)
    }

    pub fn referee_discount(&self) -> Decimal {
        self.referee_discount_percent.round_dp(2)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferralStatus {
    Pending,
    Completed,
    Expired,
    Cancelled,
}

impl ReferralStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Expired => "expired",
            Self::Cancelled => "cancelled",
        }
    }
}

impl FromStr for ReferralStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "expired" => Ok(Self::Expired),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("Invalid referral status: {}", s)),
        }
    }
}

impl fmt::Display for ReferralStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
