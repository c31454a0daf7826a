// src/domain/loyalty_transaction_model.rs

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 追記専用のポイント台帳
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "loyalty_transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub user_id: Uuid,

    pub transaction_type: String,

    pub points_amount: i64,

    pub description: String,

    pub balance_before: i64,

    pub balance_after: i64,

    #[sea_orm(nullable)]
    pub related_payment_id: Option<Uuid>,

    #[sea_orm(nullable)]
    pub related_order_id: Option<Uuid>,

    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {
    fn new() -> Self {
        Self {
            // 時刻順の ID で同一時刻の記帳順を保つ
            id: Set(Uuid::now_v7()),
            related_payment_id: Set(None),
            related_order_id: Set(None),
            created_at: Set(Utc::now()),
            ..ActiveModelTrait::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Earn,
    Redeem,
    Bonus,
    Adjustment,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Earn => "earn",
            Self::Redeem => "redeem",
            Self::Bonus => "bonus",
            Self::Adjustment => "adjustment",
        }
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "earn" => Ok(Self::Earn),
            "redeem" => Ok(Self::Redeem),
            "bonus" => Ok(Self::Bonus),
            "adjustment" => Ok(Self::Adjustment),
            _ => Err(format!("Invalid transaction type: {}", s)),
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 関連する支払い・注文への参照
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelatedRef {
    pub payment_id: Option<Uuid>,
    pub order_id: Option<Uuid>,
}

impl RelatedRef {
    pub fn payment(payment_id: Uuid) -> Self {
        Self {
            payment_id: Some(payment_id),
            order_id: None,
        }
    }

    pub fn order(order_id: Uuid) -> Self {
        Self {
            payment_id: None,
            order_id: Some(order_id),
        }
    }
}
