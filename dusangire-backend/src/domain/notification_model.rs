// src/domain/notification_model.rs

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notifications")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub user_id: Uuid,

    pub notification_type: String,

    pub title: String,

    #[sea_orm(column_type = "Text")]
    pub message: String,

    pub is_read: bool,

    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {
    fn new() -> Self {
        Self {
            id: Set(Uuid::new_v4()),
            notification_type: Set(NotificationKind::System.as_str().to_string()),
            is_read: Set(false),
            created_at: Set(Utc::now()),
            ..ActiveModelTrait::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    System,
    Subscription,
    Loyalty,
    Payment,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::Subscription => "subscription",
            Self::Loyalty => "loyalty",
            Self::Payment => "payment",
        }
    }
}
