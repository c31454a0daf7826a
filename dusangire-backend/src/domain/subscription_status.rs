// src/domain/subscription_status.rs

use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// サブスクリプションの状態
///
/// 初期状態は `Active`。`Cancelled` と `Expired` は終端状態。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Active,
    Paused,
    Cancelled,
    Expired,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Cancelled => "cancelled",
            Self::Expired => "expired",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Expired)
    }

    pub fn pause(self) -> AppResult<Self> {
        match self {
            Self::Active => Ok(Self::Paused),
            other => Err(invalid_transition("pause", other)),
        }
    }

    pub fn resume(self) -> AppResult<Self> {
        match self {
            Self::Paused => Ok(Self::Active),
            other => Err(invalid_transition("resume", other)),
        }
    }

    /// 終端状態以外からキャンセル可能
    pub fn cancel(self) -> AppResult<Self> {
        if self.is_terminal() {
            return Err(invalid_transition("cancel", self));
        }
        Ok(Self::Cancelled)
    }

    /// 更新はアクティブな契約のみ（状態自体は変わらない）
    pub fn renew(self) -> AppResult<Self> {
        match self {
            Self::Active => Ok(Self::Active),
            other => Err(invalid_transition("renew", other)),
        }
    }

    pub fn expire(self) -> AppResult<Self> {
        match self {
            Self::Active => Ok(Self::Expired),
            other => Err(invalid_transition("expire", other)),
        }
    }
}

fn invalid_transition(operation: &str, from: SubscriptionStatus) -> AppError {
    AppError::InvalidState(format!(
        "Cannot {} a subscription that is {}",
        operation, from
    ))
}

impl FromStr for SubscriptionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "paused" => Ok(Self::Paused),
            "cancelled" => Ok(Self::Cancelled),
            "expired" => Ok(Self::Expired),
            _ => Err(format!("Invalid subscription status: {}", s)),
        }
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
