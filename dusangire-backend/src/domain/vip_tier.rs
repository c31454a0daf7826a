// src/domain/vip_tier.rs

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// VIP階層（累計支出に基づくランク）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VipTier {
    Bronze,
    Silver,
    Gold,
    Platinum,
}

/// 階層ごとの特典
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenefitSet {
    /// ポイント付与倍率（1.0 以上）
    pub bonus_rate: Decimal,
    /// 注文割引率（%）
    pub discount_percent: Decimal,
}

impl BenefitSet {
    /// 昇格時に記録するプロモーション率（bonus_rate * 100 - 100）
    pub fn promotion_percentage(&self) -> Decimal {
        self.bonus_rate * dec!(100) - dec!(100)
    }
}

/// 新規ポイント口座の既定倍率（階層の昇格があるまで適用される）
pub const DEFAULT_BONUS_RATE: Decimal = dec!(1.00);

impl VipTier {
    /// 昇順の全階層
    pub const ALL: [VipTier; 4] = [
        VipTier::Bronze,
        VipTier::Silver,
        VipTier::Gold,
        VipTier::Platinum,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bronze => "bronze",
            Self::Silver => "silver",
            Self::Gold => "gold",
            Self::Platinum => "platinum",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Bronze => "Bronze",
            Self::Silver => "Silver",
            Self::Gold => "Gold",
            Self::Platinum => "Platinum",
        }
    }

    /// 階層に到達するための累計支出（RWF）
    pub fn threshold(&self) -> Decimal {
        match self {
            Self::Bronze => dec!(0),
            Self::Silver => dec!(500000),
            Self::Gold => dec!(2000000),
            Self::Platinum => dec!(5000000),
        }
    }

    pub fn benefits(&self) -> BenefitSet {
        match self {
            Self::Bronze => BenefitSet {
                bonus_rate: dec!(1.02),
                discount_percent: dec!(0),
            },
            Self::Silver => BenefitSet {
                bonus_rate: dec!(1.05),
                discount_percent: dec!(5),
            },
            Self::Gold => BenefitSet {
                bonus_rate: dec!(1.10),
                discount_percent: dec!(10),
            },
            Self::Platinum => BenefitSet {
                bonus_rate: dec!(1.15),
                discount_percent: dec!(15),
            },
        }
    }

    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Bronze => Some(Self::Silver),
            Self::Silver => Some(Self::Gold),
            Self::Gold => Some(Self::Platinum),
            Self::Platinum => None,
        }
    }
}

/// 累計支出から階層と特典を算出する
///
/// 支出額を超えない最大の閾値を選ぶ。閾値ちょうどの場合は上位階層になる。
pub fn compute_tier(lifetime_spend: Decimal) -> (VipTier, BenefitSet) {
    let tier = VipTier::ALL
        .iter()
        .rev()
        .find(|tier| lifetime_spend >= tier.threshold())
        .copied()
        .unwrap_or(VipTier::Bronze);

    (tier, tier.benefits())
}

/// 次の階層までの進捗率（0〜100）
pub fn progress_to_next_tier(lifetime_spend: Decimal) -> u8 {
    let (tier, _) = compute_tier(lifetime_spend);
    match tier.next() {
        Some(next) => progress_towards(lifetime_spend, next.threshold()),
        None => 100,
    }
}

/// 閾値に対する支出の割合（切り捨て、100で頭打ち）
pub fn progress_towards(spend: Decimal, threshold: Decimal) -> u8 {
    if threshold <= Decimal::ZERO {
        return 100;
    }
    (spend / threshold * dec!(100))
        .floor()
        .clamp(dec!(0), dec!(100))
        .to_u8()
        .unwrap_or(100)
}

impl FromStr for VipTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bronze" => Ok(Self::Bronze),
            "silver" => Ok(Self::Silver),
            "gold" => Ok(Self::Gold),
            "platinum" => Ok(Self::Platinum),
            _ => Err(format!("Invalid VIP tier: {}", s)),
        }
    }
}

impl Default for VipTier {
    fn default() -> Self {
        Self::Bronze
    }
}

impl std::fmt::Display for VipTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
