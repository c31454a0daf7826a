// src/domain/pricing.rs

//! 注文金額の割引計算
//!
//! 優先順位は固定:
//! 1. VIP割引と法人割引は大きい方のみ適用（併用不可）
//! 2. 紹介割引は常に加算
//! 3. ポイント交換額を加算
//! 4. 割引合計は小計を超えない
//! 5. 配送料は割引後に加算

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// 割引計算の入力
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PricingInput {
    pub subtotal: Decimal,
    pub vip_discount_percent: Decimal,
    pub corporate_discount_percent: Decimal,
    pub referral_discount_percent: Decimal,
    pub loyalty_points_to_redeem: i64,
    pub loyalty_point_value: Decimal,
    pub delivery_charge: Decimal,
}

/// レシート・請求書向けの割引内訳
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPricing {
    pub subtotal: Decimal,
    pub vip_amount: Decimal,
    pub corporate_amount: Decimal,
    pub referral_amount: Decimal,
    pub loyalty_amount: Decimal,
    pub total_discount: Decimal,
    pub delivery_charge: Decimal,
    pub grand_total: Decimal,
}

impl OrderPricing {
    /// 割引後の小計（配送料を除く）
    pub fn discounted_subtotal(&self) -> Decimal {
        self.subtotal - self.total_discount
    }
}

fn percent_of(amount: Decimal, percent: Decimal) -> Decimal {
    amount * percent / dec!(100)
}

pub fn compute_total(input: PricingInput) -> OrderPricing {
    let subtotal = input.subtotal.max(Decimal::ZERO);

    let mut vip_amount = percent_of(subtotal, input.vip_discount_percent.max(Decimal::ZERO));
    let mut corporate_amount =
        percent_of(subtotal, input.corporate_discount_percent.max(Decimal::ZERO));

    // 同額の場合はVIPを残す
    if corporate_amount > vip_amount {
        vip_amount = Decimal::ZERO;
    } else {
        corporate_amount = Decimal::ZERO;
    }

    let referral_amount =
        percent_of(subtotal, input.referral_discount_percent.max(Decimal::ZERO));
    let loyalty_amount = Decimal::from(input.loyalty_points_to_redeem.max(0))
        * input.loyalty_point_value.max(Decimal::ZERO);

    let total_discount =
        (vip_amount + corporate_amount + referral_amount + loyalty_amount).min(subtotal);
    let delivery_charge = input.delivery_charge.max(Decimal::ZERO);

    OrderPricing {
        subtotal,
        vip_amount,
        corporate_amount,
        referral_amount,
        loyalty_amount,
        total_discount,
        delivery_charge,
        grand_total: subtotal - total_discount + delivery_charge,
    }
}
