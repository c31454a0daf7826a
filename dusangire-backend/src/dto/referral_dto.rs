// src/dto/referral_dto.rs

use crate::domain::referral_model;
use crate::utils::validation;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Deserialize, Serialize, Debug, Clone, Validate)]
pub struct ClaimReferralRequest {
    #[validate(custom(function = validation::validate_referral_code))]
    pub referral_code: String,
}

#[derive(Serialize, Debug, Clone)]
pub struct ReferralInviteResponse {
    pub id: Uuid,
    pub referral_code: String,
    pub referral_link: String,
    pub status: String,
    pub referrer_bonus_points: i64,
    pub referee_discount_percent: Decimal,
    pub created_at: DateTime<Utc>,
}

impl From<referral_model::Model> for ReferralInviteResponse {
    fn from(model: referral_model::Model) -> Self {
        Self {
            id: model.id,
            referral_code: model.referral_code,
            referral_link: model.referral_link,
            status: model.status,
            referrer_bonus_points: model.referrer_bonus_points,
            referee_discount_percent: model.referee_discount_percent,
            created_at: model.created_at,
        }
    }
}
