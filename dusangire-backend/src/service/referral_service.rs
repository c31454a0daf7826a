// src/service/referral_service.rs

use crate::config::{AppConfig, LoyaltyConfig};
use crate::db::DbPool;
use crate::domain::loyalty_transaction_model::{RelatedRef, TransactionType};
use crate::domain::referral_model::{self, ActiveModel as ReferralActiveModel, ReferralStatus};
use crate::dto::referral_dto::ClaimReferralRequest;
use crate::error::{AppError, AppResult};
use crate::log_with_context;
use crate::repository::referral_repository::ReferralRepository;
use crate::service::loyalty_service::LoyaltyService;
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelBehavior, ConnectionTrait, Set, TransactionTrait};
use serde::Serialize;
use uuid::Uuid;
use validator::Validate;

const MAX_CODE_ATTEMPTS: usize = 5;

/// 紹介完了処理の結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ReferralOutcome {
    Completed {
        referral_id: Uuid,
        referrer_id: Uuid,
        bonus_points: i64,
    },
    /// 保留中の紹介がなかった（正常系）
    NoPendingReferral,
}

#[derive(Clone)]
pub struct ReferralService {
    db: DbPool,
    loyalty: LoyaltyConfig,
    frontend_url: String,
}

/// uuid 由来の8桁大文字コード
fn generate_code() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_uppercase()
}

impl ReferralService {
    pub fn new(db: DbPool, config: &AppConfig) -> Self {
        Self {
            db,
            loyalty: config.loyalty.clone(),
            frontend_url: config.frontend_url.trim_end_matches('/').to_string(),
        }
    }

    fn referral_link(&self, code: &str) -> String {
        format!("{}/accounts/signup?ref={}", self.frontend_url, code)
    }

    /// 招待リンクを発行する
    pub async fn create_invite(&self, referrer_id: Uuid) -> AppResult<referral_model::Model> {
        for _ in 0..MAX_CODE_ATTEMPTS {
            let code = generate_code();
            if ReferralRepository::code_exists(&self.db, &code).await? {
                continue;
            }

            let mut active_model = ReferralActiveModel::new();
            active_model.referrer_id = Set(referrer_id);
            active_model.referral_link = Set(self.referral_link(&code));
            active_model.referral_code = Set(code);
            active_model.referrer_bonus_points = Set(self.loyalty.referrer_bonus_points);
            active_model.referrer_bonus_rwf = Set(self.loyalty.referrer_bonus_rwf);
            active_model.referee_discount_percent = Set(self.loyalty.referee_discount_percent);

            let referral = ReferralRepository::insert(&self.db, active_model).await?;

            log_with_context!(
                tracing::Level::INFO,
                "Referral invite created",
                "referrer_id" => referrer_id,
                "referral_code" => &referral.referral_code
            );
            return Ok(referral);
        }

        Err(AppError::Conflict(
            "Could not generate a unique referral code".to_string(),
        ))
    }

    /// 被紹介者を招待に紐付ける
    pub async fn claim_referral(
        &self,
        referee_id: Uuid,
        request: ClaimReferralRequest,
    ) -> AppResult<referral_model::Model> {
        request.validate()?;

        let txn = self.db.begin().await?;

        let referral = ReferralRepository::find_by_code_for_update(&txn, &request.referral_code)
            .await?
            .ok_or_else(|| AppError::NotFound("Referral code not found".to_string()))?;

        if referral.referrer_id == referee_id {
            return Err(AppError::ValidationError(
                "You cannot use your own referral code".to_string(),
            ));
        }
        if !referral.is_pending() || referral.referee_id.is_some() {
            return Err(AppError::Conflict(
                "Referral code has already been used".to_string(),
            ));
        }
        if ReferralRepository::find_pending_by_referee(&txn, referee_id)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(
                "User already has a pending referral".to_string(),
            ));
        }

        let mut active_model: ReferralActiveModel = referral.into();
        active_model.referee_id = Set(Some(referee_id));
        active_model.claimed_at = Set(Some(Utc::now()));
        let referral = ReferralRepository::update(&txn, active_model).await?;

        txn.commit().await?;
        Ok(referral)
    }

    /// 被紹介者の初回支払い時に紹介を完了し、紹介者にボーナスを付与する
    pub async fn complete_referral(&self, referee_id: Uuid) -> AppResult<ReferralOutcome> {
        let txn = self.db.begin().await?;
        let outcome = Self::complete_referral_in(&txn, referee_id).await?;
        txn.commit().await?;
        Ok(outcome)
    }

    pub(crate) async fn complete_referral_in<C: ConnectionTrait>(
        db: &C,
        referee_id: Uuid,
    ) -> AppResult<ReferralOutcome> {
        let Some(referral) =
            ReferralRepository::find_pending_by_referee_for_update(db, referee_id).await?
        else {
            log_with_context!(
                tracing::Level::DEBUG,
                "No pending referral to complete",
                "referee_id" => referee_id
            );
            return Ok(ReferralOutcome::NoPendingReferral);
        };

        let referral_id = referral.id;
        let referrer_id = referral.referrer_id;
        let bonus_points = referral.referrer_bonus_points;

        if bonus_points > 0 {
            LoyaltyService::credit_in(
                db,
                referrer_id,
                bonus_points,
                TransactionType::Bonus,
                "Referral bonus",
                RelatedRef::default(),
            )
            .await?;
        }

        let mut active_model: ReferralActiveModel = referral.into();
        active_model.status = Set(ReferralStatus::Completed.as_str().to_string());
        active_model.completed_at = Set(Some(Utc::now()));
        ReferralRepository::update(db, active_model).await?;

        log_with_context!(
            tracing::Level::INFO,
            "Referral completed",
            "referral_id" => referral_id,
            "referrer_id" => referrer_id,
            "referee_id" => referee_id,
            "bonus_points" => bonus_points
        );

        Ok(ReferralOutcome::Completed {
            referral_id,
            referrer_id,
            bonus_points,
        })
    }

    /// 保留中の紹介を必須とする呼び出し向け
    pub async fn require_pending_referral(
        &self,
        referee_id: Uuid,
    ) -> AppResult<referral_model::Model> {
        ReferralRepository::find_pending_by_referee(&self.db, referee_id)
            .await?
            .ok_or(AppError::NoPendingReferral)
    }

    pub async fn pending_referee_discount(&self, referee_id: Uuid) -> AppResult<Option<Decimal>> {
        Self::pending_referee_discount_in(&self.db, referee_id).await
    }

    pub(crate) async fn pending_referee_discount_in<C: ConnectionTrait>(
        db: &C,
        referee_id: Uuid,
    ) -> AppResult<Option<Decimal>> {
        Ok(ReferralRepository::find_pending_by_referee(db, referee_id)
            .await?
            .map(|referral| referral.referee_discount()))
    }

    pub async fn cancel_referral(&self, referral_id: Uuid) -> AppResult<referral_model::Model> {
        let txn = self.db.begin().await?;

        let referral = ReferralRepository::find_by_id_for_update(&txn, referral_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Referral not found".to_string()))?;

        if !referral.is_pending() {
            return Err(AppError::InvalidState(format!(
                "Cannot cancel a referral that is {}",
                referral.status
            )));
        }

        let mut active_model: ReferralActiveModel = referral.into();
        active_model.status = Set(ReferralStatus::Cancelled.as_str().to_string());
        let referral = ReferralRepository::update(&txn, active_model).await?;

        txn.commit().await?;
        Ok(referral)
    }

    pub async fn referrals_for(&self, referrer_id: Uuid) -> AppResult<Vec<referral_model::Model>> {
        Ok(ReferralRepository::find_by_referrer(&self.db, referrer_id).await?)
    }
}
