// src/repository/referral_repository.rs

use crate::domain::referral_model::{
    self, ActiveModel as ReferralActiveModel, Entity as ReferralEntity, ReferralStatus,
};
use sea_orm::entity::*;
use sea_orm::{ConnectionTrait, DbErr, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect};
use uuid::Uuid;

pub struct ReferralRepository;

impl ReferralRepository {
    pub async fn find_by_id_for_update<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
    ) -> Result<Option<referral_model::Model>, DbErr> {
        ReferralEntity::find_by_id(id)
            .lock_exclusive()
            .one(db)
            .await
    }

    pub async fn find_by_code_for_update<C: ConnectionTrait>(
        db: &C,
        code: &str,
    ) -> Result<Option<referral_model::Model>, DbErr> {
        ReferralEntity::find()
            .filter(referral_model::Column::ReferralCode.eq(code))
            .lock_exclusive()
            .one(db)
            .await
    }

    pub async fn code_exists<C: ConnectionTrait>(db: &C, code: &str) -> Result<bool, DbErr> {
        let count = ReferralEntity::find()
            .filter(referral_model::Column::ReferralCode.eq(code))
            .count(db)
            .await?;
        Ok(count > 0)
    }

    /// 被紹介者の保留中の紹介（古いものを優先）
    pub async fn find_pending_by_referee<C: ConnectionTrait>(
        db: &C,
        referee_id: Uuid,
    ) -> Result<Option<referral_model::Model>, DbErr> {
        ReferralEntity::find()
            .filter(referral_model::Column::RefereeId.eq(referee_id))
            .filter(referral_model::Column::Status.eq(ReferralStatus::Pending.as_str()))
            .order_by_asc(referral_model::Column::CreatedAt)
            .one(db)
            .await
    }

    pub async fn find_pending_by_referee_for_update<C: ConnectionTrait>(
        db: &C,
        referee_id: Uuid,
    ) -> Result<Option<referral_model::Model>, DbErr> {
        ReferralEntity::find()
            .filter(referral_model::Column::RefereeId.eq(referee_id))
            .filter(referral_model::Column::Status.eq(ReferralStatus::Pending.as_str()))
            .order_by_asc(referral_model::Column::CreatedAt)
            .lock_exclusive()
            .one(db)
            .await
    }

    pub async fn find_by_referrer<C: ConnectionTrait>(
        db: &C,
        referrer_id: Uuid,
    ) -> Result<Vec<referral_model::Model>, DbErr> {
        ReferralEntity::find()
            .filter(referral_model::Column::ReferrerId.eq(referrer_id))
            .order_by_desc(referral_model::Column::CreatedAt)
            .all(db)
            .await
    }

    pub async fn insert<C: ConnectionTrait>(
        db: &C,
        active_model: ReferralActiveModel,
    ) -> Result<referral_model::Model, DbErr> {
        active_model.insert(db).await
    }

    pub async fn update<C: ConnectionTrait>(
        db: &C,
        active_model: ReferralActiveModel,
    ) -> Result<referral_model::Model, DbErr> {
        active_model.update(db).await
    }
}
