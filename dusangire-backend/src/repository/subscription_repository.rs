// src/repository/subscription_repository.rs

use crate::domain::subscription_model::{
    self, ActiveModel as SubscriptionActiveModel, Entity as SubscriptionEntity,
};
use crate::domain::subscription_status::SubscriptionStatus;
use chrono::NaiveDate;
use sea_orm::entity::*;
use sea_orm::{ConnectionTrait, DbErr, QueryFilter, QueryOrder, QuerySelect};
use uuid::Uuid;

pub struct SubscriptionRepository;

impl SubscriptionRepository {
    pub async fn find_by_id<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
    ) -> Result<Option<subscription_model::Model>, DbErr> {
        SubscriptionEntity::find_by_id(id).one(db).await
    }

    /// 行ロック付きで取得（`SELECT ... FOR UPDATE`）
    pub async fn find_by_id_for_update<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
    ) -> Result<Option<subscription_model::Model>, DbErr> {
        SubscriptionEntity::find_by_id(id)
            .lock_exclusive()
            .one(db)
            .await
    }

    pub async fn find_by_user<C: ConnectionTrait>(
        db: &C,
        user_id: Uuid,
    ) -> Result<Vec<subscription_model::Model>, DbErr> {
        SubscriptionEntity::find()
            .filter(subscription_model::Column::UserId.eq(user_id))
            .order_by_desc(subscription_model::Column::CreatedAt)
            .all(db)
            .await
    }

    pub async fn insert<C: ConnectionTrait>(
        db: &C,
        active_model: SubscriptionActiveModel,
    ) -> Result<subscription_model::Model, DbErr> {
        active_model.insert(db).await
    }

    pub async fn update<C: ConnectionTrait>(
        db: &C,
        active_model: SubscriptionActiveModel,
    ) -> Result<subscription_model::Model, DbErr> {
        active_model.update(db).await
    }

    /// 終了日を過ぎたアクティブな契約のID
    ///
    /// 自動更新が有効な契約はリトライ中の猶予として除外する。
    pub async fn find_overdue_active_ids<C: ConnectionTrait>(
        db: &C,
        today: NaiveDate,
    ) -> Result<Vec<Uuid>, DbErr> {
        SubscriptionEntity::find()
            .select_only()
            .column(subscription_model::Column::Id)
            .filter(subscription_model::Column::Status.eq(SubscriptionStatus::Active.as_str()))
            .filter(subscription_model::Column::EndDate.lt(today))
            .filter(subscription_model::Column::AutoRenewalEnabled.eq(false))
            .into_tuple()
            .all(db)
            .await
    }

    /// 一時停止期限が到来した契約のID
    pub async fn find_due_paused_ids<C: ConnectionTrait>(
        db: &C,
        today: NaiveDate,
    ) -> Result<Vec<Uuid>, DbErr> {
        SubscriptionEntity::find()
            .select_only()
            .column(subscription_model::Column::Id)
            .filter(subscription_model::Column::Status.eq(SubscriptionStatus::Paused.as_str()))
            .filter(subscription_model::Column::PausedUntil.is_not_null())
            .filter(subscription_model::Column::PausedUntil.lte(today))
            .into_tuple()
            .all(db)
            .await
    }
}
