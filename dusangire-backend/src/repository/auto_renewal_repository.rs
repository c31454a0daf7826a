// src/repository/auto_renewal_repository.rs

use crate::domain::auto_renewal_model::{
    self, ActiveModel as AutoRenewalActiveModel, Entity as AutoRenewalEntity,
};
use crate::domain::subscription_model;
use crate::domain::subscription_status::SubscriptionStatus;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use sea_orm::entity::*;
use sea_orm::sea_query::Expr;
use sea_orm::{Condition, ConnectionTrait, DbErr, QueryFilter, QueryOrder, QuerySelect};
use uuid::Uuid;

pub struct AutoRenewalRepository;

impl AutoRenewalRepository {
    pub async fn find_by_id<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
    ) -> Result<Option<auto_renewal_model::Model>, DbErr> {
        AutoRenewalEntity::find_by_id(id).one(db).await
    }

    pub async fn find_by_id_for_update<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
    ) -> Result<Option<auto_renewal_model::Model>, DbErr> {
        AutoRenewalEntity::find_by_id(id)
            .lock_exclusive()
            .one(db)
            .await
    }

    pub async fn find_by_subscription_id<C: ConnectionTrait>(
        db: &C,
        subscription_id: Uuid,
    ) -> Result<Option<auto_renewal_model::Model>, DbErr> {
        AutoRenewalEntity::find()
            .filter(auto_renewal_model::Column::SubscriptionId.eq(subscription_id))
            .one(db)
            .await
    }

    pub async fn find_by_subscription_id_for_update<C: ConnectionTrait>(
        db: &C,
        subscription_id: Uuid,
    ) -> Result<Option<auto_renewal_model::Model>, DbErr> {
        AutoRenewalEntity::find()
            .filter(auto_renewal_model::Column::SubscriptionId.eq(subscription_id))
            .lock_exclusive()
            .one(db)
            .await
    }

    pub async fn insert<C: ConnectionTrait>(
        db: &C,
        active_model: AutoRenewalActiveModel,
    ) -> Result<auto_renewal_model::Model, DbErr> {
        active_model.insert(db).await
    }

    pub async fn update<C: ConnectionTrait>(
        db: &C,
        active_model: AutoRenewalActiveModel,
    ) -> Result<auto_renewal_model::Model, DbErr> {
        active_model.update(db).await
    }

    /// 処理対象の有効な自動更新設定（契約がアクティブなもののみ）
    ///
    /// 更新日が到来したものに加え、リトライ上限に達したものは日付に関係なく含める。
    pub async fn find_due<C: ConnectionTrait>(
        db: &C,
        today: NaiveDate,
    ) -> Result<Vec<auto_renewal_model::Model>, DbErr> {
        AutoRenewalEntity::find()
            .inner_join(subscription_model::Entity)
            .filter(auto_renewal_model::Column::AutoRenewEnabled.eq(true))
            .filter(
                Condition::any()
                    .add(auto_renewal_model::Column::RenewalDate.lte(today))
                    .add(
                        Expr::col((
                            auto_renewal_model::Entity,
                            auto_renewal_model::Column::FailureCount,
                        ))
                        .gte(Expr::col((
                            auto_renewal_model::Entity,
                            auto_renewal_model::Column::MaxRetries,
                        ))),
                    ),
            )
            .filter(subscription_model::Column::Status.eq(SubscriptionStatus::Active.as_str()))
            .order_by_asc(auto_renewal_model::Column::RenewalDate)
            .all(db)
            .await
    }

    /// 処理権を取得する
    ///
    /// `claimed_at` が未設定、またはリース期限切れの行だけを条件付きで更新する。
    /// 更新件数が1件なら取得成功。
    pub async fn try_claim<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
        now: DateTime<Utc>,
        lease: Duration,
    ) -> Result<bool, DbErr> {
        let stale_before = now - lease;
        let result = AutoRenewalEntity::update_many()
            .col_expr(auto_renewal_model::Column::ClaimedAt, Expr::value(now))
            .filter(auto_renewal_model::Column::Id.eq(id))
            .filter(
                Condition::any()
                    .add(auto_renewal_model::Column::ClaimedAt.is_null())
                    .add(auto_renewal_model::Column::ClaimedAt.lt(stale_before)),
            )
            .exec(db)
            .await?;

        Ok(result.rows_affected == 1)
    }

    /// 課金が成功した更新日を記録する
    pub async fn mark_cycle_charged<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
        cycle: NaiveDate,
    ) -> Result<(), DbErr> {
        AutoRenewalEntity::update_many()
            .col_expr(
                auto_renewal_model::Column::ChargedCycleDate,
                Expr::value(Some(cycle)),
            )
            .col_expr(auto_renewal_model::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(auto_renewal_model::Column::Id.eq(id))
            .exec(db)
            .await?;
        Ok(())
    }

    pub async fn release_claim<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<(), DbErr> {
        AutoRenewalEntity::update_many()
            .col_expr(
                auto_renewal_model::Column::ClaimedAt,
                Expr::value(Option::<DateTime<Utc>>::None),
            )
            .filter(auto_renewal_model::Column::Id.eq(id))
            .exec(db)
            .await?;
        Ok(())
    }
}
