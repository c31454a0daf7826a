// src/repository/loyalty_points_repository.rs

use crate::domain::loyalty_points_model::{
    self, ActiveModel as LoyaltyPointsActiveModel, Entity as LoyaltyPointsEntity,
};
use sea_orm::entity::*;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ConnectionTrait, DbErr, QueryFilter, QuerySelect, Set};
use uuid::Uuid;

pub struct LoyaltyPointsRepository;

impl LoyaltyPointsRepository {
    pub async fn find_by_user<C: ConnectionTrait>(
        db: &C,
        user_id: Uuid,
    ) -> Result<Option<loyalty_points_model::Model>, DbErr> {
        LoyaltyPointsEntity::find()
            .filter(loyalty_points_model::Column::UserId.eq(user_id))
            .one(db)
            .await
    }

    pub async fn find_by_user_for_update<C: ConnectionTrait>(
        db: &C,
        user_id: Uuid,
    ) -> Result<Option<loyalty_points_model::Model>, DbErr> {
        LoyaltyPointsEntity::find()
            .filter(loyalty_points_model::Column::UserId.eq(user_id))
            .lock_exclusive()
            .one(db)
            .await
    }

    /// 口座を取得し、なければ作成する（行ロック付き）
    pub async fn get_or_create_for_update<C: ConnectionTrait>(
        db: &C,
        user_id: Uuid,
    ) -> Result<loyalty_points_model::Model, DbErr> {
        let mut active_model = LoyaltyPointsActiveModel::new();
        active_model.user_id = Set(user_id);

        // 同時作成は一意制約で吸収する
        LoyaltyPointsEntity::insert(active_model)
            .on_conflict(
                OnConflict::column(loyalty_points_model::Column::UserId)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await?;

        Self::find_by_user_for_update(db, user_id)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound("Loyalty account not found".to_string()))
    }

    pub async fn update<C: ConnectionTrait>(
        db: &C,
        active_model: LoyaltyPointsActiveModel,
    ) -> Result<loyalty_points_model::Model, DbErr> {
        active_model.update(db).await
    }
}
