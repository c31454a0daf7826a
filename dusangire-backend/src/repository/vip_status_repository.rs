// src/repository/vip_status_repository.rs

use crate::domain::vip_status_model::{
    self, ActiveModel as VipStatusActiveModel, Entity as VipStatusEntity,
};
use chrono::{Datelike, NaiveDate};
use sea_orm::entity::*;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ConnectionTrait, DbErr, QueryFilter, QuerySelect, Set};
use uuid::Uuid;

pub struct VipStatusRepository;

impl VipStatusRepository {
    pub async fn find_by_user<C: ConnectionTrait>(
        db: &C,
        user_id: Uuid,
    ) -> Result<Option<vip_status_model::Model>, DbErr> {
        VipStatusEntity::find()
            .filter(vip_status_model::Column::UserId.eq(user_id))
            .one(db)
            .await
    }

    pub async fn find_by_user_for_update<C: ConnectionTrait>(
        db: &C,
        user_id: Uuid,
    ) -> Result<Option<vip_status_model::Model>, DbErr> {
        VipStatusEntity::find()
            .filter(vip_status_model::Column::UserId.eq(user_id))
            .lock_exclusive()
            .one(db)
            .await
    }

    /// VIPレコードを取得し、なければブロンズで作成する（行ロック付き）
    pub async fn get_or_create_for_update<C: ConnectionTrait>(
        db: &C,
        user_id: Uuid,
        today: NaiveDate,
    ) -> Result<vip_status_model::Model, DbErr> {
        let mut active_model = VipStatusActiveModel::new();
        active_model.user_id = Set(user_id);
        active_model.ytd_year = Set(today.year());
        active_model.achieved_at = Set(today);

        VipStatusEntity::insert(active_model)
            .on_conflict(
                OnConflict::column(vip_status_model::Column::UserId)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await?;

        Self::find_by_user_for_update(db, user_id)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound("VIP record not found".to_string()))
    }

    pub async fn update<C: ConnectionTrait>(
        db: &C,
        active_model: VipStatusActiveModel,
    ) -> Result<vip_status_model::Model, DbErr> {
        active_model.update(db).await
    }
}
