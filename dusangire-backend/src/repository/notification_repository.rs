// src/repository/notification_repository.rs

use crate::domain::notification_model::{
    self, ActiveModel as NotificationActiveModel, Entity as NotificationEntity, NotificationKind,
};
use sea_orm::entity::*;
use sea_orm::{ConnectionTrait, DbErr, PaginatorTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

pub struct NotificationRepository;

impl NotificationRepository {
    pub async fn create<C: ConnectionTrait>(
        db: &C,
        user_id: Uuid,
        kind: NotificationKind,
        title: &str,
        message: &str,
    ) -> Result<notification_model::Model, DbErr> {
        let mut active_model = NotificationActiveModel::new();
        active_model.user_id = Set(user_id);
        active_model.notification_type = Set(kind.as_str().to_string());
        active_model.title = Set(title.to_string());
        active_model.message = Set(message.to_string());
        active_model.insert(db).await
    }

    pub async fn find_by_user<C: ConnectionTrait>(
        db: &C,
        user_id: Uuid,
    ) -> Result<Vec<notification_model::Model>, DbErr> {
        NotificationEntity::find()
            .filter(notification_model::Column::UserId.eq(user_id))
            .order_by_desc(notification_model::Column::CreatedAt)
            .all(db)
            .await
    }

    pub async fn count_unread<C: ConnectionTrait>(db: &C, user_id: Uuid) -> Result<u64, DbErr> {
        NotificationEntity::find()
            .filter(notification_model::Column::UserId.eq(user_id))
            .filter(notification_model::Column::IsRead.eq(false))
            .count(db)
            .await
    }
}
