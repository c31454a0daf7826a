// src/repository/loyalty_transaction_repository.rs

use crate::domain::loyalty_transaction_model::{
    self, ActiveModel as LoyaltyTransactionActiveModel, Entity as LoyaltyTransactionEntity,
    RelatedRef, TransactionType,
};
use sea_orm::entity::*;
use sea_orm::{ConnectionTrait, DbErr, PaginatorTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

pub struct LoyaltyTransactionRepository;

impl LoyaltyTransactionRepository {
    pub async fn append<C: ConnectionTrait>(
        db: &C,
        entry: NewLedgerEntry,
    ) -> Result<loyalty_transaction_model::Model, DbErr> {
        let mut active_model = LoyaltyTransactionActiveModel::new();
        active_model.user_id = Set(entry.user_id);
        active_model.transaction_type = Set(entry.transaction_type.as_str().to_string());
        active_model.points_amount = Set(entry.points_amount);
        active_model.description = Set(entry.description);
        active_model.balance_before = Set(entry.balance_before);
        active_model.balance_after = Set(entry.balance_before + entry.points_amount);
        active_model.related_payment_id = Set(entry.related.payment_id);
        active_model.related_order_id = Set(entry.related.order_id);
        active_model.insert(db).await
    }

    /// 新しい順のページング（page は 1 始まり）
    pub async fn find_by_user_paginated<C: ConnectionTrait>(
        db: &C,
        user_id: Uuid,
        page: u64,
        page_size: u64,
    ) -> Result<(Vec<loyalty_transaction_model::Model>, u64), DbErr> {
        let paginator = LoyaltyTransactionEntity::find()
            .filter(loyalty_transaction_model::Column::UserId.eq(user_id))
            .order_by_desc(loyalty_transaction_model::Column::CreatedAt)
            .order_by_desc(loyalty_transaction_model::Column::Id)
            .paginate(db, page_size);

        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((items, total))
    }

    /// 古い順の全件（監査用）
    pub async fn find_all_by_user<C: ConnectionTrait>(
        db: &C,
        user_id: Uuid,
    ) -> Result<Vec<loyalty_transaction_model::Model>, DbErr> {
        LoyaltyTransactionEntity::find()
            .filter(loyalty_transaction_model::Column::UserId.eq(user_id))
            .order_by_asc(loyalty_transaction_model::Column::CreatedAt)
            .order_by_asc(loyalty_transaction_model::Column::Id)
            .all(db)
            .await
    }

    pub async fn exists_for_payment<C: ConnectionTrait>(
        db: &C,
        payment_id: Uuid,
    ) -> Result<bool, DbErr> {
        let count = LoyaltyTransactionEntity::find()
            .filter(loyalty_transaction_model::Column::RelatedPaymentId.eq(payment_id))
            .count(db)
            .await?;
        Ok(count > 0)
    }
}

/// 台帳への追記内容
#[derive(Debug, Clone)]
pub struct NewLedgerEntry {
    pub user_id: Uuid,
    pub transaction_type: TransactionType,
    pub points_amount: i64,
    pub description: String,
    pub balance_before: i64,
    pub related: RelatedRef,
}
