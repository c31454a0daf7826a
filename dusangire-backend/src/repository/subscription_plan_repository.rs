// src/repository/subscription_plan_repository.rs

use crate::domain::subscription_plan_model::{
    self, ActiveModel as PlanActiveModel, Entity as PlanEntity, PlanType,
};
use rust_decimal::Decimal;
use sea_orm::entity::*;
use sea_orm::sea_query::Expr;
use sea_orm::{ConnectionTrait, DbErr, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

/// プランの参照と購読者数の更新
///
/// 呼び出し側がトランザクションを渡せるよう、全ての操作は接続を引数に取る。
pub struct SubscriptionPlanRepository;

impl SubscriptionPlanRepository {
    pub async fn find_by_id<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
    ) -> Result<Option<subscription_plan_model::Model>, DbErr> {
        PlanEntity::find_by_id(id).one(db).await
    }

    pub async fn find_active<C: ConnectionTrait>(
        db: &C,
    ) -> Result<Vec<subscription_plan_model::Model>, DbErr> {
        PlanEntity::find()
            .filter(subscription_plan_model::Column::IsActive.eq(true))
            .order_by_asc(subscription_plan_model::Column::Price)
            .all(db)
            .await
    }

    pub async fn create<C: ConnectionTrait>(
        db: &C,
        plan: CreatePlan,
    ) -> Result<subscription_plan_model::Model, DbErr> {
        let mut active_model = PlanActiveModel::new();
        active_model.name = Set(plan.name);
        active_model.description = Set(plan.description);
        active_model.plan_type = Set(plan.plan_type.as_str().to_string());
        active_model.price = Set(plan.price);
        active_model.meals_per_cycle = Set(plan.meals_per_cycle);
        active_model.duration_days = Set(plan.duration_days);
        active_model.discount_percentage = Set(plan.discount_percentage);
        active_model.insert(db).await
    }

    /// 購読者数を加減する（0未満にはしない）
    pub async fn adjust_subscribers_count<C: ConnectionTrait>(
        db: &C,
        plan_id: Uuid,
        delta: i32,
    ) -> Result<(), DbErr> {
        let mut update = PlanEntity::update_many()
            .col_expr(
                subscription_plan_model::Column::SubscribersCount,
                Expr::col(subscription_plan_model::Column::SubscribersCount).add(delta),
            )
            .filter(subscription_plan_model::Column::Id.eq(plan_id));

        if delta < 0 {
            update = update
                .filter(subscription_plan_model::Column::SubscribersCount.gte(delta.abs()));
        }

        update.exec(db).await?;
        Ok(())
    }
}

/// プラン作成用構造体
#[derive(Debug, Clone)]
pub struct CreatePlan {
    pub name: String,
    pub description: Option<String>,
    pub plan_type: PlanType,
    pub price: Decimal,
    pub meals_per_cycle: i32,
    pub duration_days: i32,
    pub discount_percentage: Decimal,
}
