// tests/common/test_data.rs

use chrono::NaiveDate;
use dusangire_backend::domain::subscription_plan_model::{self, PlanType};
use dusangire_backend::repository::subscription_plan_repository::{
    CreatePlan, SubscriptionPlanRepository,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// 4週間・週21食の標準プラン
pub async fn create_weekly_plan(db: &DatabaseConnection) -> subscription_plan_model::Model {
    create_plan(db, PlanType::Weekly, dec!(84000), 21, 28).await
}

pub async fn create_plan(
    db: &DatabaseConnection,
    plan_type: PlanType,
    price: Decimal,
    meals_per_cycle: i32,
    duration_days: i32,
) -> subscription_plan_model::Model {
    SubscriptionPlanRepository::create(
        db,
        CreatePlan {
            name: format!("Plan {}", Uuid::new_v4().simple()),
            description: Some("Hospital recovery menu".to_string()),
            plan_type,
            price,
            meals_per_cycle,
            duration_days,
            discount_percentage: dec!(0),
        },
    )
    .await
    .unwrap()
}
