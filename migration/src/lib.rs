// migration/src/lib.rs
pub use sea_orm_migration::prelude::*;

// サブスクリプション関連マイグレーション
mod m20261001_000001_create_subscription_plans_table;
mod m20261001_000002_create_subscriptions_table;
mod m20261001_000003_create_subscription_auto_renewals_table;

// ロイヤルティ関連マイグレーション
mod m20261001_000004_create_loyalty_points_table;
mod m20261001_000005_create_loyalty_transactions_table;
mod m20261001_000006_create_vip_tiers_table;
mod m20261001_000007_create_referral_programs_table;

// 通知
mod m20261001_000008_create_notifications_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            // 1. プランとサブスクリプション（プランに依存）
            Box::new(m20261001_000001_create_subscription_plans_table::Migration),
            Box::new(m20261001_000002_create_subscriptions_table::Migration),
            // 2. 自動更新設定（サブスクリプションに依存）
            Box::new(m20261001_000003_create_subscription_auto_renewals_table::Migration),
            // 3. ロイヤルティ台帳・VIP・紹介
            Box::new(m20261001_000004_create_loyalty_points_table::Migration),
            Box::new(m20261001_000005_create_loyalty_transactions_table::Migration),
            Box::new(m20261001_000006_create_vip_tiers_table::Migration),
            Box::new(m20261001_000007_create_referral_programs_table::Migration),
            // 4. 通知
            Box::new(m20261001_000008_create_notifications_table::Migration),
        ]
    }
}
