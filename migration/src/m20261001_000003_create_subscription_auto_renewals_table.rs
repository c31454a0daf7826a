use sea_orm_migration::prelude::*;

use super::m20261001_000002_create_subscriptions_table::Subscriptions;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SubscriptionAutoRenewals::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SubscriptionAutoRenewals::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SubscriptionAutoRenewals::SubscriptionId)
                            .uuid()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(SubscriptionAutoRenewals::AutoRenewEnabled)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(SubscriptionAutoRenewals::RenewalDate)
                            .date()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SubscriptionAutoRenewals::RenewalIntervalDays)
                            .integer()
                            .not_null()
                            .default(30),
                    )
                    .col(
                        ColumnDef::new(SubscriptionAutoRenewals::PaymentMethodId)
                            .string()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(SubscriptionAutoRenewals::StripeCustomerId)
                            .string()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(SubscriptionAutoRenewals::FailureCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(SubscriptionAutoRenewals::MaxRetries)
                            .integer()
                            .not_null()
                            .default(3),
                    )
                    .col(
                        ColumnDef::new(SubscriptionAutoRenewals::NextRetryAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(SubscriptionAutoRenewals::LastRenewalAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(SubscriptionAutoRenewals::LastRenewalStatus)
                            .string()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(SubscriptionAutoRenewals::ChargedCycleDate)
                            .date()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(SubscriptionAutoRenewals::ClaimedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(SubscriptionAutoRenewals::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .extra("DEFAULT CURRENT_TIMESTAMP"),
                    )
                    .col(
                        ColumnDef::new(SubscriptionAutoRenewals::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .extra("DEFAULT CURRENT_TIMESTAMP"),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_subscription_auto_renewals_subscription_id")
                            .from(
                                SubscriptionAutoRenewals::Table,
                                SubscriptionAutoRenewals::SubscriptionId,
                            )
                            .to(Subscriptions::Table, Subscriptions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 日次バッチの対象抽出用
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_subscription_auto_renewals_due")
                    .table(SubscriptionAutoRenewals::Table)
                    .col(SubscriptionAutoRenewals::AutoRenewEnabled)
                    .col(SubscriptionAutoRenewals::RenewalDate)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(SubscriptionAutoRenewals::Table)
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum SubscriptionAutoRenewals {
    Table,
    Id,
    SubscriptionId,
    AutoRenewEnabled,
    RenewalDate,
    RenewalIntervalDays,
    PaymentMethodId,
    StripeCustomerId,
    FailureCount,
    MaxRetries,
    NextRetryAt,
    LastRenewalAt,
    LastRenewalStatus,
    ChargedCycleDate,
    ClaimedAt,
    CreatedAt,
    UpdatedAt,
}
