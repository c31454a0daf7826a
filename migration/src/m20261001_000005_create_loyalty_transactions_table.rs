use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 追記専用の台帳テーブル（updated_at は持たない）
        manager
            .create_table(
                Table::create()
                    .table(LoyaltyTransactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LoyaltyTransactions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(LoyaltyTransactions::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(LoyaltyTransactions::TransactionType)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LoyaltyTransactions::PointsAmount)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LoyaltyTransactions::Description)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LoyaltyTransactions::BalanceBefore)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LoyaltyTransactions::BalanceAfter)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LoyaltyTransactions::RelatedPaymentId)
                            .uuid()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(LoyaltyTransactions::RelatedOrderId)
                            .uuid()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(LoyaltyTransactions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .extra("DEFAULT CURRENT_TIMESTAMP"),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_loyalty_transactions_user_created")
                    .table(LoyaltyTransactions::Table)
                    .col(LoyaltyTransactions::UserId)
                    .col(LoyaltyTransactions::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // 支払い単位の重複付与チェック用
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_loyalty_transactions_related_payment")
                    .table(LoyaltyTransactions::Table)
                    .col(LoyaltyTransactions::RelatedPaymentId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(LoyaltyTransactions::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum LoyaltyTransactions {
    Table,
    Id,
    UserId,
    TransactionType,
    PointsAmount,
    Description,
    BalanceBefore,
    BalanceAfter,
    RelatedPaymentId,
    RelatedOrderId,
    CreatedAt,
}
