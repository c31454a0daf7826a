use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(LoyaltyPoints::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LoyaltyPoints::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(LoyaltyPoints::UserId)
                            .uuid()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(LoyaltyPoints::Balance)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(LoyaltyPoints::EarnedTotal)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(LoyaltyPoints::RedeemedTotal)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(LoyaltyPoints::SubscriptionBonusRate)
                            .decimal_len(5, 2)
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(LoyaltyPoints::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .extra("DEFAULT CURRENT_TIMESTAMP"),
                    )
                    .col(
                        ColumnDef::new(LoyaltyPoints::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .extra("DEFAULT CURRENT_TIMESTAMP"),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(LoyaltyPoints::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum LoyaltyPoints {
    Table,
    Id,
    UserId,
    Balance,
    EarnedTotal,
    RedeemedTotal,
    SubscriptionBonusRate,
    CreatedAt,
    UpdatedAt,
}
