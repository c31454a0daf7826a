use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(VipTiers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(VipTiers::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(VipTiers::UserId)
                            .uuid()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(VipTiers::TierLevel)
                            .string()
                            .not_null()
                            .default("bronze"),
                    )
                    .col(
                        ColumnDef::new(VipTiers::SpendingTotal)
                            .decimal_len(16, 2)
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(VipTiers::SpendingYtd)
                            .decimal_len(16, 2)
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(VipTiers::YtdYear).integer().not_null())
                    .col(
                        ColumnDef::new(VipTiers::PromotionPercentage)
                            .decimal_len(5, 2)
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(VipTiers::AchievedAt).date().not_null())
                    .col(
                        ColumnDef::new(VipTiers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .extra("DEFAULT CURRENT_TIMESTAMP"),
                    )
                    .col(
                        ColumnDef::new(VipTiers::UpdatedAt)
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
            .drop_table(Table::drop().table(VipTiers::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum VipTiers {
    Table,
    Id,
    UserId,
    TierLevel,
    SpendingTotal,
    SpendingYtd,
    YtdYear,
    PromotionPercentage,
    AchievedAt,
    CreatedAt,
    UpdatedAt,
}
