use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ReferralPrograms::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ReferralPrograms::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ReferralPrograms::ReferrerId).uuid().not_null())
                    .col(ColumnDef::new(ReferralPrograms::RefereeId).uuid().null())
                    .col(
                        ColumnDef::new(ReferralPrograms::ReferralCode)
                            .string_len(16)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(ReferralPrograms::ReferralLink)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ReferralPrograms::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(ReferralPrograms::ReferrerBonusPoints)
                            .big_integer()
                            .not_null()
                            .default(100),
                    )
                    .col(
                        ColumnDef::new(ReferralPrograms::ReferrerBonusRwf)
                            .decimal_len(12, 2)
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ReferralPrograms::RefereeDiscountPercent)
                            .decimal_len(5, 2)
                            .not_null()
                            .default(10),
                    )
                    .col(
                        ColumnDef::new(ReferralPrograms::ClaimedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ReferralPrograms::CompletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ReferralPrograms::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .extra("DEFAULT CURRENT_TIMESTAMP"),
                    )
                    .col(
                        ColumnDef::new(ReferralPrograms::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .extra("DEFAULT CURRENT_TIMESTAMP"),
                    )
                    .to_owned(),
            )
            .await?;

        // 被紹介者の保留中紹介の検索用
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_referral_programs_referee_status")
                    .table(ReferralPrograms::Table)
                    .col(ReferralPrograms::RefereeId)
                    .col(ReferralPrograms::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ReferralPrograms::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ReferralPrograms {
    Table,
    Id,
    ReferrerId,
    RefereeId,
    ReferralCode,
    ReferralLink,
    Status,
    ReferrerBonusPoints,
    ReferrerBonusRwf,
    RefereeDiscountPercent,
    ClaimedAt,
    CompletedAt,
    CreatedAt,
    UpdatedAt,
}
