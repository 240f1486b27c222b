use sea_orm_migration::prelude::*;

use crate::m20240101_000001_create_users_table::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ClaimRecords::Table)
                    .if_not_exists()
                    // Insertion sequence, used as the tie-break for equal timestamps
                    .col(
                        ColumnDef::new(ClaimRecords::Seq)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ClaimRecords::Id)
                            .uuid()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(ClaimRecords::UserId).uuid().not_null())
                    .col(ColumnDef::new(ClaimRecords::UserName).string().not_null())
                    .col(
                        ColumnDef::new(ClaimRecords::PointsAwarded)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ClaimRecords::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_claim_records_user_id")
                            .from(ClaimRecords::Table, ClaimRecords::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_claim_records_created_at")
                    .table(ClaimRecords::Table)
                    .col(ClaimRecords::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ClaimRecords::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ClaimRecords {
    Table,
    Seq,
    Id,
    UserId,
    UserName,
    PointsAwarded,
    CreatedAt,
}
