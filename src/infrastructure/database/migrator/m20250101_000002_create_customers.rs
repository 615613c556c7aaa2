//! Create customers table
//!
//! One profile row per customer account, removed with the account.

use sea_orm_migration::prelude::*;

use super::m20250101_000001_create_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Customers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Customers::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Customers::UserId)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Customers::PhoneNumber).string_len(15))
                    .col(ColumnDef::new(Customers::Address).string_len(300))
                    .col(
                        ColumnDef::new(Customers::DriverLicenseNumber)
                            .string_len(20)
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Customers::LicenseImage).string())
                    .col(ColumnDef::new(Customers::DateOfBirth).date())
                    .col(
                        ColumnDef::new(Customers::Status)
                            .string_len(20)
                            .not_null()
                            .default("unverified"),
                    )
                    .col(
                        ColumnDef::new(Customers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Customers::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_customers_user")
                            .from(Customers::Table, Customers::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_customers_status")
                    .table(Customers::Table)
                    .col(Customers::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Customers::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Customers {
    Table,
    Id,
    UserId,
    PhoneNumber,
    Address,
    DriverLicenseNumber,
    LicenseImage,
    DateOfBirth,
    Status,
    CreatedAt,
    UpdatedAt,
}
