use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ServerMember::Table)
                    .if_not_exists()
                    .col(pk_auto(ServerMember::Id))
                    .col(string_null(ServerMember::DiscordId).unique_key())
                    .col(string_uniq(ServerMember::Email))
                    .col(string(ServerMember::FirstName))
                    .col(string(ServerMember::LastName))
                    .col(timestamp_with_time_zone(ServerMember::CreatedAt))
                    .col(timestamp_with_time_zone(ServerMember::UpdatedAt))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ServerMember::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum ServerMember {
    Table,
    Id,
    DiscordId,
    Email,
    FirstName,
    LastName,
    CreatedAt,
    UpdatedAt,
}
