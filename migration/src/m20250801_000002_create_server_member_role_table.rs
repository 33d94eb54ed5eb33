use sea_orm_migration::{prelude::*, schema::*};

use super::m20250801_000001_create_server_member_table::ServerMember;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ServerMemberRole::Table)
                    .if_not_exists()
                    .col(integer(ServerMemberRole::ServerMemberId))
                    .col(string(ServerMemberRole::RoleId))
                    .primary_key(
                        Index::create()
                            .col(ServerMemberRole::ServerMemberId)
                            .col(ServerMemberRole::RoleId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_server_member_role_server_member_id")
                            .from(ServerMemberRole::Table, ServerMemberRole::ServerMemberId)
                            .to(ServerMember::Table, ServerMember::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ServerMemberRole::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ServerMemberRole {
    Table,
    ServerMemberId,
    RoleId,
}
