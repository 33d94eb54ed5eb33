use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "server_member_role")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub server_member_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub role_id: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::server_member::Entity",
        from = "Column::ServerMemberId",
        to = "super::server_member::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    ServerMember,
}

impl Related<super::server_member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ServerMember.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
