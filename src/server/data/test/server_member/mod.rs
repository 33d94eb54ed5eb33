use crate::server::{
    data::{server_member::ServerMemberRepository, store::MemberStore},
    error::fault::Fault,
    model::{
        platform::RoleSet,
        server_member::{CreateServerMemberParam, UpdateServerMemberParam},
    },
};
use sea_orm::{ColumnTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter};
use test_utils::{builder::TestBuilder, factory};

mod create;
mod create_many;
mod delete_by_email;
mod find_by_discord_id;
mod find_by_email;
mod find_by_email_or_discord_id;
mod set_discord_id;
mod update_by_id;

fn create_param(email: &str) -> CreateServerMemberParam {
    CreateServerMemberParam {
        email: email.to_string(),
        first_name: "Jane".to_string(),
        last_name: "Doe".to_string(),
        discord_id: None,
        roles: RoleSet::from([111111111, 222222222]),
    }
}
