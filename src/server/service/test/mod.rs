use crate::server::{
    data::server_member::ServerMemberRepository,
    error::fault::{Fault, LinkConflict},
    gateway::fake::{platform_member, FakeGateway, GatewayCall},
    model::{
        bulk::BULK_REQUEST_LIMIT,
        platform::{PlatformBan, RoleSet},
    },
    policy::{
        role_update::RoleUpdateMethod,
        taxonomy::RoleTaxonomy,
        test_support::{community_with_key_roles, role_id},
    },
    service::{
        community::CommunityScope,
        server_member::{BanAction, ServerMemberService},
    },
};
use test_utils::{builder::TestBuilder, factory::server_member::ServerMemberFactory};

mod moderation;
mod role;
mod update_many_roles;

fn scope() -> CommunityScope {
    let community = community_with_key_roles();
    let taxonomy = RoleTaxonomy::resolve(&community).unwrap();

    CommunityScope {
        community,
        taxonomy,
    }
}

fn role(scope: &CommunityScope, name: &str) -> u64 {
    role_id(&scope.community, name)
}

fn gateway(scope: &CommunityScope) -> FakeGateway {
    FakeGateway::new(scope.community.clone())
}
