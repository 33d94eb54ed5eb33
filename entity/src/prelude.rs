pub use super::server_member::Entity as ServerMember;
pub use super::server_member_role::Entity as ServerMemberRole;
