//! SeaORM entities for the roster database.

pub mod prelude;

pub mod server_member;
pub mod server_member_role;
