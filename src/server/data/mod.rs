//! Database repository layer for member records.
//!
//! This module contains the `MemberStore` abstraction the reconciliation engine depends on
//! and the SeaORM-backed `ServerMemberRepository` implementing it. Repositories use SeaORM
//! entity models internally and return domain models to keep the data layer separate from
//! the business logic layer.

pub mod server_member;
pub mod store;

pub use server_member::ServerMemberRepository;
pub use store::MemberStore;

#[cfg(test)]
mod test;
