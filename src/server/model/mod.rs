//! Server-side domain models and parameter types.
//!
//! This module contains domain models used throughout the service layer, representing
//! member records, live platform state, and operation parameters. Domain models are
//! converted from entity models at the repository boundary and transformed to DTOs at
//! the controller boundary.

pub mod api;
pub mod bulk;
pub mod platform;
pub mod server_member;
