//! Role and identity policy.
//!
//! Pure functions over role sets: the taxonomy resolved from a community's role names,
//! the transforms behind each role update method, and nickname derivation. Nothing in
//! this module performs I/O.

pub mod nickname;
pub mod role_update;
pub mod taxonomy;
