//! Nickname derivation for linked members.

use crate::server::{
    model::server_member::MemberRecord, policy::taxonomy::RoleTaxonomy,
};

/// Longest nickname the platform accepts.
pub const MAX_NICKNAME_LENGTH: usize = 32;

/// Prefix marking staff members in their nickname.
pub const STAFF_NICKNAME_PREFIX: &str = "staff_";

/// Derives the nickname a linked member should carry.
///
/// Casing is kept as stored since names such as `DeShawn` carry meaningful inner casing.
/// Whitespace is removed from both name parts, employees get the staff prefix, and the
/// result is cut to the platform limit on a char boundary.
pub fn derive_nickname(record: &MemberRecord, taxonomy: &RoleTaxonomy) -> String {
    let first: String = record.first_name.split_whitespace().collect();
    let last: String = record.last_name.split_whitespace().collect();

    let full_name = format!("{}_{}", first, last);

    let nickname = if taxonomy.is_employee(&record.roles) {
        format!("{}{}", STAFF_NICKNAME_PREFIX, full_name)
    } else {
        full_name
    };

    nickname.chars().take(MAX_NICKNAME_LENGTH).collect()
}
