//! Member store abstraction used by the reconciliation engine.
//!
//! The engine only depends on this trait so it can run against the sea-orm repository in
//! production and the same repository over in-memory SQLite in tests. Implementations
//! enforce record validity at the write boundary: normalized unique emails, non-empty
//! names, and deduplicated role ids.

use async_trait::async_trait;

use crate::server::{
    error::fault::Fault,
    model::server_member::{CreateServerMemberParam, MemberRecord, UpdateServerMemberParam},
};

/// Minimum accepted email length.
pub const MIN_EMAIL_LENGTH: usize = 3;

/// Persistence of member records.
#[async_trait]
pub trait MemberStore: Send + Sync {
    /// Finds a record by normalized email.
    async fn find_by_email(&self, email: &str) -> Result<Option<MemberRecord>, Fault>;

    /// Finds the record linked to a platform account.
    async fn find_by_discord_id(&self, discord_id: u64) -> Result<Option<MemberRecord>, Fault>;

    /// Finds a record by email, falling back to the record linked to `discord_id`.
    async fn find_by_email_or_discord_id(
        &self,
        email: &str,
        discord_id: u64,
    ) -> Result<Option<MemberRecord>, Fault>;

    /// Validates and inserts a record with its roles.
    async fn create(&self, param: CreateServerMemberParam) -> Result<MemberRecord, Fault>;

    /// Validates and inserts each record independently, one result per param in order.
    async fn create_many(
        &self,
        params: Vec<CreateServerMemberParam>,
    ) -> Vec<Result<MemberRecord, Fault>>;

    /// Updates profile fields and/or replaces the roles of a record.
    ///
    /// Returns `Ok(None)` if no record has the id.
    async fn update_by_id(
        &self,
        id: i32,
        param: UpdateServerMemberParam,
    ) -> Result<Option<MemberRecord>, Fault>;

    /// Sets or clears the linked platform account of a record.
    ///
    /// Returns `Ok(None)` if no record has the id.
    async fn set_discord_id(
        &self,
        id: i32,
        discord_id: Option<u64>,
    ) -> Result<Option<MemberRecord>, Fault>;

    /// Deletes a record by email, returning whether one was deleted.
    async fn delete_by_email(&self, email: &str) -> Result<bool, Fault>;
}

/// Checks a record's fields before they are written.
///
/// # Arguments
/// - `email` - Normalized email
/// - `first_name` - Trimmed first name
/// - `last_name` - Trimmed last name
///
/// # Returns
/// - `Ok(())` - Fields are valid
/// - `Err(Fault::InvalidRecord)` - Every failed rule, joined into one message
pub fn validate_member_fields(email: &str, first_name: &str, last_name: &str) -> Result<(), Fault> {
    let mut errors = Vec::new();

    if first_name.is_empty() {
        errors.push("first_name is required".to_string());
    }

    if last_name.is_empty() {
        errors.push("last_name is required".to_string());
    }

    if email.is_empty() {
        errors.push("email is required".to_string());
    } else if email.chars().count() < MIN_EMAIL_LENGTH {
        errors.push(format!("email minimum length is {}", MIN_EMAIL_LENGTH));
    } else if !has_email_shape(email) {
        errors.push("email has an invalid format".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(Fault::InvalidRecord(errors.join(", ")))
    }
}

/// Minimal `local@domain` shape check; emails come from an already validated export.
fn has_email_shape(email: &str) -> bool {
    email
        .char_indices()
        .any(|(index, c)| c == '@' && index > 0 && index + 1 < email.len())
}
