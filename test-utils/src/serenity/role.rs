//! Test factory for creating Serenity Role objects.

use serenity::all::Role;

fn role_json(role_id: u64, name: &str, position: i16, permissions: u64, managed: bool) -> Role {
    serde_json::from_value(serde_json::json!({
        "id": role_id.to_string(),
        "name": name,
        "color": 0,
        "hoist": false,
        "icon": null,
        "unicode_emoji": null,
        "position": position,
        "permissions": permissions.to_string(),
        "managed": managed,
        "mentionable": false,
    }))
    .expect("Failed to create test role - invalid JSON structure")
}

/// Creates a test Serenity Role with customizable fields.
///
/// # Arguments
/// - `role_id` - Discord role ID (snowflake)
/// - `name` - Role name
/// - `position` - Role position in the hierarchy (higher = more important)
/// - `permissions` - Permission bits granted by the role
///
/// # Returns
/// - `Role` - A valid Serenity Role struct for testing
///
/// # Panics
/// - If the JSON cannot be deserialized into a Role (indicates invalid test data)
pub fn create_test_role(role_id: u64, name: &str, position: i16, permissions: u64) -> Role {
    role_json(role_id, name, position, permissions, false)
}

/// Creates a test Serenity Role managed by an integration.
///
/// # Panics
/// - If the JSON cannot be deserialized into a Role (indicates invalid test data)
pub fn create_test_managed_role(role_id: u64, name: &str, position: i16) -> Role {
    role_json(role_id, name, position, 0, true)
}
