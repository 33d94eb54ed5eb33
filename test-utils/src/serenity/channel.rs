//! Test factory for creating Serenity GuildChannel objects.

use serenity::all::{ChannelType, GuildChannel};

/// Creates a test Serenity GuildChannel of guild `1`.
///
/// # Arguments
/// - `channel_id` - Discord channel ID (snowflake)
/// - `name` - Channel name
/// - `kind` - Channel type, e.g. `ChannelType::Text` or `ChannelType::Category`
/// - `parent_id` - Category the channel sits under, if any
/// - `role_overwrites` - `(role_id, allow_bits, deny_bits)` for each role overwrite
///
/// # Returns
/// - `GuildChannel` - A valid Serenity GuildChannel struct for testing
///
/// # Panics
/// - If the JSON cannot be deserialized into a GuildChannel (indicates invalid test data)
pub fn create_test_channel(
    channel_id: u64,
    name: &str,
    kind: ChannelType,
    parent_id: Option<u64>,
    role_overwrites: &[(u64, u64, u64)],
) -> GuildChannel {
    let overwrites: Vec<serde_json::Value> = role_overwrites
        .iter()
        .map(|(role_id, allow, deny)| {
            serde_json::json!({
                "id": role_id.to_string(),
                "type": 0,
                "allow": allow.to_string(),
                "deny": deny.to_string(),
            })
        })
        .collect();

    serde_json::from_value(serde_json::json!({
        "id": channel_id.to_string(),
        "type": u8::from(kind),
        "guild_id": "1",
        "name": name,
        "position": 0,
        "permission_overwrites": overwrites,
        "parent_id": parent_id.map(|id| id.to_string()),
        "topic": null,
        "nsfw": false,
        "last_message_id": null,
        "rate_limit_per_user": 0,
        "flags": 0,
        "available_tags": [],
        "applied_tags": [],
    }))
    .expect("Failed to create test channel - invalid JSON structure")
}
