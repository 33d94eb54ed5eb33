//! Test factory for creating Serenity Member objects.

use serenity::all::Member;

fn member_json(
    guild_id: u64,
    user_id: u64,
    username: &str,
    nickname: Option<&str>,
    role_ids: &[u64],
    bot: bool,
) -> Member {
    let roles: Vec<String> = role_ids.iter().map(|id| id.to_string()).collect();

    serde_json::from_value(serde_json::json!({
        "guild_id": guild_id.to_string(),
        "user": {
            "id": user_id.to_string(),
            "username": username,
            "discriminator": "0",
            "global_name": null,
            "avatar": null,
            "bot": bot,
        },
        "nick": nickname,
        "avatar": null,
        "roles": roles,
        "joined_at": "2020-01-01T00:00:00.000000+00:00",
        "premium_since": null,
        "deaf": false,
        "mute": false,
        "flags": 0,
        "pending": false,
        "communication_disabled_until": null,
    }))
    .expect("Failed to create test member - invalid JSON structure")
}

/// Creates a test Serenity Member of guild `1`.
///
/// # Arguments
/// - `user_id` - Discord user ID (snowflake)
/// - `username` - Account username
/// - `nickname` - Server nickname, if any
/// - `role_ids` - Role ids the member holds
///
/// # Returns
/// - `Member` - A valid Serenity Member struct for testing
///
/// # Panics
/// - If the JSON cannot be deserialized into a Member (indicates invalid test data)
pub fn create_test_member(
    user_id: u64,
    username: &str,
    nickname: Option<&str>,
    role_ids: &[u64],
) -> Member {
    member_json(1, user_id, username, nickname, role_ids, false)
}

/// Creates a test Serenity Member whose account is a bot.
///
/// # Panics
/// - If the JSON cannot be deserialized into a Member (indicates invalid test data)
pub fn create_test_bot_member(user_id: u64, username: &str) -> Member {
    member_json(1, user_id, username, None, &[], true)
}
