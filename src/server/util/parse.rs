use crate::server::model::{
    platform::RoleSet,
    server_member::{normalize_email, CreateServerMemberParam},
};

/// Parses pasted email rows.
///
/// Rows are split on new lines and on commas, then trimmed and lowercased. Empty
/// entries are dropped.
pub fn parse_email_rows(raw_rows: &str) -> Vec<String> {
    raw_rows
        .split(['\n', ','])
        .map(normalize_email)
        .filter(|email| !email.is_empty())
        .collect()
}

/// Parses user rows pasted from a spreadsheet.
///
/// Each line holds tab-separated `first name`, `last name` and `email` columns. Missing
/// columns are left empty so the store rejects that row on its own, without failing
/// the rest of the batch. Blank lines are skipped.
///
/// # Arguments
/// - `raw_rows` - Text pasted into the modal
/// - `roles` - Roles given to every parsed member
///
/// # Returns
/// - `Vec<CreateServerMemberParam>` - One entry per non-blank line, in order
pub fn parse_pasted_user_rows(raw_rows: &str, roles: &RoleSet) -> Vec<CreateServerMemberParam> {
    raw_rows
        .lines()
        .filter(|row| !row.trim().is_empty())
        .map(|row| {
            let mut columns = row.trim().split('\t').map(str::trim);

            CreateServerMemberParam {
                first_name: columns.next().unwrap_or_default().to_string(),
                last_name: columns.next().unwrap_or_default().to_string(),
                email: normalize_email(columns.next().unwrap_or_default()),
                discord_id: None,
                roles: roles.clone(),
            }
        })
        .collect()
}

/// Collects the ids of `<{prefix}id>` mentions in order of first appearance.
fn parse_mentions(text: &str, prefix: &str) -> Vec<u64> {
    let mut ids = Vec::new();
    let mut rest = text;

    while let Some(start) = rest.find(prefix) {
        rest = &rest[start + prefix.len()..];

        let end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        if !rest[end..].starts_with('>') {
            continue;
        }

        if let Ok(id) = rest[..end].parse::<u64>() {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
    }

    ids
}

/// Parses role mentions (`<@&id>`) typed into a string option.
pub fn parse_role_mentions(text: &str) -> Vec<u64> {
    parse_mentions(text, "<@&")
}

/// Parses channel mentions (`<#id>`) typed into a string option.
pub fn parse_channel_mentions(text: &str) -> Vec<u64> {
    parse_mentions(text, "<#")
}
