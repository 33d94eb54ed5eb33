//! Reply text for command results.

use std::fmt::Display;

use crate::server::model::{bulk::BulkResults, platform::MAX_MESSAGE_LENGTH, server_member::MemberRecord};

const TRUNCATION_MARKER: &str = "\n...";

pub const EMAILS_LABEL: &str = "Emails on new lines (paste from google sheet)";
pub const NO_EMAILS: &str = "No emails were received.";

/// Cuts a message down to the platform length limit on a char boundary.
pub fn truncate_message(content: String) -> String {
    if content.chars().count() <= MAX_MESSAGE_LENGTH {
        return content;
    }

    let keep = MAX_MESSAGE_LENGTH - TRUNCATION_MARKER.chars().count();
    let mut truncated: String = content.chars().take(keep).collect();
    truncated.push_str(TRUNCATION_MARKER);
    truncated
}

/// Renders a record with its roles as mentions.
pub fn format_record(record: &MemberRecord) -> String {
    let discord = record
        .discord_id
        .map(|id| format!("<@{}> ({})", id, id))
        .unwrap_or_else(|| "not linked".to_string());

    let roles = if record.roles.is_empty() {
        "none".to_string()
    } else {
        record
            .roles
            .iter()
            .map(|id| format!("<@&{}>", id))
            .collect::<Vec<_>>()
            .join(" ")
    };

    format!(
        "**{} {}**\nEmail: {}\nDiscord: {}\nRoles: {}",
        record.first_name, record.last_name, record.email, discord, roles
    )
}

/// Summarizes a bulk operation as `ok / failed / total` followed by each failed input.
///
/// # Arguments
/// - `title` - First line of the summary
/// - `inputs` - Inputs of the batch, in the order results were produced
/// - `results` - Results of the batch
pub fn format_bulk_summary<I: Display, T>(
    title: &str,
    inputs: &[I],
    results: &BulkResults<T>,
) -> String {
    let stats = &results.stats;
    let mut content = format!(
        "{}\nok: {} / failed: {} / total: {}",
        title, stats.ok, stats.failed, stats.total
    );

    let failures = results.failures(inputs);
    if !failures.is_empty() {
        content.push_str("\n\nFailed:");
        for (input, fault) in failures {
            content.push_str(&format!("\n- {}: {}", input, fault));
        }
    }

    truncate_message(content)
}
