//! Per-operation faults returned by the reconciliation engine and command dispatcher.
//!
//! A `Fault` is an expected, recoverable failure of a single operation: a record that
//! doesn't exist, a member the bot can't manage, a batch over the size ceiling. Faults are
//! returned as the `Err` side of a `Result`, never panicked, and each one carries a stable
//! code, an HTTP status for the API, and a readable message for operators.

use axum::http::StatusCode;
use sea_orm::DbErr;
use thiserror::Error;

use crate::server::{
    model::{bulk::BULK_REQUEST_LIMIT, platform::BULK_MESSAGE_DELETE_MAX},
    policy::role_update::RoleUpdateMethod,
};

/// Message used when an error has no better description available.
pub const UNIDENTIFIED_FAULT_MESSAGE: &str = "There was an unexpected error.";

/// Which side of a link request conflicts with the stored record.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkConflict {
    /// Record found by email is linked to another account.
    #[error("That email is already linked to a different discord account.")]
    DifferentDiscordId,
    /// Requested account is linked to another record.
    #[error("That discord user id is already linked to a different email.")]
    DifferentEmail,
    /// Record is linked but neither side could be compared.
    #[error("A discord account is already linked.")]
    Unknown,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Fault {
    /// Catch-all for errors without a more specific mapping.
    #[error("{0}")]
    Unidentified(String),

    /// A modal or component collector expired before the user answered.
    #[error("The command was cancelled or timed out while waiting for a reply. Rerun it if needed.")]
    InteractionTimeout,

    #[error("{0}")]
    SlashCommandNotFound(String),

    #[error("This slash command was setup incorrectly. Please send this message to the server admin. {0}.")]
    SlashCommandSetup(String),

    #[error("The requested record was not found.")]
    RecordNotFound,

    #[error("The provided email address was not found. Make sure to use the email you enrolled with.")]
    EmailNotFound,

    #[error("{0}")]
    AlreadyLinked(LinkConflict),

    #[error("The user with email {email} is still linked to a discord account. Unlink the discord account first if needed.")]
    LinkedStill { email: String },

    #[error("The database record with email {email} isn't linked to any discord account id.")]
    NotLinked { email: String },

    #[error("The discord user with discord user id {discord_id} is in the server but not linked to the database. They must be linked with the link-discord-account command.")]
    NotLinkedButInGuild { discord_id: u64 },

    #[error(
        "The user with email {email}{} is in the database but wasn't found in the discord server.",
        .discord_id.map(|id| format!(" and discord id {}", id)).unwrap_or_default()
    )]
    LinkedNotInGuild {
        email: String,
        discord_id: Option<u64>,
    },

    #[error(
        "The discord user with username: {username} and email in our database: {email} is banned. Reason: {}.",
        .reason.as_deref().unwrap_or("N/A")
    )]
    LinkedBanned {
        username: String,
        email: String,
        reason: Option<String>,
    },

    #[error("The guild with id {0} was not found in the bot's cache.")]
    CommunityNotCached(u64),

    #[error("Discord user with id {0} is not in the server.")]
    MemberNotInGuild(u64),

    #[error("The discord user with discord id {0} is not manageable by the bot. Make sure the bot has the correct permissions. In the server settings role list the bot can only manage roles and users with roles that the bot is above.")]
    MemberNotManageable(u64),

    #[error("The discord user with discord id {0} is not kickable by the bot. Make sure the bot has the correct permissions.")]
    MemberNotKickable(u64),

    #[error("The discord user with discord id {0} is not bannable by the bot. Make sure the bot has the correct permissions.")]
    MemberNotBannable(u64),

    #[error("The discord user with id {0} wasn't found in the ban list.")]
    BanNotFound(u64),

    #[error("There was a discord error when checking the ban list. Please try again. {0}.")]
    BanFetchFailed(String),

    #[error("Role update failed for user with discord id {discord_id}. {reason}.")]
    RolesUpdateFailed { discord_id: u64, reason: String },

    #[error("Nickname update failed for user with discord id {discord_id}. {reason}.")]
    NicknameUpdateFailed { discord_id: u64, reason: String },

    #[error("Failed to kick discord member with discord id {discord_id}. {reason}.")]
    KickFailed { discord_id: u64, reason: String },

    #[error("Failed to ban discord member with discord id {discord_id}. {reason}.")]
    BanFailed { discord_id: u64, reason: String },

    #[error("Failed to unban the requested account. {0}.")]
    UnbanFailed(String),

    #[error("Failed to send direct message. {0}")]
    DirectMessageFailed(String),

    #[error("Bulk discord requests are limited to {} at a time.", BULK_REQUEST_LIMIT)]
    BulkRequestLimit,

    #[error(
        "The given role change parameter {0} is invalid. Valid options are: {valid}.",
        valid = RoleUpdateMethod::valid_names()
    )]
    InvalidRoleUpdateMethod(String),

    #[error("Invalid role(s) selected: {0}")]
    InvalidRoleSelection(String),

    #[error("Validation failed - {0}.")]
    InvalidRecord(String),

    #[error("The message was not sent due to exceeding the length limit of {limit} by {excess}.")]
    MessageTooLong { limit: usize, excess: usize },

    #[error("The channel with id {0} was not found in the server.")]
    ChannelNotFound(u64),

    #[error("Invalid channel selected: {0}")]
    InvalidChannelSelection(String),

    #[error("Failed to create the channel. {0}.")]
    ChannelCreateFailed(String),

    #[error("Failed to delete the channel with id {channel_id}. {reason}.")]
    ChannelDeleteFailed { channel_id: u64, reason: String },

    #[error("Failed to send to the channel with id {channel_id}. {reason}.")]
    ChannelSendFailed { channel_id: u64, reason: String },

    #[error("Failed to delete messages from the channel with id {channel_id}. {reason}.")]
    MessageDeleteFailed { channel_id: u64, reason: String },

    #[error("Bulk message deletion is limited to between 1 and {} messages.", BULK_MESSAGE_DELETE_MAX)]
    BulkDeleteLimit,

    #[error("Failed to create the role. {0}.")]
    RoleCreateFailed(String),

    #[error("Failed to delete the role with id {role_id}. {reason}.")]
    RoleDeleteFailed { role_id: u64, reason: String },
}

impl Fault {
    /// Creates an unidentified fault from any displayable error.
    ///
    /// Falls back to the generic unexpected error message when the source renders empty.
    pub fn unidentified(error: impl std::fmt::Display) -> Self {
        let message = error.to_string();

        if message.trim().is_empty() {
            Self::Unidentified(UNIDENTIFIED_FAULT_MESSAGE.to_string())
        } else {
            Self::Unidentified(message)
        }
    }

    /// Stable machine-readable code for this fault.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unidentified(_) => "UNIDENTIFIED_FAULT",
            Self::InteractionTimeout => "INTERACTION_COLLECTOR_TIMEOUT",
            Self::SlashCommandNotFound(_) => "SLASH_COMMAND_NOT_FOUND",
            Self::SlashCommandSetup(_) => "SLASH_COMMAND_SETUP_FAULT",
            Self::RecordNotFound => "DB_RECORD_NOT_FOUND",
            Self::EmailNotFound => "MEMBER_JOIN_EMAIL_NOT_FOUND",
            Self::AlreadyLinked(_) => "MEMBER_LINKED_ALREADY",
            Self::LinkedStill { .. } => "MEMBER_LINKED_STILL",
            Self::NotLinked { .. } => "MEMBER_NOT_LINKED",
            Self::NotLinkedButInGuild { .. } => "MEMBER_NOT_LINKED_BUT_IN_GUILD",
            Self::LinkedNotInGuild { .. } => "MEMBER_LINKED_NOT_IN_GUILD",
            Self::LinkedBanned { .. } => "MEMBER_LINKED_BANNED",
            Self::CommunityNotCached(_) => "GUILD_NOT_CACHED",
            Self::MemberNotInGuild(_) => "MEMBER_NOT_IN_GUILD",
            Self::MemberNotManageable(_) => "MEMBER_NOT_MANAGEABLE",
            Self::MemberNotKickable(_) => "MEMBER_NOT_KICKABLE",
            Self::MemberNotBannable(_) => "MEMBER_NOT_BANNABLE",
            Self::BanNotFound(_) => "MEMBER_BAN_NOT_FOUND",
            Self::BanFetchFailed(_) => "GUILD_BAN_FETCH_FAILED",
            Self::RolesUpdateFailed { .. } => "MEMBER_ROLES_UPDATE_FAILED",
            Self::NicknameUpdateFailed { .. } => "MEMBER_NICKNAME_UPDATE_FAILED",
            Self::KickFailed { .. } => "MEMBER_KICK_FAILED",
            Self::BanFailed { .. } => "MEMBER_BAN_FAILED",
            Self::UnbanFailed(_) => "MEMBER_UNBAN_FAILED",
            Self::DirectMessageFailed(_) => "DISCORD_USER_SEND_DM_FAILED",
            Self::BulkRequestLimit => "DISCORD_BULK_REQUEST_LIMIT",
            Self::InvalidRoleUpdateMethod(_) => "INVALID_ROLE_UPDATE_METHOD",
            Self::InvalidRoleSelection(_) => "INVALID_ROLE_SELECTION",
            Self::InvalidRecord(_) => "DB_INVALID_MODEL",
            Self::MessageTooLong { .. } => "MESSAGE_UNSENT_LENGTH_EXCEEDED",
            Self::ChannelNotFound(_) => "CHANNEL_NOT_FOUND",
            Self::InvalidChannelSelection(_) => "INVALID_CHANNEL_SELECTION",
            Self::ChannelCreateFailed(_) => "CHANNEL_CREATE_FAILED",
            Self::ChannelDeleteFailed { .. } => "CHANNEL_DELETE_FAILED",
            Self::ChannelSendFailed { .. } => "CHANNEL_SEND_FAILED",
            Self::MessageDeleteFailed { .. } => "MESSAGE_BULK_DELETE_FAILED",
            Self::BulkDeleteLimit => "MESSAGE_BULK_DELETE_LIMIT",
            Self::RoleCreateFailed(_) => "ROLE_CREATE_FAILED",
            Self::RoleDeleteFailed { .. } => "ROLE_DELETE_FAILED",
        }
    }

    /// HTTP status used when the fault is returned from the API.
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::InteractionTimeout => StatusCode::REQUEST_TIMEOUT,
            Self::SlashCommandNotFound(_)
            | Self::RecordNotFound
            | Self::EmailNotFound
            | Self::NotLinkedButInGuild { .. }
            | Self::LinkedNotInGuild { .. }
            | Self::CommunityNotCached(_)
            | Self::MemberNotInGuild(_)
            | Self::BanNotFound(_)
            | Self::ChannelNotFound(_) => StatusCode::NOT_FOUND,
            Self::AlreadyLinked(_)
            | Self::LinkedStill { .. }
            | Self::NotLinked { .. }
            | Self::MemberNotManageable(_)
            | Self::MemberNotKickable(_)
            | Self::MemberNotBannable(_)
            | Self::BulkRequestLimit
            | Self::InvalidRoleUpdateMethod(_)
            | Self::InvalidRoleSelection(_)
            | Self::InvalidRecord(_)
            | Self::MessageTooLong { .. }
            | Self::InvalidChannelSelection(_)
            | Self::BulkDeleteLimit => StatusCode::BAD_REQUEST,
            Self::Unidentified(_)
            | Self::SlashCommandSetup(_)
            | Self::LinkedBanned { .. }
            | Self::BanFetchFailed(_)
            | Self::RolesUpdateFailed { .. }
            | Self::NicknameUpdateFailed { .. }
            | Self::KickFailed { .. }
            | Self::BanFailed { .. }
            | Self::UnbanFailed(_)
            | Self::DirectMessageFailed(_)
            | Self::ChannelCreateFailed(_)
            | Self::ChannelDeleteFailed { .. }
            | Self::ChannelSendFailed { .. }
            | Self::MessageDeleteFailed { .. }
            | Self::RoleCreateFailed(_)
            | Self::RoleDeleteFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Store failures surface as unidentified faults with the driver's message.
impl From<DbErr> for Fault {
    fn from(err: DbErr) -> Self {
        Fault::unidentified(err)
    }
}
