//! The `message` command: direct messages to many members, channel posts and cleanup.

use async_trait::async_trait;
use serenity::all::Permissions;

use crate::server::{
    command::{
        definition::{
            guild_subcommand, subcommand_group, Command, CommandBuilder, GuildHandler,
            OptionDecl, OptionKind, SubcommandGroup,
        },
        format::{format_bulk_summary, EMAILS_LABEL, NO_EMAILS},
        invocation::{Invocation, MODAL_TIMEOUT},
        reply::{ModalForm, ReplyMessage},
        CommandContext,
    },
    error::{command::CommandBuildError, fault::Fault},
    model::{bulk::check_bulk_limit, platform::BULK_MESSAGE_DELETE_MAX},
    service::community::CommunityScope,
    util::parse::{parse_channel_mentions, parse_email_rows},
};

const EMAILS_FIELD: &str = "emails";
const MESSAGE_FIELD: &str = "message";
const TEXT_CHANNELS: &str = "text-channels";
const MESSAGE_TO_SEND: &str = "message-to-send";
const TARGET_CHANNEL: &str = "target-channel";
const AMOUNT_TO_DELETE: &str = "amount-to-delete";

/// Declares the `message` command tree.
pub fn command() -> Result<Command, CommandBuildError> {
    CommandBuilder::new()
        .name("message")
        .description("Message management commands.")
        .default_member_permissions(Permissions::VIEW_AUDIT_LOG)
        .dm_permission(false)
        .group(create_group()?)
        .group(delete_group()?)
        .build()
}

fn create_group() -> Result<SubcommandGroup, CommandBuildError> {
    subcommand_group(
        "create",
        "Message create commands.",
        vec![
            guild_subcommand(
                "direct-message-many-by-emails",
                "Sends a message to many discord accounts if found in this guild and linked to the given emails.",
                DirectMessageManyByEmails,
            )
            .build()?,
            guild_subcommand(
                "send-to-each-channel",
                "Sends the given message to the target text channels.",
                SendToEachChannel,
            )
            .option(
                OptionDecl::new(
                    OptionKind::String,
                    TEXT_CHANNELS,
                    "Mention text channels using the # symbol.",
                )
                .required(),
            )
            .option(
                OptionDecl::new(
                    OptionKind::String,
                    MESSAGE_TO_SEND,
                    "The message to send to target text channels.",
                )
                .required(),
            )
            .build()?,
        ],
    )
}

fn delete_group() -> Result<SubcommandGroup, CommandBuildError> {
    subcommand_group(
        "delete",
        "Message delete commands.",
        vec![guild_subcommand(
            "bulk",
            "Deletes the last N amount of messages from the specified channel.",
            DeleteBulk,
        )
        .option(
            OptionDecl::new(
                OptionKind::Channel,
                TARGET_CHANNEL,
                "The channel from which messages should be deleted.",
            )
            .required(),
        )
        .option(
            OptionDecl::new(
                OptionKind::Integer,
                AMOUNT_TO_DELETE,
                format!(
                    "Max {}. The amount of recent messages to remove.",
                    BULK_MESSAGE_DELETE_MAX
                ),
            )
            .required(),
        )
        .build()?],
    )
}

struct DirectMessageManyByEmails;

#[async_trait]
impl GuildHandler for DirectMessageManyByEmails {
    async fn handle(
        &self,
        ctx: &CommandContext<'_>,
        invocation: &mut Invocation,
        scope: &CommunityScope,
    ) -> Result<(), Fault> {
        let form = ModalForm::new("Direct message many linked discord accounts.")
            .paragraph(EMAILS_FIELD, EMAILS_LABEL)
            .paragraph(MESSAGE_FIELD, "Message to send.");
        let mut values = invocation.open_modal(form, MODAL_TIMEOUT).await?;

        let emails = parse_email_rows(&values.remove(EMAILS_FIELD).unwrap_or_default());
        let message = values.remove(MESSAGE_FIELD).unwrap_or_default();

        if emails.is_empty() {
            return invocation.reply(ReplyMessage::ephemeral(NO_EMAILS)).await;
        }
        check_bulk_limit(emails.len())?;

        invocation.defer(false).await?;

        let results = ctx
            .engine(scope)
            .dm_many(&emails, &message, Some(invocation.invoker.discord_id))
            .await?;

        invocation
            .edit_reply(ReplyMessage::public(format_bulk_summary(
                "Direct messages sent.",
                &emails,
                &results,
            )))
            .await
    }
}

struct SendToEachChannel;

#[async_trait]
impl GuildHandler for SendToEachChannel {
    async fn handle(
        &self,
        ctx: &CommandContext<'_>,
        invocation: &mut Invocation,
        scope: &CommunityScope,
    ) -> Result<(), Fault> {
        let channel_ids = parse_channel_mentions(invocation.required_string(TEXT_CHANNELS)?);
        let message = invocation.required_string(MESSAGE_TO_SEND)?.to_string();

        invocation.defer(false).await?;

        let results = ctx
            .channels(scope)
            .send_to_each_channel(&channel_ids, &message, invocation.invoker.discord_id)
            .await?;

        let inputs: Vec<String> = channel_ids.iter().map(|id| format!("<#{}>", id)).collect();

        invocation
            .edit_reply(ReplyMessage::public(format_bulk_summary(
                "Message sent.",
                &inputs,
                &results,
            )))
            .await
    }
}

struct DeleteBulk;

#[async_trait]
impl GuildHandler for DeleteBulk {
    async fn handle(
        &self,
        ctx: &CommandContext<'_>,
        invocation: &mut Invocation,
        scope: &CommunityScope,
    ) -> Result<(), Fault> {
        let channel_id = invocation.required_channel(TARGET_CHANNEL)?;
        let amount = invocation.required_integer(AMOUNT_TO_DELETE)?;

        invocation.defer(true).await?;

        let (channel, deleted) = ctx
            .channels(scope)
            .delete_recent_messages(channel_id, amount)
            .await?;

        invocation
            .edit_reply(ReplyMessage::ephemeral(format!(
                "Deleted {} messages from <#{}>.",
                deleted, channel.id
            )))
            .await
    }
}
