//! The `member` command: self-service for members, usable in direct messages.

use async_trait::async_trait;

use crate::server::{
    command::{
        definition::{
            AnyHandler, Command, CommandBuilder, OptionDecl, OptionKind, SubcommandBuilder,
            SubcommandGroupBuilder, SubcommandHandler,
        },
        invocation::Invocation,
        reply::ReplyMessage,
        CommandContext,
    },
    error::{command::CommandBuildError, fault::Fault},
};

const ENROLLMENT_EMAIL: &str = "enrollment-email";

pub const DIRECT_MESSAGE_ONLY: &str = "This command is only usable in a direct message to the bot.";

/// Declares the `member` command tree.
pub fn command() -> Result<Command, CommandBuildError> {
    let link = SubcommandBuilder::new()
        .name("link-discord-account")
        .description("Links your discord account to your enrollment.")
        .option(
            OptionDecl::new(
                OptionKind::String,
                ENROLLMENT_EMAIL,
                "The email that you used to enroll.",
            )
            .required(),
        )
        .handler(SubcommandHandler::any_context(LinkOwnDiscordAccount))
        .build()?;

    let update = SubcommandGroupBuilder::new()
        .name("update")
        .description("Update your account.")
        .subcommand(link)
        .build()?;

    CommandBuilder::new()
        .name("member")
        .description("Commands for members to manage their account.")
        .dm_permission(true)
        .group(update)
        .build()
}

/// Links the invoker's own account to the record of the given email in the home community.
struct LinkOwnDiscordAccount;

#[async_trait]
impl AnyHandler for LinkOwnDiscordAccount {
    async fn handle(
        &self,
        ctx: &CommandContext<'_>,
        invocation: &mut Invocation,
    ) -> Result<(), Fault> {
        if invocation.community_id.is_some() {
            return invocation
                .reply(ReplyMessage::ephemeral(DIRECT_MESSAGE_ONLY))
                .await;
        }

        let scope = ctx.load_scope(ctx.home_community_id).await?;
        let email = invocation.required_string(ENROLLMENT_EMAIL)?;

        let content = match ctx
            .engine(&scope)
            .link(email, invocation.invoker.discord_id)
            .await
        {
            Ok(_) => "Success! Your discord account is linked.".to_string(),
            Err(fault @ Fault::AlreadyLinked(_)) => format!(
                "{} If you already linked a different account please log into that discord account.",
                fault
            ),
            Err(fault) => return Err(fault),
        };

        invocation.reply(ReplyMessage::ephemeral(content)).await
    }
}
