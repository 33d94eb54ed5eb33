//! The `channel` command: cohort channels and program categories.

use async_trait::async_trait;
use serenity::all::Permissions;

use crate::server::{
    command::{
        definition::{
            guild_subcommand, subcommand_group, Command, CommandBuilder, GuildHandler,
            OptionDecl, OptionKind, SubcommandGroup,
        },
        invocation::Invocation,
        reply::ReplyMessage,
        CommandContext,
    },
    error::{command::CommandBuildError, fault::Fault},
    service::{channel::Program, community::CommunityScope},
};

const NEW_CHANNEL_NAME: &str = "hyphenated-new-channel-name";
const TARGET_CATEGORY: &str = "target-channel-category";
const COHORT_ROLE: &str = "cohort-role";
const OLD_CHANNEL: &str = "old-channel-to-delete";
const PROGRAM: &str = "domestic-or-international";
const NEW_CATEGORY_NAME: &str = "hyphenated-new-category-name";
const INTERNAL_ROLE: &str = "internal-role";

/// Declares the `channel` command tree.
pub fn command() -> Result<Command, CommandBuildError> {
    CommandBuilder::new()
        .name("channel")
        .description("Channel management commands.")
        .default_member_permissions(Permissions::VIEW_AUDIT_LOG)
        .dm_permission(false)
        .group(create_group()?)
        .build()
}

fn create_group() -> Result<SubcommandGroup, CommandBuildError> {
    subcommand_group(
        "create",
        "Channel create commands.",
        vec![
            guild_subcommand(
                "cohort",
                "Creates a new cohort channel with the proper permissions & optionally deletes the old channel.",
                CreateCohort,
            )
            .option(
                OptionDecl::new(
                    OptionKind::String,
                    NEW_CHANNEL_NAME,
                    "The name of the new cohort channel delimited by hyphens, e.g., neil-m.",
                )
                .required(),
            )
            .option(
                OptionDecl::new(
                    OptionKind::Channel,
                    TARGET_CATEGORY,
                    "The stack / program category the new channel should be created under.",
                )
                .required(),
            )
            .option(
                OptionDecl::new(
                    OptionKind::Role,
                    COHORT_ROLE,
                    "The cohort role that needs access to the new cohort channel.",
                )
                .required(),
            )
            .option(OptionDecl::new(
                OptionKind::Channel,
                OLD_CHANNEL,
                "The old cohort channel to delete if it's unused.",
            ))
            .build()?,
            guild_subcommand(
                "program-category",
                "Creates a new category for a program.",
                CreateProgramCategory,
            )
            .option(
                OptionDecl::new(
                    OptionKind::String,
                    PROGRAM,
                    "Whether the category is for the domestic or international program.",
                )
                .required()
                .choice(Program::Domestic.as_str())
                .choice(Program::International.as_str()),
            )
            .option(
                OptionDecl::new(
                    OptionKind::String,
                    NEW_CATEGORY_NAME,
                    "Hyphenated name for the new category.",
                )
                .required(),
            )
            .option(
                OptionDecl::new(
                    OptionKind::Role,
                    INTERNAL_ROLE,
                    "@internal-stack-role for domestic. @internal-cohort-role for international.",
                )
                .required(),
            )
            .build()?,
        ],
    )
}

struct CreateCohort;

#[async_trait]
impl GuildHandler for CreateCohort {
    async fn handle(
        &self,
        ctx: &CommandContext<'_>,
        invocation: &mut Invocation,
        scope: &CommunityScope,
    ) -> Result<(), Fault> {
        let name = invocation.required_string(NEW_CHANNEL_NAME)?;
        let category_id = invocation.required_channel(TARGET_CATEGORY)?;
        let cohort_role_id = invocation.required_role(COHORT_ROLE)?;
        let old_channel_id = invocation.channel(OLD_CHANNEL);

        let created = ctx
            .channels(scope)
            .create_cohort_channel(name, category_id, cohort_role_id, old_channel_id)
            .await?;

        let mut content = format!("Created <#{}>.", created.channel.id);
        if let Some(deleted) = created.deleted {
            content.push_str(&format!("\nDeleted #{}.", deleted.name));
        }

        invocation.reply(ReplyMessage::public(content)).await
    }
}

struct CreateProgramCategory;

#[async_trait]
impl GuildHandler for CreateProgramCategory {
    async fn handle(
        &self,
        ctx: &CommandContext<'_>,
        invocation: &mut Invocation,
        scope: &CommunityScope,
    ) -> Result<(), Fault> {
        let program: Program = invocation.required_string(PROGRAM)?.parse()?;
        let name = invocation.required_string(NEW_CATEGORY_NAME)?;
        let internal_role_id = invocation.required_role(INTERNAL_ROLE)?;

        let created = ctx
            .channels(scope)
            .create_program_category(program, name, internal_role_id)
            .await?;

        invocation
            .reply(ReplyMessage::public(format!(
                "Click this new channel <#{}> to see the new category. Rename or remove the new channel as needed.",
                created.general.id
            )))
            .await
    }
}
