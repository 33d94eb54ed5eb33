//! The `role` command: cohort role creation and bulk role deletion.

use async_trait::async_trait;
use serenity::all::Permissions;

use crate::server::{
    command::{
        definition::{
            guild_subcommand, subcommand_group, Command, CommandBuilder, GuildHandler,
            OptionDecl, OptionKind, SubcommandGroup,
        },
        format::format_bulk_summary,
        invocation::{Invocation, MODAL_TIMEOUT},
        reply::{ModalForm, ReplyMessage},
        CommandContext,
    },
    error::{command::CommandBuildError, fault::Fault},
    service::community::CommunityScope,
    util::parse::parse_role_mentions,
};

const COHORT_NAME: &str = "cohort-name";
const ROLES_TO_DELETE: &str = "roles-to-delete";
const CONFIRM_FIELD: &str = "confirm";
/// Text the invoker types to confirm a deletion.
pub const CONFIRM_DELETE: &str = "DELETE";
pub const DELETE_CANCELED: &str = "Role deletion canceled.";

/// Declares the `role` command tree.
///
/// Only members allowed to manage roles see it, since every subcommand creates or
/// deletes roles.
pub fn command() -> Result<Command, CommandBuildError> {
    CommandBuilder::new()
        .name("role")
        .description("Role management commands.")
        .default_member_permissions(Permissions::MANAGE_ROLES)
        .dm_permission(false)
        .group(create_group()?)
        .group(delete_group()?)
        .build()
}

fn create_group() -> Result<SubcommandGroup, CommandBuildError> {
    subcommand_group(
        "create",
        "Role create commands.",
        vec![guild_subcommand(
            "cohort-role",
            "Creates a role for new cohort.",
            CreateCohortRole,
        )
        .option(
            OptionDecl::new(
                OptionKind::String,
                COHORT_NAME,
                "Typically named: FirstNameLastInitial.",
            )
            .required(),
        )
        .build()?],
    )
}

fn delete_group() -> Result<SubcommandGroup, CommandBuildError> {
    subcommand_group(
        "delete",
        "Role delete commands.",
        vec![guild_subcommand("many", "Deletes the specified roles.", DeleteMany)
            .option(
                OptionDecl::new(
                    OptionKind::String,
                    ROLES_TO_DELETE,
                    "Mention the roles to delete using @.",
                )
                .required(),
            )
            .build()?],
    )
}

struct CreateCohortRole;

#[async_trait]
impl GuildHandler for CreateCohortRole {
    async fn handle(
        &self,
        ctx: &CommandContext<'_>,
        invocation: &mut Invocation,
        scope: &CommunityScope,
    ) -> Result<(), Fault> {
        let name = invocation.required_string(COHORT_NAME)?;

        let role = ctx.roles(scope).create_cohort_role(name).await?;

        invocation
            .reply(ReplyMessage::public(format!("New role: <@&{}>", role.id)))
            .await
    }
}

/// Deletes the mentioned roles once the invoker confirms in a modal.
struct DeleteMany;

#[async_trait]
impl GuildHandler for DeleteMany {
    async fn handle(
        &self,
        ctx: &CommandContext<'_>,
        invocation: &mut Invocation,
        scope: &CommunityScope,
    ) -> Result<(), Fault> {
        let role_ids = parse_role_mentions(invocation.required_string(ROLES_TO_DELETE)?);

        if role_ids.is_empty() {
            return invocation
                .reply(ReplyMessage::ephemeral("No roles were mentioned."))
                .await;
        }

        let form = ModalForm::new("Delete these roles forever?").paragraph(
            CONFIRM_FIELD,
            format!("Type {} to delete {} role(s)", CONFIRM_DELETE, role_ids.len()),
        );
        let values = invocation.open_modal(form, MODAL_TIMEOUT).await?;

        let confirmed = values
            .get(CONFIRM_FIELD)
            .is_some_and(|value| value.trim().eq_ignore_ascii_case(CONFIRM_DELETE));
        if !confirmed {
            return invocation
                .reply(ReplyMessage::ephemeral(DELETE_CANCELED))
                .await;
        }

        invocation.defer(true).await?;

        let inputs: Vec<String> = role_ids
            .iter()
            .map(|role_id| match scope.community.role(*role_id) {
                Some(role) => role.name.clone(),
                None => role_id.to_string(),
            })
            .collect();
        let results = ctx.roles(scope).delete_many(&role_ids).await?;

        invocation
            .edit_reply(ReplyMessage::ephemeral(format_bulk_summary(
                "Roles deleted.",
                &inputs,
                &results,
            )))
            .await
    }
}
