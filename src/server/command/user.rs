//! The `user` command: staff operations on member records and their linked accounts.

use async_trait::async_trait;
use serenity::all::Permissions;

use crate::server::{
    command::{
        definition::{
            guild_subcommand, subcommand_group, Command, CommandBuilder, GuildHandler,
            OptionDecl, OptionKind, SubcommandBuilder, SubcommandGroup,
        },
        format::{format_bulk_summary, format_record, truncate_message, EMAILS_LABEL, NO_EMAILS},
        invocation::Invocation,
        reply::ReplyMessage,
        CommandContext,
    },
    error::{command::CommandBuildError, fault::Fault},
    model::{
        bulk::check_bulk_limit,
        platform::RoleSet,
        server_member::CreateServerMemberParam,
    },
    policy::role_update::{filter_admin_roles, RoleUpdateMethod},
    service::{community::CommunityScope, server_member::BanAction},
    util::parse::{parse_email_rows, parse_pasted_user_rows},
};

const EMAIL: &str = "email";
const EMAIL_OR_DISCORD_ID: &str = "email-or-discord-id";
const FIRST_NAME: &str = "first-name";
const LAST_NAME: &str = "last-name";
const STACK_ROLE: &str = "stack-role";
const COHORT_ROLE: &str = "cohort-role";
const NEW_STACK_ROLE: &str = "new-stack-role";
const NEW_COHORT_ROLE: &str = "new-cohort-role";
const ROLE_UPDATE_METHOD: &str = "role-update-method";
const ROLES: [&str; 3] = ["role-1", "role-2", "role-3"];
const DISCORD_USER: &str = "discord-user";
const SHOULD_KICK: &str = "should-kick";
const BAN_CHOICE: &str = "ban-choice";
const REASON: &str = "reason";

/// Declares the `user` command tree.
pub fn command() -> Result<Command, CommandBuildError> {
    CommandBuilder::new()
        .name("user")
        .description("Manage users in the database and in the discord server.")
        .default_member_permissions(Permissions::VIEW_AUDIT_LOG)
        .dm_permission(false)
        .group(find_group()?)
        .group(create_group()?)
        .group(update_group()?)
        .group(delete_group()?)
        .build()
}

fn identifier_option() -> OptionDecl {
    OptionDecl::new(
        OptionKind::String,
        EMAIL_OR_DISCORD_ID,
        "The target user's enrollment email or discord ID (right click to copy id).",
    )
    .required()
}

fn email_option(description: &str) -> OptionDecl {
    OptionDecl::new(OptionKind::String, EMAIL, description).required()
}

fn name_options(builder: SubcommandBuilder) -> SubcommandBuilder {
    builder
        .option(OptionDecl::new(OptionKind::String, FIRST_NAME, "First name.").required())
        .option(OptionDecl::new(OptionKind::String, LAST_NAME, "Last name.").required())
}

fn role_options(builder: SubcommandBuilder, description: &str) -> SubcommandBuilder {
    ROLES.iter().enumerate().fold(builder, |builder, (index, name)| {
        let option = OptionDecl::new(OptionKind::Role, *name, description);
        builder.option(if index == 0 { option.required() } else { option })
    })
}

fn find_group() -> Result<SubcommandGroup, CommandBuildError> {
    subcommand_group(
        "find",
        "Find users in the database.",
        vec![
            guild_subcommand("one", "Displays general information about the user.", FindOne)
                .option(identifier_option())
                .build()?,
            guild_subcommand(
                "many-by-emails",
                "Displays the users matching the pasted emails.",
                FindManyByEmails,
            )
            .build()?,
        ],
    )
}

fn create_group() -> Result<SubcommandGroup, CommandBuildError> {
    subcommand_group(
        "create",
        "Create users in the database.",
        vec![
            name_options(guild_subcommand(
                "one-student",
                "Creates a student in the database, linked once they join the server.",
                CreateOneStudent,
            ))
            .option(email_option("Their email matching the learn platform."))
            .option(
                OptionDecl::new(
                    OptionKind::Role,
                    STACK_ROLE,
                    "The stack role they will start with, or pre-bootcamp if added early.",
                )
                .required(),
            )
            .option(OptionDecl::new(
                OptionKind::Role,
                COHORT_ROLE,
                "The assigned cohort role, blank if the stack is pre-bootcamp.",
            ))
            .build()?,
            role_options(
                name_options(guild_subcommand(
                    "one-employee",
                    "Creates an employee in the database, linked once they join the server.",
                    CreateOneEmployee,
                ))
                .option(email_option("Work email.")),
                "A role the employee should have.",
            )
            .build()?,
            guild_subcommand(
                "many-students",
                "Creates many students from rows pasted from a sheet.",
                CreateManyStudents,
            )
            .option(
                OptionDecl::new(
                    OptionKind::Role,
                    STACK_ROLE,
                    "The stack role they will start with, or pre-bootcamp if added early.",
                )
                .required(),
            )
            .option(OptionDecl::new(
                OptionKind::Role,
                COHORT_ROLE,
                "The assigned cohort role, blank if the stack is pre-bootcamp.",
            ))
            .build()?,
        ],
    )
}

fn update_group() -> Result<SubcommandGroup, CommandBuildError> {
    subcommand_group(
        "update",
        "Update users in the database and in the discord server.",
        vec![
            role_options(
                guild_subcommand(
                    "roles-add-or-remove",
                    "Adds or removes roles of many users in the database and in discord.",
                    RolesAddOrRemove,
                )
                .option(
                    OptionDecl::new(
                        OptionKind::String,
                        ROLE_UPDATE_METHOD,
                        "The kind of role update to perform.",
                    )
                    .required()
                    .choice(RoleUpdateMethod::Add.as_str())
                    .choice(RoleUpdateMethod::Remove.as_str()),
                ),
                "A role to add or remove.",
            )
            .build()?,
            guild_subcommand(
                "roles-change-cohort",
                "Replaces current stack and cohort roles with the given ones.",
                RolesChangeCohort,
            )
            .option(
                OptionDecl::new(OptionKind::Role, NEW_COHORT_ROLE, "The new cohort role.").required(),
            )
            .option(
                OptionDecl::new(OptionKind::Role, NEW_STACK_ROLE, "The new stack role.").required(),
            )
            .build()?,
            guild_subcommand(
                "roles-change-status",
                "Changes roles to update status to alumni or postponed.",
                RolesChangeStatus,
            )
            .option(
                OptionDecl::new(
                    OptionKind::String,
                    ROLE_UPDATE_METHOD,
                    "The kind of role update to perform.",
                )
                .required()
                .choice(RoleUpdateMethod::ToAlumni.as_str())
                .choice(RoleUpdateMethod::Postpone.as_str()),
            )
            .build()?,
            guild_subcommand(
                "link-discord-account",
                "Links a database user with a discord user account.",
                LinkDiscordAccount,
            )
            .option(email_option("The email of the database user."))
            .option(
                OptionDecl::new(
                    OptionKind::User,
                    DISCORD_USER,
                    "The discord account to link to the database user.",
                )
                .required(),
            )
            .build()?,
            guild_subcommand(
                "unlink-discord-account",
                "Unlinks the database user from its discord account.",
                UnlinkDiscordAccount,
            )
            .option(email_option("The email of the database user."))
            .option(
                OptionDecl::new(
                    OptionKind::Boolean,
                    SHOULD_KICK,
                    "Kick the discord account from the server.",
                )
                .required(),
            )
            .build()?,
            guild_subcommand(
                "sync-linked-discord-account",
                "Pushes the database user's roles and nickname to its discord account.",
                SyncLinkedDiscordAccount,
            )
            .option(identifier_option())
            .build()?,
            guild_subcommand(
                "kick-many",
                "Resets the roles of many users, then kicks them from the server.",
                KickMany,
            )
            .build()?,
            guild_subcommand(
                "ban-or-unban-one",
                "Bans (expels) a user or unbans a user.",
                BanOrUnbanOne,
            )
            .option(identifier_option())
            .option(
                OptionDecl::new(OptionKind::String, BAN_CHOICE, "Choose to ban or unban.")
                    .required()
                    .choice("ban")
                    .choice("unban"),
            )
            .option(OptionDecl::new(
                OptionKind::String,
                REASON,
                "Reason recorded in the audit log.",
            ))
            .build()?,
        ],
    )
}

fn delete_group() -> Result<SubcommandGroup, CommandBuildError> {
    subcommand_group(
        "delete",
        "Delete users from the database.",
        vec![guild_subcommand(
            "one",
            "Deletes an unlinked user from the database.",
            DeleteOne,
        )
        .option(email_option("The email of the database user."))
        .build()?],
    )
}

/// Collects emails pasted into a modal.
///
/// # Returns
/// - `Ok(Some(Vec<String>))` - Parsed emails, the submission left unacknowledged
/// - `Ok(None)` - Nothing usable was pasted, the invoker was told so
async fn prompt_emails(invocation: &mut Invocation, title: &str) -> Result<Option<Vec<String>>, Fault> {
    let raw_rows = invocation.prompt_paragraph(title, EMAILS_LABEL).await?;
    let emails = parse_email_rows(&raw_rows);

    if emails.is_empty() {
        invocation.reply(ReplyMessage::ephemeral(NO_EMAILS)).await?;
        return Ok(None);
    }

    check_bulk_limit(emails.len())?;

    Ok(Some(emails))
}

/// Prompts for emails then applies a role update to each of them.
async fn update_many_roles(
    ctx: &CommandContext<'_>,
    invocation: &mut Invocation,
    scope: &CommunityScope,
    method: RoleUpdateMethod,
    selection: RoleSet,
) -> Result<(), Fault> {
    let Some(emails) = prompt_emails(invocation, "Update many user's roles.").await? else {
        return Ok(());
    };

    invocation.defer(false).await?;

    let results = ctx
        .engine(scope)
        .update_many_roles(&emails, method, &selection, invocation.invoker.administrator)
        .await?;

    invocation
        .edit_reply(ReplyMessage::public(format_bulk_summary(
            &format!("Role update `{}` finished.", method),
            &emails,
            &results,
        )))
        .await
}

/// Parses a method option, accepting only the methods a subcommand offers.
fn method_option(invocation: &Invocation, allowed: &[RoleUpdateMethod]) -> Result<RoleUpdateMethod, Fault> {
    let value = invocation.required_string(ROLE_UPDATE_METHOD)?;
    let method: RoleUpdateMethod = value.parse()?;

    if !allowed.contains(&method) {
        return Err(Fault::InvalidRoleUpdateMethod(value.to_string()));
    }

    Ok(method)
}

struct FindOne;

#[async_trait]
impl GuildHandler for FindOne {
    async fn handle(
        &self,
        ctx: &CommandContext<'_>,
        invocation: &mut Invocation,
        scope: &CommunityScope,
    ) -> Result<(), Fault> {
        invocation.defer(false).await?;

        let identifier = invocation.required_string(EMAIL_OR_DISCORD_ID)?;
        let record = ctx.engine(scope).find_one(identifier).await?;

        invocation
            .edit_reply(ReplyMessage::public(format_record(&record)))
            .await
    }
}

struct FindManyByEmails;

#[async_trait]
impl GuildHandler for FindManyByEmails {
    async fn handle(
        &self,
        ctx: &CommandContext<'_>,
        invocation: &mut Invocation,
        scope: &CommunityScope,
    ) -> Result<(), Fault> {
        let Some(emails) = prompt_emails(invocation, "Find many users.").await? else {
            return Ok(());
        };

        invocation.defer(false).await?;

        let results = ctx.engine(scope).find_many_by_emails(&emails).await;

        let mut content = format_bulk_summary("Users found.", &emails, &results);
        for record in results.results.iter().flatten() {
            content.push_str(&format!(
                "\n{} - {}",
                record.email,
                record
                    .discord_id
                    .map(|id| format!("<@{}>", id))
                    .unwrap_or_else(|| "not linked".to_string())
            ));
        }

        invocation
            .edit_reply(ReplyMessage::public(truncate_message(content)))
            .await
    }
}

struct CreateOneStudent;

#[async_trait]
impl GuildHandler for CreateOneStudent {
    async fn handle(
        &self,
        ctx: &CommandContext<'_>,
        invocation: &mut Invocation,
        scope: &CommunityScope,
    ) -> Result<(), Fault> {
        let mut roles = invocation.roles(&[STACK_ROLE, COHORT_ROLE]);
        roles.insert(scope.taxonomy.key.student);

        let param = CreateServerMemberParam {
            email: invocation.required_string(EMAIL)?.to_string(),
            first_name: invocation.required_string(FIRST_NAME)?.to_string(),
            last_name: invocation.required_string(LAST_NAME)?.to_string(),
            discord_id: None,
            roles,
        };

        let record = ctx.engine(scope).create(param).await?;

        invocation
            .reply(ReplyMessage::public(format!(
                "Created student.\n{}",
                format_record(&record)
            )))
            .await
    }
}

struct CreateOneEmployee;

#[async_trait]
impl GuildHandler for CreateOneEmployee {
    async fn handle(
        &self,
        ctx: &CommandContext<'_>,
        invocation: &mut Invocation,
        scope: &CommunityScope,
    ) -> Result<(), Fault> {
        let selection = filter_admin_roles(
            &invocation.roles(&ROLES),
            &scope.taxonomy,
            invocation.invoker.administrator,
        );
        let mut roles = selection;
        roles.insert(scope.taxonomy.key.employee);

        let param = CreateServerMemberParam {
            email: invocation.required_string(EMAIL)?.to_string(),
            first_name: invocation.required_string(FIRST_NAME)?.to_string(),
            last_name: invocation.required_string(LAST_NAME)?.to_string(),
            discord_id: None,
            roles,
        };

        let record = ctx.engine(scope).create(param).await?;

        invocation
            .reply(ReplyMessage::public(format!(
                "Created employee.\n{}",
                format_record(&record)
            )))
            .await
    }
}

struct CreateManyStudents;

#[async_trait]
impl GuildHandler for CreateManyStudents {
    async fn handle(
        &self,
        ctx: &CommandContext<'_>,
        invocation: &mut Invocation,
        scope: &CommunityScope,
    ) -> Result<(), Fault> {
        let mut roles = invocation.roles(&[STACK_ROLE, COHORT_ROLE]);
        roles.insert(scope.taxonomy.key.student);

        let raw_rows = invocation
            .prompt_paragraph(
                "Create many students.",
                "First name, last name and email separated by tabs",
            )
            .await?;
        let params = parse_pasted_user_rows(&raw_rows, &roles);

        if params.is_empty() {
            return invocation
                .reply(ReplyMessage::ephemeral("No user rows were received."))
                .await;
        }

        invocation.defer(false).await?;

        let inputs: Vec<String> = params
            .iter()
            .enumerate()
            .map(|(index, param)| format!("row {} ({})", index + 1, param.email))
            .collect();
        let results = ctx.engine(scope).create_many(params).await?;

        invocation
            .edit_reply(ReplyMessage::public(format_bulk_summary(
                "Students created.",
                &inputs,
                &results,
            )))
            .await
    }
}

struct RolesAddOrRemove;

#[async_trait]
impl GuildHandler for RolesAddOrRemove {
    async fn handle(
        &self,
        ctx: &CommandContext<'_>,
        invocation: &mut Invocation,
        scope: &CommunityScope,
    ) -> Result<(), Fault> {
        let method = method_option(invocation, &[RoleUpdateMethod::Add, RoleUpdateMethod::Remove])?;
        let selection = invocation.roles(&ROLES);

        update_many_roles(ctx, invocation, scope, method, selection).await
    }
}

struct RolesChangeCohort;

#[async_trait]
impl GuildHandler for RolesChangeCohort {
    async fn handle(
        &self,
        ctx: &CommandContext<'_>,
        invocation: &mut Invocation,
        scope: &CommunityScope,
    ) -> Result<(), Fault> {
        let selection = invocation.roles(&[NEW_COHORT_ROLE, NEW_STACK_ROLE]);

        update_many_roles(ctx, invocation, scope, RoleUpdateMethod::ChangeCohort, selection).await
    }
}

struct RolesChangeStatus;

#[async_trait]
impl GuildHandler for RolesChangeStatus {
    async fn handle(
        &self,
        ctx: &CommandContext<'_>,
        invocation: &mut Invocation,
        scope: &CommunityScope,
    ) -> Result<(), Fault> {
        let method = method_option(
            invocation,
            &[RoleUpdateMethod::ToAlumni, RoleUpdateMethod::Postpone],
        )?;

        update_many_roles(ctx, invocation, scope, method, RoleSet::new()).await
    }
}

struct LinkDiscordAccount;

#[async_trait]
impl GuildHandler for LinkDiscordAccount {
    async fn handle(
        &self,
        ctx: &CommandContext<'_>,
        invocation: &mut Invocation,
        scope: &CommunityScope,
    ) -> Result<(), Fault> {
        let email = invocation.required_string(EMAIL)?;
        let discord_id = invocation.required_user(DISCORD_USER)?;

        let record = ctx.engine(scope).link(email, discord_id).await?;

        invocation
            .reply(ReplyMessage::public(format!(
                "Linked.\n{}",
                format_record(&record)
            )))
            .await
    }
}

struct UnlinkDiscordAccount;

#[async_trait]
impl GuildHandler for UnlinkDiscordAccount {
    async fn handle(
        &self,
        ctx: &CommandContext<'_>,
        invocation: &mut Invocation,
        scope: &CommunityScope,
    ) -> Result<(), Fault> {
        let email = invocation.required_string(EMAIL)?;
        let kick = invocation.boolean(SHOULD_KICK).unwrap_or(false);

        let record = ctx.engine(scope).unlink(email, kick).await?;

        invocation
            .reply(ReplyMessage::public(format!(
                "Unlinked{}.\n{}",
                if kick { " and kicked" } else { "" },
                format_record(&record)
            )))
            .await
    }
}

struct SyncLinkedDiscordAccount;

#[async_trait]
impl GuildHandler for SyncLinkedDiscordAccount {
    async fn handle(
        &self,
        ctx: &CommandContext<'_>,
        invocation: &mut Invocation,
        scope: &CommunityScope,
    ) -> Result<(), Fault> {
        invocation.defer(false).await?;

        let identifier = invocation.required_string(EMAIL_OR_DISCORD_ID)?;
        let record = ctx.engine(scope).sync_linked(identifier).await?;

        invocation
            .edit_reply(ReplyMessage::public(format!(
                "Synced.\n{}",
                format_record(&record)
            )))
            .await
    }
}

struct KickMany;

#[async_trait]
impl GuildHandler for KickMany {
    async fn handle(
        &self,
        ctx: &CommandContext<'_>,
        invocation: &mut Invocation,
        scope: &CommunityScope,
    ) -> Result<(), Fault> {
        let Some(emails) = prompt_emails(invocation, "Kick many users.").await? else {
            return Ok(());
        };

        invocation.defer(false).await?;

        let results = ctx.engine(scope).kick_many(&emails).await?;

        invocation
            .edit_reply(ReplyMessage::public(format_bulk_summary(
                "Kick finished.",
                &emails,
                &results,
            )))
            .await
    }
}

struct BanOrUnbanOne;

#[async_trait]
impl GuildHandler for BanOrUnbanOne {
    async fn handle(
        &self,
        ctx: &CommandContext<'_>,
        invocation: &mut Invocation,
        scope: &CommunityScope,
    ) -> Result<(), Fault> {
        let identifier = invocation.required_string(EMAIL_OR_DISCORD_ID)?;
        let action: BanAction = invocation.required_string(BAN_CHOICE)?.parse()?;
        let reason = invocation.string(REASON);

        let discord_id = ctx
            .engine(scope)
            .ban_or_unban(identifier, action, reason)
            .await?;

        let verb = match action {
            BanAction::Ban => "Banned",
            BanAction::Unban => "Unbanned",
        };

        invocation
            .reply(ReplyMessage::public(format!(
                "{} <@{}> ({}).",
                verb, discord_id, discord_id
            )))
            .await
    }
}

struct DeleteOne;

#[async_trait]
impl GuildHandler for DeleteOne {
    async fn handle(
        &self,
        ctx: &CommandContext<'_>,
        invocation: &mut Invocation,
        scope: &CommunityScope,
    ) -> Result<(), Fault> {
        let email = invocation.required_string(EMAIL)?;

        ctx.engine(scope).delete(email).await?;

        let content = format!("Deleted the user with email {}.", email);
        invocation.reply(ReplyMessage::public(content)).await
    }
}
