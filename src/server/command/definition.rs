//! Declared command tree: commands, subcommand groups, subcommands and their options.
//!
//! Trees are composed with validating builders once at startup. Every `build` returns a
//! [`CommandBuildError`] for a malformed node so a bad tree aborts startup instead of
//! drifting from what was meant to be deployed.

use std::collections::HashSet;

use async_trait::async_trait;
use serenity::all::Permissions;

use crate::server::{
    command::{invocation::Invocation, CommandContext},
    error::{command::CommandBuildError, fault::Fault},
    service::community::CommunityScope,
};

/// Handler of a subcommand that only runs inside a community.
#[async_trait]
pub trait GuildHandler: Send + Sync {
    async fn handle(
        &self,
        ctx: &CommandContext<'_>,
        invocation: &mut Invocation,
        scope: &CommunityScope,
    ) -> Result<(), Fault>;
}

/// Handler of a subcommand that runs in a community or in direct messages.
#[async_trait]
pub trait AnyHandler: Send + Sync {
    async fn handle(
        &self,
        ctx: &CommandContext<'_>,
        invocation: &mut Invocation,
    ) -> Result<(), Fault>;
}

/// Handler variant of a subcommand.
///
/// The dispatcher loads the community scope before calling an `InGuild` handler.
pub enum SubcommandHandler {
    InGuild(Box<dyn GuildHandler>),
    AnyContext(Box<dyn AnyHandler>),
}

impl SubcommandHandler {
    pub fn in_guild(handler: impl GuildHandler + 'static) -> Self {
        Self::InGuild(Box::new(handler))
    }

    pub fn any_context(handler: impl AnyHandler + 'static) -> Self {
        Self::AnyContext(Box::new(handler))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    String,
    Integer,
    Boolean,
    User,
    Role,
    Channel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionChoice {
    pub name: String,
    pub value: String,
}

/// Option accepted by a subcommand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionDecl {
    pub name: String,
    pub description: String,
    pub kind: OptionKind,
    pub required: bool,
    pub choices: Vec<OptionChoice>,
}

impl OptionDecl {
    pub fn new(kind: OptionKind, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            kind,
            required: false,
            choices: Vec::new(),
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Adds a choice whose display name is its value.
    pub fn choice(mut self, value: impl Into<String>) -> Self {
        let value = value.into();
        self.choices.push(OptionChoice {
            name: value.clone(),
            value,
        });
        self
    }
}

pub struct Subcommand {
    pub name: String,
    pub description: String,
    pub options: Vec<OptionDecl>,
    pub handler: SubcommandHandler,
}

pub struct SubcommandGroup {
    pub name: String,
    pub description: String,
    pub subcommands: Vec<Subcommand>,
}

impl SubcommandGroup {
    pub fn subcommand(&self, name: &str) -> Option<&Subcommand> {
        self.subcommands.iter().find(|sub| sub.name == name)
    }
}

/// Top-level command.
pub struct Command {
    pub name: String,
    pub description: String,
    /// Permissions a member needs to see the command, `None` for everyone.
    pub default_member_permissions: Option<Permissions>,
    /// Whether the command can be invoked in direct messages.
    pub dm_permission: bool,
    pub groups: Vec<SubcommandGroup>,
    pub subcommands: Vec<Subcommand>,
}

impl Command {
    pub fn group(&self, name: &str) -> Option<&SubcommandGroup> {
        self.groups.iter().find(|group| group.name == name)
    }

    pub fn subcommand(&self, name: &str) -> Option<&Subcommand> {
        self.subcommands.iter().find(|sub| sub.name == name)
    }

    fn all_subcommands(&self) -> impl Iterator<Item = &Subcommand> {
        self.subcommands
            .iter()
            .chain(self.groups.iter().flat_map(|group| group.subcommands.iter()))
    }
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_lowercase() || c == '-')
}

fn validate_name(kind: &'static str, name: Option<String>) -> Result<String, CommandBuildError> {
    let name = name.ok_or(CommandBuildError::MissingName { kind })?;

    if !is_valid_name(&name) {
        return Err(CommandBuildError::InvalidName { kind, name });
    }

    Ok(name)
}

fn validate_description(
    kind: &'static str,
    name: &str,
    description: Option<String>,
) -> Result<String, CommandBuildError> {
    match description {
        Some(description) if !description.trim().is_empty() => Ok(description),
        _ => Err(CommandBuildError::MissingDescription {
            kind,
            name: name.to_string(),
        }),
    }
}

/// Rejects subcommands repeating a name already used under the same parent.
fn check_unique_subcommands<'a>(
    names: impl Iterator<Item = &'a str>,
    parent: &str,
    taken: &mut HashSet<String>,
) -> Result<(), CommandBuildError> {
    for name in names {
        if !taken.insert(name.to_string()) {
            return Err(CommandBuildError::DuplicateSubcommand {
                subcommand: name.to_string(),
                parent: parent.to_string(),
            });
        }
    }

    Ok(())
}

#[derive(Default)]
pub struct SubcommandBuilder {
    name: Option<String>,
    description: Option<String>,
    options: Vec<OptionDecl>,
    handler: Option<SubcommandHandler>,
}

impl SubcommandBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn option(mut self, option: OptionDecl) -> Self {
        self.options.push(option);
        self
    }

    pub fn handler(mut self, handler: SubcommandHandler) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Validates and builds the subcommand.
    ///
    /// # Returns
    /// - `Ok(Subcommand)` - Named, described, with uniquely named options and a handler
    /// - `Err(CommandBuildError)` - The first problem found
    pub fn build(self) -> Result<Subcommand, CommandBuildError> {
        let name = validate_name("subcommand", self.name)?;
        let description = validate_description("subcommand", &name, self.description)?;

        let mut seen = HashSet::new();
        for option in &self.options {
            let option_name = validate_name("option", Some(option.name.clone()))?;
            validate_description("option", &option_name, Some(option.description.clone()))?;

            if !seen.insert(option_name.clone()) {
                return Err(CommandBuildError::DuplicateOption {
                    option: option_name,
                    subcommand: name,
                });
            }
        }

        // A subcommand without a handler has nothing to dispatch to, same as an empty tree.
        let handler = self.handler.ok_or_else(|| CommandBuildError::Empty(name.clone()))?;

        Ok(Subcommand {
            name,
            description,
            options: self.options,
            handler,
        })
    }
}

/// Subcommand builder with a name, a description and a guild-only handler.
pub fn guild_subcommand(
    name: &str,
    description: &str,
    handler: impl GuildHandler + 'static,
) -> SubcommandBuilder {
    SubcommandBuilder::new()
        .name(name)
        .description(description)
        .handler(SubcommandHandler::in_guild(handler))
}

#[derive(Default)]
pub struct SubcommandGroupBuilder {
    name: Option<String>,
    description: Option<String>,
    subcommands: Vec<Subcommand>,
}

impl SubcommandGroupBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn subcommand(mut self, subcommand: Subcommand) -> Self {
        self.subcommands.push(subcommand);
        self
    }

    pub fn build(self) -> Result<SubcommandGroup, CommandBuildError> {
        let name = validate_name("subcommand group", self.name)?;
        let description = validate_description("subcommand group", &name, self.description)?;

        if self.subcommands.is_empty() {
            return Err(CommandBuildError::Empty(name));
        }

        check_unique_subcommands(
            self.subcommands.iter().map(|sub| sub.name.as_str()),
            &name,
            &mut HashSet::new(),
        )?;

        Ok(SubcommandGroup {
            name,
            description,
            subcommands: self.subcommands,
        })
    }
}

/// Builds a group holding `subcommands`.
pub fn subcommand_group(
    name: &str,
    description: &str,
    subcommands: Vec<Subcommand>,
) -> Result<SubcommandGroup, CommandBuildError> {
    subcommands
        .into_iter()
        .fold(
            SubcommandGroupBuilder::new().name(name).description(description),
            |builder, sub| builder.subcommand(sub),
        )
        .build()
}

#[derive(Default)]
pub struct CommandBuilder {
    name: Option<String>,
    description: Option<String>,
    default_member_permissions: Option<Permissions>,
    dm_permission: bool,
    groups: Vec<SubcommandGroup>,
    subcommands: Vec<Subcommand>,
}

impl CommandBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn default_member_permissions(mut self, permissions: Permissions) -> Self {
        self.default_member_permissions = Some(permissions);
        self
    }

    pub fn dm_permission(mut self, allowed: bool) -> Self {
        self.dm_permission = allowed;
        self
    }

    pub fn group(mut self, group: SubcommandGroup) -> Self {
        self.groups.push(group);
        self
    }

    pub fn subcommand(mut self, subcommand: Subcommand) -> Self {
        self.subcommands.push(subcommand);
        self
    }

    /// Validates and builds the command.
    ///
    /// Group and subcommand names share one namespace under the command. A command that
    /// allows direct messages must only hold any-context handlers since no community can
    /// be resolved there.
    pub fn build(self) -> Result<Command, CommandBuildError> {
        let name = validate_name("command", self.name)?;
        let description = validate_description("command", &name, self.description)?;

        if self.groups.is_empty() && self.subcommands.is_empty() {
            return Err(CommandBuildError::Empty(name));
        }

        let mut taken = HashSet::new();
        for group in &self.groups {
            if !taken.insert(group.name.clone()) {
                return Err(CommandBuildError::DuplicateGroup {
                    group: group.name.clone(),
                    command: name,
                });
            }
        }
        check_unique_subcommands(
            self.subcommands.iter().map(|sub| sub.name.as_str()),
            &name,
            &mut taken,
        )?;

        let command = Command {
            name,
            description,
            default_member_permissions: self.default_member_permissions,
            dm_permission: self.dm_permission,
            groups: self.groups,
            subcommands: self.subcommands,
        };

        if command.dm_permission {
            if let Some(sub) = command
                .all_subcommands()
                .find(|sub| matches!(sub.handler, SubcommandHandler::InGuild(_)))
            {
                return Err(CommandBuildError::DmRequiresAnyContext {
                    command: command.name.clone(),
                    subcommand: sub.name.clone(),
                });
            }
        }

        Ok(command)
    }
}
