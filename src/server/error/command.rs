use thiserror::Error;

/// Errors raised while composing the command tree at startup.
///
/// These are programmer errors: a tree that fails to build must abort startup rather
/// than run with a declared set that differs from what was meant to be deployed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandBuildError {
    #[error("The {kind} name is undefined: set a name before building.")]
    MissingName { kind: &'static str },

    #[error("The {kind} \"{name}\" description is undefined: set a description before building.")]
    MissingDescription { kind: &'static str, name: String },

    #[error("The {kind} name \"{name}\" is invalid: only lowercase letters and hyphens are allowed.")]
    InvalidName { kind: &'static str, name: String },

    #[error("Subcommand \"{subcommand}\" has already been used in the \"{parent}\" command group.")]
    DuplicateSubcommand { subcommand: String, parent: String },

    #[error("Command group \"{group}\" has already been used in the \"{command}\" command.")]
    DuplicateGroup { group: String, command: String },

    #[error("Duplicate option name \"{option}\" in the \"{subcommand}\" subcommand.")]
    DuplicateOption { option: String, subcommand: String },

    #[error("Duplicate slash command name: \"{0}\".")]
    DuplicateCommand(String),

    #[error("The \"{0}\" command has no subcommands.")]
    Empty(String),

    #[error("The \"{command}\" command allows direct messages so the \"{subcommand}\" subcommand must handle any context.")]
    DmRequiresAnyContext { command: String, subcommand: String },
}
