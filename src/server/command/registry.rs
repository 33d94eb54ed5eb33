//! Routes invocations to exactly one subcommand handler.

use std::{any::Any, collections::HashSet, panic::AssertUnwindSafe, time::Duration};

use futures::FutureExt;

use crate::server::{
    command::{
        definition::{Command, Subcommand, SubcommandHandler},
        invocation::Invocation,
        reply::ReplyMessage,
        CommandContext,
    },
    error::{
        command::CommandBuildError,
        fault::{Fault, UNIDENTIFIED_FAULT_MESSAGE},
    },
};

/// Handlers are cut off before the platform's 15 minute interaction token expires.
pub const HANDLER_TIMEOUT: Duration = Duration::from_secs(14 * 60);

/// The declared command set, keyed by unique top-level names.
pub struct CommandRegistry {
    commands: Vec<Command>,
    handler_timeout: Duration,
}

impl CommandRegistry {
    /// Creates a registry, rejecting repeated top-level command names.
    pub fn new(commands: Vec<Command>) -> Result<Self, CommandBuildError> {
        let mut seen = HashSet::new();

        for command in &commands {
            if !seen.insert(command.name.as_str()) {
                return Err(CommandBuildError::DuplicateCommand(command.name.clone()));
            }
        }

        Ok(Self {
            commands,
            handler_timeout: HANDLER_TIMEOUT,
        })
    }

    pub fn with_handler_timeout(mut self, timeout: Duration) -> Self {
        self.handler_timeout = timeout;
        self
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Finds the subcommand named by an invocation.
    ///
    /// # Returns
    /// - `Ok(&Subcommand)` - Command, group if given, and subcommand all resolved
    /// - `Err(Fault::SlashCommandNotFound)` - Any part of the path isn't declared
    pub fn resolve(&self, invocation: &Invocation) -> Result<&Subcommand, Fault> {
        let not_found = || {
            Fault::SlashCommandNotFound(format!(
                "The slash command \"{}\" was not found.",
                invocation.path()
            ))
        };

        let command = self
            .commands
            .iter()
            .find(|command| command.name == invocation.command)
            .ok_or_else(not_found)?;

        let subcommand = match &invocation.group {
            Some(group) => command
                .group(group)
                .and_then(|group| group.subcommand(&invocation.subcommand)),
            None => command.subcommand(&invocation.subcommand),
        };

        subcommand.ok_or_else(not_found)
    }

    /// Runs the handler of an invocation, containing every fault.
    ///
    /// A fault is reported to the invoker with whichever reply call the invocation's
    /// reply state allows, then logged. A panicking handler is reported as an
    /// unidentified fault and one running past the handler timeout as an interaction
    /// timeout. On success the handler owns the reply and dispatch sends nothing.
    ///
    /// # Returns
    /// - `None` - The handler completed
    /// - `Some(Fault)` - The fault that was reported to the invoker
    pub async fn dispatch(
        &self,
        ctx: &CommandContext<'_>,
        invocation: &mut Invocation,
    ) -> Option<Fault> {
        let outcome = tokio::time::timeout(
            self.handler_timeout,
            AssertUnwindSafe(self.run(ctx, invocation)).catch_unwind(),
        )
        .await;

        let fault = match outcome {
            Ok(Ok(Ok(()))) => return None,
            Ok(Ok(Err(fault))) => fault,
            Ok(Err(panic)) => {
                tracing::error!(
                    "Command \"{}\" panicked: {}",
                    invocation.path(),
                    panic_message(panic.as_ref())
                );
                Fault::Unidentified(UNIDENTIFIED_FAULT_MESSAGE.to_string())
            }
            Err(_) => Fault::InteractionTimeout,
        };

        tracing::warn!(
            "Command \"{}\" invoked by {} failed with {}: {}",
            invocation.path(),
            invocation.invoker.discord_id,
            fault.code(),
            fault
        );

        if let Err(e) = invocation
            .respond(ReplyMessage::ephemeral(fault.to_string()))
            .await
        {
            tracing::error!(
                "Failed to report fault for command \"{}\": {}",
                invocation.path(),
                e
            );
        }

        Some(fault)
    }

    async fn run(&self, ctx: &CommandContext<'_>, invocation: &mut Invocation) -> Result<(), Fault> {
        let subcommand = self.resolve(invocation)?;

        match &subcommand.handler {
            SubcommandHandler::AnyContext(handler) => handler.handle(ctx, invocation).await,
            SubcommandHandler::InGuild(handler) => {
                let community_id = invocation.community_id.ok_or_else(|| {
                    Fault::SlashCommandSetup(format!(
                        "\"{}\" can only run in a server",
                        invocation.path()
                    ))
                })?;

                let scope = ctx.load_scope(community_id).await?;

                handler.handle(ctx, invocation, &scope).await
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}
