//! Slash command interactions.
//!
//! Adapts serenity's `CommandInteraction` into an [`Invocation`] answered through a
//! [`DiscordResponder`], then hands it to the command registry.

use std::{collections::HashMap, time::Duration};

use async_trait::async_trait;
use serenity::all::{
    CommandInteraction, Context, CreateInteractionResponse, CreateInteractionResponseFollowup,
    CreateInteractionResponseMessage, CreateQuickModal, EditInteractionResponse,
    ModalInteraction, ResolvedOption, ResolvedValue,
};

use crate::server::{
    bot::handler::Handler,
    command::{
        invocation::{Invocation, Invoker, OptionValue},
        reply::{ModalForm, ModalSubmission, ReplyMessage, Responder},
        CommandContext,
    },
    data::ServerMemberRepository,
    error::fault::Fault,
    gateway::DiscordGateway,
};

/// Interaction a responder answers.
enum Answered {
    Command(CommandInteraction),
    Modal(ModalInteraction),
}

/// Responder issuing interaction calls against the Discord API.
pub struct DiscordResponder {
    ctx: Context,
    interaction: Answered,
}

impl DiscordResponder {
    pub fn for_command(ctx: Context, interaction: CommandInteraction) -> Self {
        Self {
            ctx,
            interaction: Answered::Command(interaction),
        }
    }

    fn for_modal(ctx: Context, interaction: ModalInteraction) -> Self {
        Self {
            ctx,
            interaction: Answered::Modal(interaction),
        }
    }
}

#[async_trait]
impl Responder for DiscordResponder {
    async fn reply(&self, message: &ReplyMessage) -> Result<(), Fault> {
        let response = CreateInteractionResponse::Message(
            CreateInteractionResponseMessage::new()
                .content(&message.content)
                .ephemeral(message.ephemeral),
        );

        let result = match &self.interaction {
            Answered::Command(interaction) => {
                interaction.create_response(&self.ctx.http, response).await
            }
            Answered::Modal(interaction) => {
                interaction.create_response(&self.ctx.http, response).await
            }
        };

        result.map_err(Fault::unidentified)
    }

    async fn defer(&self, ephemeral: bool) -> Result<(), Fault> {
        let result = match (&self.interaction, ephemeral) {
            (Answered::Command(interaction), true) => {
                interaction.defer_ephemeral(&self.ctx.http).await
            }
            (Answered::Command(interaction), false) => interaction.defer(&self.ctx.http).await,
            (Answered::Modal(interaction), true) => {
                interaction.defer_ephemeral(&self.ctx.http).await
            }
            (Answered::Modal(interaction), false) => interaction.defer(&self.ctx.http).await,
        };

        result.map_err(Fault::unidentified)
    }

    async fn edit_reply(&self, message: &ReplyMessage) -> Result<(), Fault> {
        let edit = EditInteractionResponse::new()
            .content(&message.content)
            .components(vec![]);

        let result = match &self.interaction {
            Answered::Command(interaction) => interaction.edit_response(&self.ctx.http, edit).await,
            Answered::Modal(interaction) => interaction.edit_response(&self.ctx.http, edit).await,
        };

        result.map(|_| ()).map_err(Fault::unidentified)
    }

    async fn follow_up(&self, message: &ReplyMessage) -> Result<(), Fault> {
        let follow_up = CreateInteractionResponseFollowup::new()
            .content(&message.content)
            .ephemeral(message.ephemeral);

        let result = match &self.interaction {
            Answered::Command(interaction) => {
                interaction.create_followup(&self.ctx.http, follow_up).await
            }
            Answered::Modal(interaction) => {
                interaction.create_followup(&self.ctx.http, follow_up).await
            }
        };

        result.map(|_| ()).map_err(Fault::unidentified)
    }

    async fn open_modal(
        &self,
        form: &ModalForm,
        timeout: Duration,
    ) -> Result<Option<ModalSubmission>, Fault> {
        let Answered::Command(interaction) = &self.interaction else {
            return Err(Fault::unidentified(
                "A modal can't be opened in response to a modal submission.",
            ));
        };

        let modal = form.fields.iter().fold(
            CreateQuickModal::new(&form.title).timeout(timeout),
            |modal, field| {
                if field.paragraph {
                    modal.paragraph_field(&field.label)
                } else {
                    modal.short_field(&field.label)
                }
            },
        );

        let Some(response) = interaction
            .quick_modal(&self.ctx, modal)
            .await
            .map_err(Fault::unidentified)?
        else {
            return Ok(None);
        };

        // Inputs come back in field order.
        let values: HashMap<String, String> = form
            .fields
            .iter()
            .map(|field| field.id.clone())
            .zip(response.inputs)
            .collect();

        Ok(Some(ModalSubmission {
            values,
            responder: Box::new(DiscordResponder::for_modal(
                self.ctx.clone(),
                response.interaction,
            )),
        }))
    }
}

/// Maps resolved leaf options to invocation option values.
fn option_value(value: &ResolvedValue<'_>) -> Option<OptionValue> {
    match value {
        ResolvedValue::String(value) => Some(OptionValue::String(value.to_string())),
        ResolvedValue::Integer(value) => Some(OptionValue::Integer(*value)),
        ResolvedValue::Boolean(value) => Some(OptionValue::Boolean(*value)),
        ResolvedValue::User(user, _) => Some(OptionValue::User(user.id.get())),
        ResolvedValue::Role(role) => Some(OptionValue::Role(role.id.get())),
        ResolvedValue::Channel(channel) => Some(OptionValue::Channel(channel.id.get())),
        _ => None,
    }
}

/// Walks the resolved options down to the invoked subcommand.
///
/// # Returns
/// - `(group, subcommand, options)` - Path below the command and the subcommand's options
fn resolve_path(
    options: Vec<ResolvedOption<'_>>,
) -> (Option<String>, String, Vec<(String, OptionValue)>) {
    let mut group = None;
    let mut current = options;

    loop {
        let Some(first) = current.first() else {
            return (group, String::new(), Vec::new());
        };

        match &first.value {
            ResolvedValue::SubCommandGroup(inner) => {
                group = Some(first.name.to_string());
                current = inner.clone();
            }
            ResolvedValue::SubCommand(inner) => {
                let values = inner
                    .iter()
                    .filter_map(|option| {
                        option_value(&option.value).map(|value| (option.name.to_string(), value))
                    })
                    .collect();
                return (group, first.name.to_string(), values);
            }
            _ => return (group, String::new(), Vec::new()),
        }
    }
}

/// Builds an invocation from a slash command interaction.
pub fn invocation_from_command(ctx: &Context, interaction: &CommandInteraction) -> Invocation {
    let (group, subcommand, options) = resolve_path(interaction.data.options());

    let administrator = interaction
        .member
        .as_ref()
        .and_then(|member| member.permissions)
        .map(|permissions| permissions.administrator())
        .unwrap_or(false);

    let invoker = Invoker {
        discord_id: interaction.user.id.get(),
        username: interaction.user.name.clone(),
        administrator,
    };

    let invocation = Invocation::new(
        interaction.data.name.clone(),
        group,
        subcommand,
        interaction.guild_id.map(|id| id.get()),
        invoker,
        Box::new(DiscordResponder::for_command(ctx.clone(), interaction.clone())),
    );

    options
        .into_iter()
        .fold(invocation, |invocation, (name, value)| {
            invocation.with_option(name, value)
        })
}

/// Handles a slash command interaction by dispatching it through the registry.
pub async fn handle_command(handler: &Handler, ctx: Context, interaction: CommandInteraction) {
    let mut invocation = invocation_from_command(&ctx, &interaction);

    tracing::debug!(
        "Slash command \"{}\" invoked by {}",
        invocation.path(),
        invocation.invoker.username
    );

    let store = ServerMemberRepository::new(&handler.db);
    let gateway = DiscordGateway::new(
        ctx.http.clone(),
        ctx.cache.clone(),
        handler.log_channel_name.clone(),
    );
    let command_ctx = CommandContext {
        store: &store,
        gateway: &gateway,
        home_community_id: handler.home_community_id,
    };

    handler.registry.dispatch(&command_ctx, &mut invocation).await;
}
