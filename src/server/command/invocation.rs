//! Runtime invocation of a subcommand.

use std::{collections::HashMap, time::Duration};

use crate::server::{
    command::reply::{ModalForm, ReplyMessage, ReplyState, Responder},
    error::{fault::Fault, internal::InternalError},
    model::platform::RoleSet,
};

/// Modal submissions are awaited this long before the invocation times out.
pub const MODAL_TIMEOUT: Duration = Duration::from_secs(45);

/// Account that invoked a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invoker {
    pub discord_id: u64,
    pub username: String,
    /// Holds the administrator permission in the community the command was invoked in.
    pub administrator: bool,
}

/// Value of an option given by the invoker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    String(String),
    Integer(i64),
    Boolean(bool),
    User(u64),
    Role(u64),
    Channel(u64),
}

/// A subcommand call resolved from an interaction, with its reply state.
pub struct Invocation {
    pub command: String,
    pub group: Option<String>,
    pub subcommand: String,
    /// Community the command was invoked in, `None` in direct messages.
    pub community_id: Option<u64>,
    pub invoker: Invoker,
    options: HashMap<String, OptionValue>,
    responder: Box<dyn Responder>,
    state: ReplyState,
}

fn invalid_transition(action: &'static str, state: ReplyState) -> Fault {
    Fault::unidentified(InternalError::InvalidReplyTransition {
        action,
        state: state.as_str(),
    })
}

fn missing_option(name: &str) -> Fault {
    Fault::SlashCommandSetup(format!("Missing option \"{}\"", name))
}

impl Invocation {
    pub fn new(
        command: impl Into<String>,
        group: Option<String>,
        subcommand: impl Into<String>,
        community_id: Option<u64>,
        invoker: Invoker,
        responder: Box<dyn Responder>,
    ) -> Self {
        Self {
            command: command.into(),
            group,
            subcommand: subcommand.into(),
            community_id,
            invoker,
            options: HashMap::new(),
            responder,
            state: ReplyState::Unacknowledged,
        }
    }

    pub fn with_option(mut self, name: impl Into<String>, value: OptionValue) -> Self {
        self.options.insert(name.into(), value);
        self
    }

    pub fn state(&self) -> ReplyState {
        self.state
    }

    /// Full command path as typed, e.g. `user update kick-many`.
    pub fn path(&self) -> String {
        match &self.group {
            Some(group) => format!("{} {} {}", self.command, group, self.subcommand),
            None => format!("{} {}", self.command, self.subcommand),
        }
    }

    pub fn string(&self, name: &str) -> Option<&str> {
        match self.options.get(name) {
            Some(OptionValue::String(value)) => Some(value.as_str()),
            _ => None,
        }
    }

    /// Required string option; a missing one means the deployed command differs from its
    /// declaration.
    pub fn required_string(&self, name: &str) -> Result<&str, Fault> {
        self.string(name).ok_or_else(|| missing_option(name))
    }

    pub fn integer(&self, name: &str) -> Option<i64> {
        match self.options.get(name) {
            Some(OptionValue::Integer(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn required_integer(&self, name: &str) -> Result<i64, Fault> {
        self.integer(name).ok_or_else(|| missing_option(name))
    }

    pub fn boolean(&self, name: &str) -> Option<bool> {
        match self.options.get(name) {
            Some(OptionValue::Boolean(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn user(&self, name: &str) -> Option<u64> {
        match self.options.get(name) {
            Some(OptionValue::User(id)) => Some(*id),
            _ => None,
        }
    }

    pub fn required_user(&self, name: &str) -> Result<u64, Fault> {
        self.user(name).ok_or_else(|| missing_option(name))
    }

    pub fn role(&self, name: &str) -> Option<u64> {
        match self.options.get(name) {
            Some(OptionValue::Role(id)) => Some(*id),
            _ => None,
        }
    }

    pub fn required_role(&self, name: &str) -> Result<u64, Fault> {
        self.role(name).ok_or_else(|| missing_option(name))
    }

    pub fn channel(&self, name: &str) -> Option<u64> {
        match self.options.get(name) {
            Some(OptionValue::Channel(id)) => Some(*id),
            _ => None,
        }
    }

    pub fn required_channel(&self, name: &str) -> Result<u64, Fault> {
        self.channel(name).ok_or_else(|| missing_option(name))
    }

    /// Collects the role options present among `names`.
    pub fn roles(&self, names: &[&str]) -> RoleSet {
        names.iter().filter_map(|name| self.role(name)).collect()
    }

    /// Sends the initial response.
    pub async fn reply(&mut self, message: ReplyMessage) -> Result<(), Fault> {
        if self.state != ReplyState::Unacknowledged {
            return Err(invalid_transition("reply to", self.state));
        }

        self.responder.reply(&message).await?;
        self.state = ReplyState::Replied;
        Ok(())
    }

    /// Acknowledges the interaction so the handler can reply later.
    pub async fn defer(&mut self, ephemeral: bool) -> Result<(), Fault> {
        if self.state != ReplyState::Unacknowledged {
            return Err(invalid_transition("defer", self.state));
        }

        self.responder.defer(ephemeral).await?;
        self.state = ReplyState::Deferred;
        Ok(())
    }

    pub async fn edit_reply(&mut self, message: ReplyMessage) -> Result<(), Fault> {
        if self.state == ReplyState::Unacknowledged {
            return Err(invalid_transition("edit the reply of", self.state));
        }

        self.responder.edit_reply(&message).await?;
        self.state = ReplyState::Replied;
        Ok(())
    }

    pub async fn follow_up(&mut self, message: ReplyMessage) -> Result<(), Fault> {
        if self.state != ReplyState::Replied {
            return Err(invalid_transition("follow up on", self.state));
        }

        self.responder.follow_up(&message).await
    }

    /// Sends `message` with whichever call the current state allows.
    pub async fn respond(&mut self, message: ReplyMessage) -> Result<(), Fault> {
        match self.state {
            ReplyState::Unacknowledged => self.reply(message).await,
            ReplyState::Deferred => self.edit_reply(message).await,
            ReplyState::Replied => self.follow_up(message).await,
        }
    }

    /// Opens a modal and waits for the invoker to submit it.
    ///
    /// Showing the modal is the initial response. Once submitted, further replies go to the
    /// submit interaction, which starts unacknowledged.
    ///
    /// # Returns
    /// - `Ok(HashMap)` - Submitted values keyed by field id
    /// - `Err(Fault::InteractionTimeout)` - Nothing was submitted within `timeout`
    pub async fn open_modal(
        &mut self,
        form: ModalForm,
        timeout: Duration,
    ) -> Result<HashMap<String, String>, Fault> {
        if self.state != ReplyState::Unacknowledged {
            return Err(invalid_transition("open a modal on", self.state));
        }

        let submission = self.responder.open_modal(&form, timeout).await?;
        self.state = ReplyState::Replied;

        let Some(submission) = submission else {
            return Err(Fault::InteractionTimeout);
        };

        self.responder = submission.responder;
        self.state = ReplyState::Unacknowledged;

        Ok(submission.values)
    }

    /// Opens a single-field paragraph modal and returns the submitted text.
    pub async fn prompt_paragraph(&mut self, title: &str, label: &str) -> Result<String, Fault> {
        let mut values = self
            .open_modal(ModalForm::new(title).paragraph("input", label), MODAL_TIMEOUT)
            .await?;

        Ok(values.remove("input").unwrap_or_default())
    }
}
