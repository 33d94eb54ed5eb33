//! Reply lifecycle of an interaction.
//!
//! The platform accepts exactly one initial response per interaction and requires different
//! calls depending on whether that response was deferred. `ReplyState` tracks where an
//! invocation stands so the dispatcher can always pick a call the platform will accept.

use std::{collections::HashMap, fmt, time::Duration};

use async_trait::async_trait;

use crate::server::error::fault::Fault;

/// Acknowledgement state of an interaction, only ever moving forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReplyState {
    Unacknowledged,
    Deferred,
    Replied,
}

impl ReplyState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unacknowledged => "unacknowledged",
            Self::Deferred => "deferred",
            Self::Replied => "replied",
        }
    }
}

impl fmt::Display for ReplyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyMessage {
    pub content: String,
    /// Only visible to the invoker.
    pub ephemeral: bool,
}

impl ReplyMessage {
    pub fn ephemeral(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ephemeral: true,
        }
    }

    pub fn public(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ephemeral: false,
        }
    }
}

/// Text input shown in a modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalField {
    pub id: String,
    pub label: String,
    /// Multi-line input.
    pub paragraph: bool,
}

/// Modal form presented to the invoker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalForm {
    pub title: String,
    pub fields: Vec<ModalField>,
}

impl ModalForm {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            fields: Vec::new(),
        }
    }

    pub fn paragraph(mut self, id: impl Into<String>, label: impl Into<String>) -> Self {
        self.fields.push(ModalField {
            id: id.into(),
            label: label.into(),
            paragraph: true,
        });
        self
    }
}

/// Modal submission: the values keyed by field id and the responder of the submit
/// interaction, which starts unacknowledged.
pub struct ModalSubmission {
    pub values: HashMap<String, String>,
    pub responder: Box<dyn Responder>,
}

/// Transport for the calls acknowledging an interaction.
///
/// Implementations issue the call as asked. Sequencing is enforced by the `Invocation`
/// holding the responder.
#[async_trait]
pub trait Responder: Send + Sync {
    async fn reply(&self, message: &ReplyMessage) -> Result<(), Fault>;

    async fn defer(&self, ephemeral: bool) -> Result<(), Fault>;

    /// Edits the initial response, clearing any components attached to it.
    async fn edit_reply(&self, message: &ReplyMessage) -> Result<(), Fault>;

    async fn follow_up(&self, message: &ReplyMessage) -> Result<(), Fault>;

    /// Opens a modal and waits for its submission.
    ///
    /// # Returns
    /// - `Ok(Some(ModalSubmission))` - The invoker submitted the form
    /// - `Ok(None)` - Nothing was submitted before `timeout`
    async fn open_modal(
        &self,
        form: &ModalForm,
        timeout: Duration,
    ) -> Result<Option<ModalSubmission>, Fault>;
}
