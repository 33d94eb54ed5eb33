use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;

use crate::server::{
    command::{
        definition::{
            AnyHandler, CommandBuilder, GuildHandler, OptionDecl, OptionKind, SubcommandBuilder,
            SubcommandGroupBuilder, SubcommandHandler,
        },
        invocation::{Invocation, Invoker, OptionValue},
        registry::CommandRegistry,
        reply::{ModalForm, ModalSubmission, ReplyMessage, ReplyState, Responder},
        CommandContext,
    },
    data::server_member::ServerMemberRepository,
    error::{
        command::CommandBuildError,
        fault::{Fault, UNIDENTIFIED_FAULT_MESSAGE},
    },
    gateway::fake::{platform_member, FakeGateway, GatewayCall},
    policy::test_support::{community_with_key_roles, role_id},
    service::community::CommunityScope,
};
use test_utils::{builder::TestBuilder, factory::server_member::ServerMemberFactory};

mod dispatch;

/// Interaction call recorded by [`RecordingResponder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponderCall {
    Reply(String),
    Defer,
    EditReply(String),
    FollowUp(String),
    OpenModal(String),
}

/// Responder recording every call into a log shared with its clones.
///
/// When built with [`RecordingResponder::submitting`], opened modals are submitted with the
/// given values; otherwise they time out.
#[derive(Clone, Default)]
pub struct RecordingResponder {
    calls: Arc<Mutex<Vec<ResponderCall>>>,
    submission: Option<HashMap<String, String>>,
}

impl RecordingResponder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submitting(mut self, values: &[(&str, &str)]) -> Self {
        self.submission = Some(
            values
                .iter()
                .map(|(id, value)| (id.to_string(), value.to_string()))
                .collect(),
        );
        self
    }

    pub fn calls(&self) -> Vec<ResponderCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: ResponderCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl Responder for RecordingResponder {
    async fn reply(&self, message: &ReplyMessage) -> Result<(), Fault> {
        self.record(ResponderCall::Reply(message.content.clone()));
        Ok(())
    }

    async fn defer(&self, _ephemeral: bool) -> Result<(), Fault> {
        self.record(ResponderCall::Defer);
        Ok(())
    }

    async fn edit_reply(&self, message: &ReplyMessage) -> Result<(), Fault> {
        self.record(ResponderCall::EditReply(message.content.clone()));
        Ok(())
    }

    async fn follow_up(&self, message: &ReplyMessage) -> Result<(), Fault> {
        self.record(ResponderCall::FollowUp(message.content.clone()));
        Ok(())
    }

    async fn open_modal(
        &self,
        form: &ModalForm,
        _timeout: Duration,
    ) -> Result<Option<ModalSubmission>, Fault> {
        self.record(ResponderCall::OpenModal(form.title.clone()));

        Ok(self.submission.clone().map(|values| ModalSubmission {
            values,
            responder: Box::new(RecordingResponder {
                calls: self.calls.clone(),
                submission: None,
            }),
        }))
    }
}

pub const OPERATOR_ID: u64 = 7;

/// Invocation from a non-administrator operator.
pub fn invocation(
    responder: &RecordingResponder,
    command: &str,
    group: Option<&str>,
    subcommand: &str,
    community_id: Option<u64>,
) -> Invocation {
    Invocation::new(
        command,
        group.map(str::to_string),
        subcommand,
        community_id,
        Invoker {
            discord_id: OPERATOR_ID,
            username: "operator".to_string(),
            administrator: false,
        },
        Box::new(responder.clone()),
    )
}

/// Handler that always succeeds with a reply, counting its calls.
#[derive(Clone, Default)]
pub struct Counting {
    pub calls: Arc<Mutex<usize>>,
}

impl Counting {
    pub fn count(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl AnyHandler for Counting {
    async fn handle(
        &self,
        _ctx: &CommandContext<'_>,
        invocation: &mut Invocation,
    ) -> Result<(), Fault> {
        *self.calls.lock().unwrap() += 1;
        invocation.reply(ReplyMessage::public("done")).await
    }
}

#[async_trait]
impl GuildHandler for Counting {
    async fn handle(
        &self,
        _ctx: &CommandContext<'_>,
        invocation: &mut Invocation,
        scope: &CommunityScope,
    ) -> Result<(), Fault> {
        *self.calls.lock().unwrap() += 1;
        invocation
            .reply(ReplyMessage::public(format!("done in {}", scope.id())))
            .await
    }
}
