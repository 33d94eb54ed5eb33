//! In-memory platform gateway recording every write, for tests.

use std::{
    collections::{HashMap, HashSet},
    sync::Mutex,
};

use async_trait::async_trait;

use crate::server::{
    error::fault::Fault,
    gateway::PlatformGateway,
    model::platform::{
        ChannelKind, Community, CommunityRole, NewChannel, NewRole, PlatformBan,
        PlatformChannel, PlatformMember, RoleSet,
    },
};

/// Ids handed out to channels and roles created through the fake start here.
pub const FIRST_CREATED_ID: u64 = 5000;

/// A write issued against the fake platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    Kick(u64),
    Ban(u64, Option<String>),
    Unban(u64),
    SetRoles(u64, RoleSet),
    SetNickname(u64, String),
    SendDm(u64, String),
    Log(String),
    CreateChannel(NewChannel),
    DeleteChannel(u64),
    CreateRole(NewRole),
    DeleteRole(u64),
    SendToChannel(u64, String),
    DeleteMessages(u64, usize),
}

#[derive(Default)]
pub struct FakeGateway {
    community: Option<Community>,
    members: Mutex<HashMap<u64, PlatformMember>>,
    bans: Mutex<HashMap<u64, PlatformBan>>,
    failing_kicks: Mutex<HashSet<u64>>,
    channels: Mutex<HashMap<u64, PlatformChannel>>,
    message_counts: Mutex<HashMap<u64, usize>>,
    /// Channels and roles whose writes fail.
    failing_targets: Mutex<HashSet<u64>>,
    created: Mutex<u64>,
    calls: Mutex<Vec<GatewayCall>>,
    has_log_channel: bool,
}

impl FakeGateway {
    pub fn new(community: Community) -> Self {
        Self {
            community: Some(community),
            has_log_channel: true,
            ..Default::default()
        }
    }

    /// Gateway that can't see any community.
    pub fn uncached() -> Self {
        Self::default()
    }

    pub fn with_member(self, member: PlatformMember) -> Self {
        self.members
            .lock()
            .unwrap()
            .insert(member.discord_id, member);
        self
    }

    pub fn with_ban(self, ban: PlatformBan) -> Self {
        self.bans.lock().unwrap().insert(ban.discord_id, ban);
        self
    }

    pub fn with_failing_kick(self, discord_id: u64) -> Self {
        self.failing_kicks.lock().unwrap().insert(discord_id);
        self
    }

    pub fn with_channel(self, channel: PlatformChannel) -> Self {
        self.channels.lock().unwrap().insert(channel.id, channel);
        self
    }

    /// Seeds `count` messages into a channel.
    pub fn with_messages(self, channel_id: u64, count: usize) -> Self {
        self.message_counts.lock().unwrap().insert(channel_id, count);
        self
    }

    /// Makes sends to, deletions of, and message deletions in a channel or role fail.
    pub fn with_failing_target(self, id: u64) -> Self {
        self.failing_targets.lock().unwrap().insert(id);
        self
    }

    pub fn without_log_channel(mut self) -> Self {
        self.has_log_channel = false;
        self
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn member(&self, discord_id: u64) -> Option<PlatformMember> {
        self.members.lock().unwrap().get(&discord_id).cloned()
    }

    pub fn channel(&self, channel_id: u64) -> Option<PlatformChannel> {
        self.channels.lock().unwrap().get(&channel_id).cloned()
    }

    pub fn message_count(&self, channel_id: u64) -> usize {
        self.message_counts
            .lock()
            .unwrap()
            .get(&channel_id)
            .copied()
            .unwrap_or_default()
    }

    fn is_failing(&self, id: u64) -> bool {
        self.failing_targets.lock().unwrap().contains(&id)
    }

    fn next_id(&self) -> u64 {
        let mut created = self.created.lock().unwrap();
        let id = FIRST_CREATED_ID + *created;
        *created += 1;
        id
    }

    fn record(&self, call: GatewayCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn community_id(&self) -> u64 {
        self.community.as_ref().map(|c| c.id).unwrap_or_default()
    }
}

/// Manageable, kickable and bannable member with no nickname.
pub fn platform_member(discord_id: u64, roles: &[u64]) -> PlatformMember {
    PlatformMember {
        discord_id,
        username: format!("user{}", discord_id),
        nickname: None,
        roles: roles.iter().copied().collect(),
        is_bot: false,
        manageable: true,
        kickable: true,
        bannable: true,
    }
}

/// Channel of community `1` without overwrites.
pub fn platform_channel(
    id: u64,
    name: &str,
    kind: ChannelKind,
    parent_id: Option<u64>,
) -> PlatformChannel {
    PlatformChannel {
        id,
        community_id: 1,
        name: name.to_string(),
        kind,
        parent_id,
        overwrites: Vec::new(),
    }
}

#[async_trait]
impl PlatformGateway for FakeGateway {
    async fn fetch_community(&self, community_id: u64) -> Result<Community, Fault> {
        match &self.community {
            Some(community) if community.id == community_id => Ok(community.clone()),
            _ => Err(Fault::CommunityNotCached(community_id)),
        }
    }

    async fn fetch_member(
        &self,
        _community_id: u64,
        discord_id: u64,
    ) -> Result<Option<PlatformMember>, Fault> {
        Ok(self.member(discord_id))
    }

    async fn find_ban(
        &self,
        _community_id: u64,
        discord_id: u64,
    ) -> Result<Option<PlatformBan>, Fault> {
        Ok(self.bans.lock().unwrap().get(&discord_id).cloned())
    }

    async fn kick(
        &self,
        _community_id: u64,
        discord_id: u64,
        _reason: Option<&str>,
    ) -> Result<(), Fault> {
        if self.failing_kicks.lock().unwrap().contains(&discord_id) {
            return Err(Fault::KickFailed {
                discord_id,
                reason: "Missing Permissions".to_string(),
            });
        }

        self.record(GatewayCall::Kick(discord_id));
        self.members.lock().unwrap().remove(&discord_id);
        Ok(())
    }

    async fn ban(
        &self,
        _community_id: u64,
        discord_id: u64,
        reason: Option<&str>,
    ) -> Result<(), Fault> {
        self.record(GatewayCall::Ban(discord_id, reason.map(str::to_string)));
        let username = self
            .members
            .lock()
            .unwrap()
            .remove(&discord_id)
            .map(|member| member.username)
            .unwrap_or_default();
        self.bans.lock().unwrap().insert(
            discord_id,
            PlatformBan {
                discord_id,
                username,
                reason: reason.map(str::to_string),
            },
        );
        Ok(())
    }

    async fn unban(&self, _community_id: u64, discord_id: u64) -> Result<(), Fault> {
        self.record(GatewayCall::Unban(discord_id));
        self.bans.lock().unwrap().remove(&discord_id);
        Ok(())
    }

    async fn set_roles(
        &self,
        _community_id: u64,
        discord_id: u64,
        roles: &RoleSet,
    ) -> Result<(), Fault> {
        self.record(GatewayCall::SetRoles(discord_id, roles.clone()));
        if let Some(member) = self.members.lock().unwrap().get_mut(&discord_id) {
            member.roles = roles.clone();
        }
        Ok(())
    }

    async fn set_nickname(
        &self,
        _community_id: u64,
        discord_id: u64,
        nickname: &str,
    ) -> Result<(), Fault> {
        self.record(GatewayCall::SetNickname(discord_id, nickname.to_string()));
        if let Some(member) = self.members.lock().unwrap().get_mut(&discord_id) {
            member.nickname = Some(nickname.to_string());
        }
        Ok(())
    }

    async fn send_dm(&self, discord_id: u64, content: &str) -> Result<(), Fault> {
        self.record(GatewayCall::SendDm(discord_id, content.to_string()));
        Ok(())
    }

    async fn send_to_log_channel(
        &self,
        community_id: u64,
        content: &str,
    ) -> Result<bool, Fault> {
        if community_id != self.community_id() || !self.has_log_channel {
            return Ok(false);
        }

        self.record(GatewayCall::Log(content.to_string()));
        Ok(true)
    }

    async fn fetch_channel(
        &self,
        community_id: u64,
        channel_id: u64,
    ) -> Result<Option<PlatformChannel>, Fault> {
        Ok(self
            .channel(channel_id)
            .filter(|channel| channel.community_id == community_id))
    }

    async fn create_channel(
        &self,
        community_id: u64,
        channel: &NewChannel,
    ) -> Result<PlatformChannel, Fault> {
        self.record(GatewayCall::CreateChannel(channel.clone()));

        let created = PlatformChannel {
            id: self.next_id(),
            community_id,
            name: channel.name.clone(),
            kind: channel.kind,
            parent_id: channel.parent_id,
            overwrites: channel.overwrites.clone(),
        };
        self.channels
            .lock()
            .unwrap()
            .insert(created.id, created.clone());

        Ok(created)
    }

    async fn delete_channel(&self, channel_id: u64) -> Result<(), Fault> {
        if self.is_failing(channel_id) {
            return Err(Fault::ChannelDeleteFailed {
                channel_id,
                reason: "Missing Permissions".to_string(),
            });
        }

        self.record(GatewayCall::DeleteChannel(channel_id));
        self.channels.lock().unwrap().remove(&channel_id);
        Ok(())
    }

    async fn create_role(&self, _community_id: u64, role: &NewRole) -> Result<CommunityRole, Fault> {
        self.record(GatewayCall::CreateRole(role.clone()));

        Ok(CommunityRole {
            id: self.next_id(),
            name: role.name.clone(),
            administrator: false,
            move_members: false,
            managed: false,
        })
    }

    async fn delete_role(&self, _community_id: u64, role_id: u64) -> Result<(), Fault> {
        if self.is_failing(role_id) {
            return Err(Fault::RoleDeleteFailed {
                role_id,
                reason: "Missing Permissions".to_string(),
            });
        }

        self.record(GatewayCall::DeleteRole(role_id));
        Ok(())
    }

    async fn send_to_channel(&self, channel_id: u64, content: &str) -> Result<(), Fault> {
        if self.is_failing(channel_id) {
            return Err(Fault::ChannelSendFailed {
                channel_id,
                reason: "Missing Access".to_string(),
            });
        }

        self.record(GatewayCall::SendToChannel(channel_id, content.to_string()));
        *self.message_counts.lock().unwrap().entry(channel_id).or_default() += 1;
        Ok(())
    }

    async fn delete_recent_messages(&self, channel_id: u64, count: u8) -> Result<usize, Fault> {
        if self.is_failing(channel_id) {
            return Err(Fault::MessageDeleteFailed {
                channel_id,
                reason: "Missing Permissions".to_string(),
            });
        }

        let mut counts = self.message_counts.lock().unwrap();
        let held = counts.entry(channel_id).or_default();
        let deleted = (*held).min(count as usize);
        *held -= deleted;
        drop(counts);

        self.record(GatewayCall::DeleteMessages(channel_id, deleted));
        Ok(deleted)
    }
}
