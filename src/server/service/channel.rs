//! Channel administration: cohort channels, program categories and channel messages.
//!
//! Channels are created with explicit role overwrites so access follows the community's
//! role taxonomy. A cohort channel inherits its category's overwrites and is only visible
//! to its cohort role. A program category is hidden from everyone except the internal
//! staff roles of the program.

use serenity::all::Permissions;

use crate::server::{
    error::fault::Fault,
    gateway::PlatformGateway,
    model::{
        bulk::{check_bulk_limit, BulkResults},
        platform::{
            check_message_length, merge_overwrites, ChannelKind, NewChannel, PlatformChannel,
            RoleOverwrite, BULK_MESSAGE_DELETE_MAX,
        },
    },
    policy::taxonomy::{
        cohort_name, hyphenate, COHORT_PREFIX, INTERNAL_COHORT_PREFIX, INTERNAL_STACK_PREFIX,
    },
    service::community::CommunityScope,
};

/// Program a category is created for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Program {
    Domestic,
    International,
}

impl Program {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Domestic => "domestic",
            Self::International => "international",
        }
    }
}

impl std::str::FromStr for Program {
    type Err = Fault;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "domestic" => Ok(Self::Domestic),
            "international" => Ok(Self::International),
            other => Err(Fault::SlashCommandSetup(format!(
                "Unknown program \"{}\"",
                other
            ))),
        }
    }
}

/// Cohort channel created by [`ChannelService::create_cohort_channel`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CohortChannel {
    pub channel: PlatformChannel,
    /// Previous cohort channel, when it was deleted.
    pub deleted: Option<PlatformChannel>,
}

/// Category created by [`ChannelService::create_program_category`] with its first channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramCategory {
    pub category: PlatformChannel,
    pub general: PlatformChannel,
}

pub struct ChannelService<'a> {
    gateway: &'a dyn PlatformGateway,
    scope: &'a CommunityScope,
}

impl<'a> ChannelService<'a> {
    /// Creates a new ChannelService instance.
    ///
    /// # Arguments
    /// - `gateway` - Platform gateway for the community
    /// - `scope` - Community the channels belong to, with its resolved taxonomy
    pub fn new(gateway: &'a dyn PlatformGateway, scope: &'a CommunityScope) -> Self {
        Self { gateway, scope }
    }

    /// Id of the community, which is also the id of its `@everyone` role.
    fn community_id(&self) -> u64 {
        self.scope.id()
    }

    async fn channel_of_kind(
        &self,
        channel_id: u64,
        kind: ChannelKind,
    ) -> Result<PlatformChannel, Fault> {
        let channel = self
            .gateway
            .fetch_channel(self.community_id(), channel_id)
            .await?
            .ok_or(Fault::ChannelNotFound(channel_id))?;

        if channel.kind != kind {
            let expected = match kind {
                ChannelKind::Category => "a channel category (look for a folder icon when selecting)",
                ChannelKind::Text | ChannelKind::Other => "a text channel",
            };
            return Err(Fault::InvalidChannelSelection(format!(
                "<#{}> must be {}.",
                channel_id, expected
            )));
        }

        Ok(channel)
    }

    /// Creates a cohort text channel under a category, visible only to the cohort role.
    ///
    /// The new channel keeps the category's overwrites, denies viewing to everyone and
    /// allows it to the cohort role. An old channel is deleted afterwards when it is a
    /// cohort text channel; failing to delete it leaves the new channel in place.
    ///
    /// # Arguments
    /// - `name` - Channel name, with or without the `cohort-` prefix
    /// - `category_id` - Category the channel is created under
    /// - `cohort_role_id` - Cohort role given access
    /// - `old_channel_id` - Previous cohort channel to delete
    ///
    /// # Returns
    /// - `Ok(CohortChannel)` - The created channel and the deleted one, if any
    /// - `Err(Fault::InvalidRoleSelection)` - The role isn't a cohort role
    /// - `Err(Fault::InvalidChannelSelection)` - Blank name or the target isn't a category
    /// - `Err(Fault::ChannelNotFound)` - The category doesn't exist
    pub async fn create_cohort_channel(
        &self,
        name: &str,
        category_id: u64,
        cohort_role_id: u64,
        old_channel_id: Option<u64>,
    ) -> Result<CohortChannel, Fault> {
        if !self.scope.taxonomy.is_cohort_role(cohort_role_id) {
            return Err(Fault::InvalidRoleSelection(format!(
                "the cohort role must start with {}",
                COHORT_PREFIX
            )));
        }

        let name = cohort_name(name).ok_or_else(|| {
            Fault::InvalidChannelSelection("the new channel name is blank.".to_string())
        })?;
        let category = self
            .channel_of_kind(category_id, ChannelKind::Category)
            .await?;

        let overwrites = merge_overwrites(category.overwrites.iter().copied().chain([
            RoleOverwrite::deny(self.community_id(), Permissions::VIEW_CHANNEL),
            RoleOverwrite::allow(cohort_role_id, Permissions::VIEW_CHANNEL),
        ]));

        let channel = self
            .gateway
            .create_channel(
                self.community_id(),
                &NewChannel {
                    name,
                    kind: ChannelKind::Text,
                    parent_id: Some(category.id),
                    overwrites,
                },
            )
            .await?;

        let deleted = match old_channel_id {
            Some(old_channel_id) => self.delete_cohort_channel(old_channel_id).await,
            None => None,
        };

        Ok(CohortChannel { channel, deleted })
    }

    /// Deletes a cohort text channel, leaving any other channel alone.
    async fn delete_cohort_channel(&self, channel_id: u64) -> Option<PlatformChannel> {
        let channel = match self.channel_of_kind(channel_id, ChannelKind::Text).await {
            Ok(channel) if channel.name.contains(COHORT_PREFIX) => channel,
            Ok(channel) => {
                tracing::info!("Kept channel {} since it isn't a cohort channel", channel.name);
                return None;
            }
            Err(e) => {
                tracing::warn!("Kept old cohort channel {}: {}", channel_id, e);
                return None;
            }
        };

        match self.gateway.delete_channel(channel.id).await {
            Ok(()) => Some(channel),
            Err(e) => {
                tracing::warn!("Failed to delete old cohort channel {}: {}", channel.name, e);
                None
            }
        }
    }

    /// Creates a program category and a `{name}-general` text channel inside it.
    ///
    /// The category is hidden from everyone. The program's all-staff key role can view and
    /// connect, the internal role can view, and instructors manage channels and roles
    /// without seeing the category. The general channel copies the category's overwrites.
    ///
    /// # Arguments
    /// - `program` - Domestic programs need an `internal-stack-` role, international
    ///   programs an `internal-cohort-` role
    /// - `name` - Category name, hyphenated and lowercased
    /// - `internal_role_id` - Internal staff role given access
    ///
    /// # Returns
    /// - `Ok(ProgramCategory)` - The category and its general channel
    /// - `Err(Fault::InvalidRoleSelection)` - The role doesn't match the program
    /// - `Err(Fault::InvalidChannelSelection)` - Blank name
    pub async fn create_program_category(
        &self,
        program: Program,
        name: &str,
        internal_role_id: u64,
    ) -> Result<ProgramCategory, Fault> {
        let taxonomy = &self.scope.taxonomy;

        let (all_staff, role_matches, prefix) = match program {
            Program::Domestic => (
                taxonomy.key.internal_stack_all,
                taxonomy.is_internal_stack_role(internal_role_id),
                INTERNAL_STACK_PREFIX,
            ),
            Program::International => (
                taxonomy.key.internal_stack_all_international,
                taxonomy.is_internal_cohort_role(internal_role_id),
                INTERNAL_COHORT_PREFIX,
            ),
        };

        if !role_matches {
            return Err(Fault::InvalidRoleSelection(format!(
                "the internal role of a {} program must start with {}",
                program.as_str(),
                prefix
            )));
        }

        let name = hyphenate(name);
        if name.is_empty() {
            return Err(Fault::InvalidChannelSelection(
                "the new category name is blank.".to_string(),
            ));
        }

        // The all-staff overwrite comes after the internal role so it wins when both are the
        // same role.
        let overwrites = merge_overwrites([
            RoleOverwrite::allow(internal_role_id, Permissions::VIEW_CHANNEL),
            RoleOverwrite::allow(all_staff, Permissions::VIEW_CHANNEL | Permissions::CONNECT),
            RoleOverwrite {
                role_id: taxonomy.key.instructor,
                allow: Permissions::MANAGE_CHANNELS | Permissions::MANAGE_ROLES,
                deny: Permissions::VIEW_CHANNEL,
            },
            RoleOverwrite::deny(
                self.community_id(),
                Permissions::VIEW_CHANNEL | Permissions::CONNECT,
            ),
        ]);

        let category = self
            .gateway
            .create_channel(
                self.community_id(),
                &NewChannel {
                    name: name.clone(),
                    kind: ChannelKind::Category,
                    parent_id: None,
                    overwrites,
                },
            )
            .await?;

        let general = self
            .gateway
            .create_channel(
                self.community_id(),
                &NewChannel {
                    name: format!("{}-general", name),
                    kind: ChannelKind::Text,
                    parent_id: Some(category.id),
                    overwrites: category.overwrites.clone(),
                },
            )
            .await?;

        Ok(ProgramCategory { category, general })
    }

    /// Posts a message to each text channel, signed with its author.
    ///
    /// # Returns
    /// - `Ok(BulkResults)` - Per-channel results in input order
    /// - `Err(Fault::InvalidChannelSelection)` - No channels were given
    /// - `Err(Fault::BulkRequestLimit)` - Too many channels
    /// - `Err(Fault::MessageTooLong)` - The signed message exceeds the platform limit
    pub async fn send_to_each_channel(
        &self,
        channel_ids: &[u64],
        message: &str,
        author_id: u64,
    ) -> Result<BulkResults<PlatformChannel>, Fault> {
        if channel_ids.is_empty() {
            return Err(Fault::InvalidChannelSelection(
                "no text channels were mentioned.".to_string(),
            ));
        }
        check_bulk_limit(channel_ids.len())?;

        let content = format!("Message from <@{}>\n\n{}", author_id, message);
        check_message_length(&content)?;

        let mut results = Vec::with_capacity(channel_ids.len());

        for channel_id in channel_ids {
            results.push(self.send_to_channel(*channel_id, &content).await);
        }

        Ok(BulkResults::from_results(results))
    }

    async fn send_to_channel(
        &self,
        channel_id: u64,
        content: &str,
    ) -> Result<PlatformChannel, Fault> {
        let channel = self.channel_of_kind(channel_id, ChannelKind::Text).await?;

        self.gateway.send_to_channel(channel.id, content).await?;

        Ok(channel)
    }

    /// Deletes the most recent messages of a text channel.
    ///
    /// # Returns
    /// - `Ok((PlatformChannel, usize))` - The channel and how many messages were deleted
    /// - `Err(Fault::BulkDeleteLimit)` - `amount` is outside `1..=100`
    /// - `Err(Fault::InvalidChannelSelection)` - The channel isn't a text channel
    pub async fn delete_recent_messages(
        &self,
        channel_id: u64,
        amount: i64,
    ) -> Result<(PlatformChannel, usize), Fault> {
        let amount = u8::try_from(amount)
            .ok()
            .filter(|amount| (1..=BULK_MESSAGE_DELETE_MAX).contains(amount))
            .ok_or(Fault::BulkDeleteLimit)?;

        let channel = self.channel_of_kind(channel_id, ChannelKind::Text).await?;
        let deleted = self
            .gateway
            .delete_recent_messages(channel.id, amount)
            .await?;

        tracing::info!("Deleted {} messages from channel {}", deleted, channel.name);

        Ok((channel, deleted))
    }
}
