//! Member reconciliation engine.
//!
//! `ServerMemberService` keeps member records and live platform membership in agreement. It
//! links records to platform accounts, pushes a record's roles and derived nickname to the
//! platform, runs moderation actions behind hierarchy pre-checks, and fans bulk requests
//! out over many records while isolating per-item faults.
//!
//! Every operation returns a `Fault` on failure instead of propagating errors. Bulk
//! operations validate the whole batch up front, then return one result per input in input
//! order.

use crate::server::{
    data::store::MemberStore,
    error::fault::{Fault, LinkConflict},
    gateway::PlatformGateway,
    model::{
        bulk::{check_bulk_limit, BulkResults},
        platform::{check_message_length, PlatformMember, RoleSet},
        server_member::{
            normalize_email, CreateServerMemberParam, MemberIdentifier, MemberRecord,
            UpdateServerMemberParam,
        },
    },
    policy::{
        nickname::derive_nickname,
        role_update::{self, RoleUpdateMethod},
    },
    service::community::CommunityScope,
};

/// Moderation action applied by [`ServerMemberService::ban_or_unban`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BanAction {
    Ban,
    Unban,
}

impl std::str::FromStr for BanAction {
    type Err = Fault;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "ban" => Ok(Self::Ban),
            "unban" => Ok(Self::Unban),
            other => Err(Fault::SlashCommandSetup(format!(
                "Unknown ban action \"{}\"",
                other
            ))),
        }
    }
}

pub struct ServerMemberService<'a> {
    store: &'a dyn MemberStore,
    gateway: &'a dyn PlatformGateway,
    scope: &'a CommunityScope,
}

impl<'a> ServerMemberService<'a> {
    /// Creates a new ServerMemberService instance.
    ///
    /// # Arguments
    /// - `store` - Member record store
    /// - `gateway` - Platform gateway for the community
    /// - `scope` - Community the engine reconciles against, with its resolved taxonomy
    pub fn new(
        store: &'a dyn MemberStore,
        gateway: &'a dyn PlatformGateway,
        scope: &'a CommunityScope,
    ) -> Self {
        Self {
            store,
            gateway,
            scope,
        }
    }

    fn community_id(&self) -> u64 {
        self.scope.id()
    }

    /// Finds a record by email or platform id.
    ///
    /// # Returns
    /// - `Ok(MemberRecord)` - Record found
    /// - `Err(Fault::RecordNotFound)` - No record matches the identifier
    pub async fn find_one(&self, identifier: &str) -> Result<MemberRecord, Fault> {
        let record = match MemberIdentifier::parse(identifier) {
            MemberIdentifier::Email(email) => self.store.find_by_email(&email).await?,
            MemberIdentifier::DiscordId(discord_id) => {
                self.store.find_by_discord_id(discord_id).await?
            }
        };

        record.ok_or(Fault::RecordNotFound)
    }

    async fn find_by_email(&self, email: &str) -> Result<MemberRecord, Fault> {
        self.store
            .find_by_email(email)
            .await?
            .ok_or(Fault::RecordNotFound)
    }

    /// Finds many records by email, one result per email.
    pub async fn find_many_by_emails(&self, emails: &[String]) -> BulkResults<MemberRecord> {
        let mut results = Vec::with_capacity(emails.len());

        for email in emails {
            results.push(self.find_by_email(email).await);
        }

        BulkResults::from_results(results)
    }

    /// Creates a record after checking its roles don't mix student and employee access.
    pub async fn create(&self, param: CreateServerMemberParam) -> Result<MemberRecord, Fault> {
        self.check_exclusive(&param.roles)?;

        self.store.create(param).await
    }

    /// Creates many records, one result per param.
    ///
    /// # Returns
    /// - `Ok(BulkResults)` - Per-record results in input order
    /// - `Err(Fault::BulkRequestLimit)` - Too many params, nothing was created
    pub async fn create_many(
        &self,
        params: Vec<CreateServerMemberParam>,
    ) -> Result<BulkResults<MemberRecord>, Fault> {
        check_bulk_limit(params.len())?;

        let checks: Vec<Result<(), Fault>> = params
            .iter()
            .map(|param| self.check_exclusive(&param.roles))
            .collect();

        let valid = params
            .into_iter()
            .zip(&checks)
            .filter(|(_, check)| check.is_ok())
            .map(|(param, _)| param)
            .collect();

        // The store answers in the order of the params it was given.
        let mut created = self.store.create_many(valid).await.into_iter();

        let results = checks
            .into_iter()
            .map(|check| match check {
                Ok(()) => created.next().unwrap_or(Err(Fault::RecordNotFound)),
                Err(fault) => Err(fault),
            })
            .collect();

        Ok(BulkResults::from_results(results))
    }

    /// Updates profile fields and/or roles of the record matching `identifier`.
    pub async fn update_one(
        &self,
        identifier: &str,
        param: UpdateServerMemberParam,
    ) -> Result<MemberRecord, Fault> {
        let record = self.find_one(identifier).await?;

        if let Some(roles) = &param.roles {
            self.check_exclusive(roles)?;
        }

        self.store
            .update_by_id(record.id, param)
            .await?
            .ok_or(Fault::RecordNotFound)
    }

    /// Updates a record then pushes the result to its linked member, if any.
    pub async fn update_one_and_sync(
        &self,
        identifier: &str,
        param: UpdateServerMemberParam,
    ) -> Result<MemberRecord, Fault> {
        let record = self.update_one(identifier, param).await?;

        self.sync(&record, false).await?;

        Ok(record)
    }

    /// Deletes a record, refused while it's still linked.
    pub async fn delete(&self, email: &str) -> Result<(), Fault> {
        let record = self.find_by_email(email).await?;

        if record.discord_id.is_some() {
            return Err(Fault::LinkedStill {
                email: record.email,
            });
        }

        if !self.store.delete_by_email(&record.email).await? {
            return Err(Fault::RecordNotFound);
        }

        Ok(())
    }

    /// Links the record matching `email` to a platform account, then syncs it.
    ///
    /// The record is looked up by email first, then by `discord_id`.
    ///
    /// # Returns
    /// - `Ok(MemberRecord)` - Newly linked, or already linked to exactly this account
    /// - `Err(Fault::EmailNotFound)` - No record matches either side
    /// - `Err(Fault::AlreadyLinked)` - The record or the account is linked elsewhere
    pub async fn link(&self, email: &str, discord_id: u64) -> Result<MemberRecord, Fault> {
        let email = normalize_email(email);

        let record = self
            .store
            .find_by_email_or_discord_id(&email, discord_id)
            .await?
            .ok_or(Fault::EmailNotFound)?;

        match record.discord_id {
            Some(linked) if linked == discord_id && record.email == email => Ok(record),
            Some(linked) if linked == discord_id => {
                Err(Fault::AlreadyLinked(LinkConflict::DifferentEmail))
            }
            Some(_) if record.email == email => {
                Err(Fault::AlreadyLinked(LinkConflict::DifferentDiscordId))
            }
            Some(_) => Err(Fault::AlreadyLinked(LinkConflict::Unknown)),
            None => {
                if self.store.find_by_discord_id(discord_id).await?.is_some() {
                    return Err(Fault::AlreadyLinked(LinkConflict::DifferentEmail));
                }

                let record = self
                    .store
                    .set_discord_id(record.id, Some(discord_id))
                    .await?
                    .ok_or(Fault::RecordNotFound)?;

                tracing::info!("Linked {} to discord user {}", record.email, discord_id);

                self.sync(&record, false).await?;

                Ok(record)
            }
        }
    }

    /// Unlinks a record from its platform account, optionally kicking the account first.
    pub async fn unlink(&self, email: &str, kick: bool) -> Result<MemberRecord, Fault> {
        let record = self.find_by_email(email).await?;

        let Some(discord_id) = record.discord_id else {
            return Err(Fault::NotLinked {
                email: record.email,
            });
        };

        if kick {
            self.kick_member(discord_id, None, false).await?;
        }

        self.store
            .set_discord_id(record.id, None)
            .await?
            .ok_or(Fault::RecordNotFound)
    }

    /// Pushes a record's roles and derived nickname to its linked member.
    ///
    /// The ban list is checked before the member is fetched so a banned account is reported
    /// as banned rather than missing. Roles and nickname are only written when they differ
    /// from what the platform reports.
    ///
    /// # Arguments
    /// - `record` - The record to push
    /// - `strict` - Report an unlinked record or a member missing from the community as
    ///   faults instead of skipping
    ///
    /// # Returns
    /// - `Ok(Some(PlatformMember))` - The member as it stands after the sync
    /// - `Ok(None)` - Not strict and there was nothing to sync
    /// - `Err(Fault)` - Banned, not manageable, a failed write, or a strict miss
    pub async fn sync(
        &self,
        record: &MemberRecord,
        strict: bool,
    ) -> Result<Option<PlatformMember>, Fault> {
        let Some(discord_id) = record.discord_id else {
            if strict {
                return Err(Fault::NotLinked {
                    email: record.email.clone(),
                });
            }
            return Ok(None);
        };

        if let Some(ban) = self.gateway.find_ban(self.community_id(), discord_id).await? {
            return Err(Fault::LinkedBanned {
                username: ban.username,
                email: record.email.clone(),
                reason: ban.reason,
            });
        }

        let Some(mut member) = self
            .gateway
            .fetch_member(self.community_id(), discord_id)
            .await?
        else {
            if strict {
                return Err(Fault::LinkedNotInGuild {
                    email: record.email.clone(),
                    discord_id: Some(discord_id),
                });
            }
            return Ok(None);
        };

        if !member.manageable {
            return Err(Fault::MemberNotManageable(discord_id));
        }

        let roles = self
            .scope
            .community
            .writable_roles(&member.roles, &record.roles);

        if roles != member.roles {
            self.gateway
                .set_roles(self.community_id(), discord_id, &roles)
                .await?;
            member.roles = roles;
        }

        let nickname = derive_nickname(record, &self.scope.taxonomy);

        if member.nickname.as_deref() != Some(nickname.as_str()) {
            self.gateway
                .set_nickname(self.community_id(), discord_id, &nickname)
                .await?;
            member.nickname = Some(nickname);
        }

        Ok(Some(member))
    }

    /// Strictly syncs the record matching `identifier`.
    pub async fn sync_linked(&self, identifier: &str) -> Result<MemberRecord, Fault> {
        let record = self.find_one(identifier).await?;

        self.sync(&record, true).await?;

        Ok(record)
    }

    /// Applies a role update method to many records and syncs each one.
    ///
    /// The batch size and the selection are validated before any record is touched.
    ///
    /// # Arguments
    /// - `emails` - Emails of the records to update
    /// - `method` - Update method
    /// - `selection` - Roles chosen by the caller
    /// - `elevated` - Whether the caller may grant or revoke administrator roles
    ///
    /// # Returns
    /// - `Ok(BulkResults)` - Per-email results in input order
    /// - `Err(Fault::BulkRequestLimit)` - Too many emails
    /// - `Err(Fault::InvalidRoleSelection)` - The selection doesn't fit the method
    pub async fn update_many_roles(
        &self,
        emails: &[String],
        method: RoleUpdateMethod,
        selection: &RoleSet,
        elevated: bool,
    ) -> Result<BulkResults<MemberRecord>, Fault> {
        check_bulk_limit(emails.len())?;

        let taxonomy = &self.scope.taxonomy;
        let selection = role_update::filter_admin_roles(selection, taxonomy, elevated);
        role_update::validate_selection(method, &selection, taxonomy)?;

        let mut results = Vec::with_capacity(emails.len());

        for email in emails {
            results.push(self.update_roles(email, method, &selection).await);
        }

        Ok(BulkResults::from_results(results))
    }

    async fn update_roles(
        &self,
        email: &str,
        method: RoleUpdateMethod,
        selection: &RoleSet,
    ) -> Result<MemberRecord, Fault> {
        let record = self.find_by_email(email).await?;
        let roles = role_update::apply(method, &record.roles, selection, &self.scope.taxonomy)?;

        let record = self.persist_roles(&record, roles).await?;
        self.sync(&record, false).await?;

        Ok(record)
    }

    /// Rejects role sets granting both student and employee access.
    fn check_exclusive(&self, roles: &RoleSet) -> Result<(), Fault> {
        let taxonomy = &self.scope.taxonomy;

        if taxonomy.is_student(roles) && taxonomy.is_employee(roles) {
            return Err(Fault::InvalidRoleSelection(
                "a record can't hold both the student and the employee role.".to_string(),
            ));
        }

        Ok(())
    }

    async fn persist_roles(
        &self,
        record: &MemberRecord,
        roles: RoleSet,
    ) -> Result<MemberRecord, Fault> {
        self.check_exclusive(&roles)?;

        self.store
            .update_by_id(
                record.id,
                UpdateServerMemberParam {
                    roles: Some(roles),
                    ..Default::default()
                },
            )
            .await?
            .ok_or(Fault::RecordNotFound)
    }

    /// Kicks a member after checking the bot may.
    ///
    /// When not strict, a member already gone from the community counts as kicked.
    async fn kick_member(
        &self,
        discord_id: u64,
        reason: Option<&str>,
        strict: bool,
    ) -> Result<(), Fault> {
        let Some(member) = self
            .gateway
            .fetch_member(self.community_id(), discord_id)
            .await?
        else {
            if strict {
                return Err(Fault::MemberNotInGuild(discord_id));
            }
            return Ok(());
        };

        if !member.kickable {
            return Err(Fault::MemberNotKickable(discord_id));
        }

        self.gateway
            .kick(self.community_id(), discord_id, reason)
            .await?;

        tracing::info!(
            "Kicked discord user {} from guild {}",
            discord_id,
            self.community_id()
        );

        Ok(())
    }

    /// Resolves the platform id behind an identifier.
    ///
    /// Emails resolve through their record, which must be linked. A bare platform id is
    /// accepted even when no record carries it.
    async fn resolve_discord_id(&self, identifier: &str) -> Result<u64, Fault> {
        match MemberIdentifier::parse(identifier) {
            MemberIdentifier::DiscordId(discord_id) => Ok(discord_id),
            MemberIdentifier::Email(email) => self
                .find_by_email(&email)
                .await?
                .discord_id
                .ok_or(Fault::RecordNotFound),
        }
    }

    /// Kicks the account behind an email or platform id.
    pub async fn kick(&self, identifier: &str, reason: Option<&str>) -> Result<(), Fault> {
        let discord_id = self.resolve_discord_id(identifier).await?;

        self.kick_member(discord_id, reason, true).await
    }

    /// Bans or unbans the account behind an email or platform id.
    ///
    /// # Returns
    /// - `Ok(u64)` - Platform id the action was applied to
    /// - `Err(Fault::RecordNotFound)` - Email without a linked record
    /// - `Err(Fault::MemberNotBannable)` - The member sits above the bot
    /// - `Err(Fault::BanNotFound)` - Unban of an account that isn't banned
    pub async fn ban_or_unban(
        &self,
        identifier: &str,
        action: BanAction,
        reason: Option<&str>,
    ) -> Result<u64, Fault> {
        let discord_id = self.resolve_discord_id(identifier).await?;

        match action {
            BanAction::Ban => {
                let member = self
                    .gateway
                    .fetch_member(self.community_id(), discord_id)
                    .await?;

                if matches!(member, Some(member) if !member.bannable) {
                    return Err(Fault::MemberNotBannable(discord_id));
                }

                self.gateway
                    .ban(self.community_id(), discord_id, reason)
                    .await?;

                tracing::info!(
                    "Banned discord user {} from guild {}",
                    discord_id,
                    self.community_id()
                );
            }
            BanAction::Unban => {
                if self
                    .gateway
                    .find_ban(self.community_id(), discord_id)
                    .await?
                    .is_none()
                {
                    return Err(Fault::BanNotFound(discord_id));
                }

                self.gateway.unban(self.community_id(), discord_id).await?;

                tracing::info!(
                    "Unbanned discord user {} from guild {}",
                    discord_id,
                    self.community_id()
                );
            }
        }

        Ok(discord_id)
    }

    /// Resets each record's roles to the pre-enrollment baseline, then kicks its member.
    ///
    /// The reset is persisted for every record found, linked or not, and is kept even if
    /// the kick fails, so a member that couldn't be kicked is left with the least access.
    /// A failed push of the reset doesn't stop the kick. A linked member already gone
    /// from the community counts as kicked.
    pub async fn kick_many(&self, emails: &[String]) -> Result<BulkResults<MemberRecord>, Fault> {
        check_bulk_limit(emails.len())?;

        let mut results = Vec::with_capacity(emails.len());

        for email in emails {
            results.push(self.reset_and_kick(email).await);
        }

        Ok(BulkResults::from_results(results))
    }

    async fn reset_and_kick(&self, email: &str) -> Result<MemberRecord, Fault> {
        let record = self.find_by_email(email).await?;

        let roles = role_update::kick_reset(&record.roles, &self.scope.taxonomy);
        let record = if roles == record.roles {
            record
        } else {
            self.persist_roles(&record, roles).await?
        };

        let Some(discord_id) = record.discord_id else {
            return Ok(record);
        };

        if let Err(fault) = self.sync(&record, false).await {
            tracing::warn!(
                "Kicking discord user {} without pushing the reset roles of {}: {}",
                discord_id,
                record.email,
                fault
            );
        }

        self.kick_member(discord_id, None, false).await?;

        Ok(record)
    }

    /// Sends a direct message to every linked record, and a copy to the author.
    ///
    /// # Returns
    /// - `Ok(BulkResults)` - Per-email delivery results in input order
    /// - `Err(Fault::BulkRequestLimit)` - Too many emails
    /// - `Err(Fault::MessageTooLong)` - The message exceeds the platform limit
    pub async fn dm_many(
        &self,
        emails: &[String],
        message: &str,
        author_id: Option<u64>,
    ) -> Result<BulkResults<MemberRecord>, Fault> {
        check_bulk_limit(emails.len())?;
        check_message_length(message)?;

        let mut results = Vec::with_capacity(emails.len());

        for email in emails {
            results.push(self.send_dm(email, message).await);
        }

        if let Some(author_id) = author_id {
            if let Err(e) = self.gateway.send_dm(author_id, message).await {
                tracing::warn!("Failed to send message copy to author {}: {}", author_id, e);
            }
        }

        Ok(BulkResults::from_results(results))
    }

    async fn send_dm(&self, email: &str, message: &str) -> Result<MemberRecord, Fault> {
        let record = self.find_by_email(email).await?;

        let Some(discord_id) = record.discord_id else {
            return Err(Fault::NotLinked {
                email: record.email,
            });
        };

        self.gateway.send_dm(discord_id, message).await?;

        Ok(record)
    }

    /// Syncs a member that just joined the community.
    ///
    /// # Returns
    /// - `Ok(MemberRecord)` - The member's record, its roles and nickname pushed
    /// - `Err(Fault::NotLinkedButInGuild)` - No record is linked to the member
    /// - `Err(Fault)` - The sync failed, e.g. `MemberNotManageable`
    pub async fn handle_member_joined(
        &self,
        member: &PlatformMember,
    ) -> Result<MemberRecord, Fault> {
        let record = self
            .store
            .find_by_discord_id(member.discord_id)
            .await?
            .ok_or(Fault::NotLinkedButInGuild {
                discord_id: member.discord_id,
            })?;

        self.sync(&record, false).await?;

        Ok(record)
    }

    /// Copies a member's platform roles to its record and refreshes the nickname.
    ///
    /// Roles changed on the platform win over the record. Managed roles aren't stored
    /// since they're kept on every write anyway.
    pub async fn handle_member_roles_changed(
        &self,
        member: &PlatformMember,
    ) -> Result<MemberRecord, Fault> {
        let record = self
            .store
            .find_by_discord_id(member.discord_id)
            .await?
            .ok_or(Fault::NotLinkedButInGuild {
                discord_id: member.discord_id,
            })?;

        let roles: RoleSet = member
            .roles
            .iter()
            .filter(|role_id| {
                matches!(self.scope.community.role(**role_id), Some(role) if !role.managed)
            })
            .copied()
            .collect();

        let record = if roles == record.roles {
            record
        } else {
            self.store
                .update_by_id(
                    record.id,
                    UpdateServerMemberParam {
                        roles: Some(roles),
                        ..Default::default()
                    },
                )
                .await?
                .ok_or(Fault::RecordNotFound)?
        };

        let nickname = derive_nickname(&record, &self.scope.taxonomy);

        if member.manageable && member.nickname.as_deref() != Some(nickname.as_str()) {
            self.gateway
                .set_nickname(self.community_id(), member.discord_id, &nickname)
                .await?;
        }

        Ok(record)
    }
}
