//! Server member repository for database operations.
//!
//! This module provides the `ServerMemberRepository` for managing member records and their
//! role rows. Records are returned as `MemberRecord` domain models, converting SeaORM entity
//! models at the repository boundary so stored string ids never leak past this layer.
//!
//! The inherent methods mirror the other repositories and return `DbErr`. The `MemberStore`
//! implementation adds normalization and validation on top and maps failures to faults.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, SqlErr, TransactionTrait,
};

use crate::server::{
    data::store::{validate_member_fields, MemberStore},
    error::fault::Fault,
    model::{
        platform::RoleSet,
        server_member::{
            normalize_email, CreateServerMemberParam, MemberRecord, UpdateServerMemberParam,
        },
    },
};

/// Repository providing database operations for member records.
pub struct ServerMemberRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> ServerMemberRepository<'a> {
    /// Creates a new ServerMemberRepository instance.
    ///
    /// # Arguments
    /// - `db` - Reference to the database connection
    ///
    /// # Returns
    /// - `ServerMemberRepository` - New repository instance
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Loads the role rows of a member and converts both to a domain record.
    async fn load(&self, entity: entity::server_member::Model) -> Result<MemberRecord, DbErr> {
        let roles = entity::prelude::ServerMemberRole::find()
            .filter(entity::server_member_role::Column::ServerMemberId.eq(entity.id))
            .all(self.db)
            .await?;

        MemberRecord::from_entity(entity, roles)
    }

    async fn load_optional(
        &self,
        entity: Option<entity::server_member::Model>,
    ) -> Result<Option<MemberRecord>, DbErr> {
        match entity {
            Some(entity) => Ok(Some(self.load(entity).await?)),
            None => Ok(None),
        }
    }

    /// Finds a member record by email.
    ///
    /// # Arguments
    /// - `email` - Email to match exactly, callers normalize it first
    ///
    /// # Returns
    /// - `Ok(Some(MemberRecord))` - Record found with its roles
    /// - `Ok(None)` - No record has that email
    /// - `Err(DbErr)` - Database error during query
    pub async fn find_by_email(&self, email: &str) -> Result<Option<MemberRecord>, DbErr> {
        let entity = entity::prelude::ServerMember::find()
            .filter(entity::server_member::Column::Email.eq(email))
            .one(self.db)
            .await?;

        self.load_optional(entity).await
    }

    /// Finds the member record linked to a Discord account.
    ///
    /// # Arguments
    /// - `discord_id` - Discord user ID as u64
    ///
    /// # Returns
    /// - `Ok(Some(MemberRecord))` - Linked record found
    /// - `Ok(None)` - No record is linked to that account
    /// - `Err(DbErr)` - Database error during query
    pub async fn find_by_discord_id(&self, discord_id: u64) -> Result<Option<MemberRecord>, DbErr> {
        let entity = entity::prelude::ServerMember::find()
            .filter(entity::server_member::Column::DiscordId.eq(discord_id.to_string()))
            .one(self.db)
            .await?;

        self.load_optional(entity).await
    }

    /// Finds a record by email, falling back to the record linked to `discord_id`.
    ///
    /// The email match wins when both exist so link conflicts can be reported against the
    /// record the caller asked for.
    pub async fn find_by_email_or_discord_id(
        &self,
        email: &str,
        discord_id: u64,
    ) -> Result<Option<MemberRecord>, DbErr> {
        match self.find_by_email(email).await? {
            Some(record) => Ok(Some(record)),
            None => self.find_by_discord_id(discord_id).await,
        }
    }

    /// Inserts a member record and its role rows in one transaction.
    ///
    /// # Arguments
    /// - `param` - Record fields and roles, inserted as given
    ///
    /// # Returns
    /// - `Ok(MemberRecord)` - The created record
    /// - `Err(DbErr)` - Database error, including unique email or discord id violations
    pub async fn create(&self, param: CreateServerMemberParam) -> Result<MemberRecord, DbErr> {
        let now = Utc::now();
        let txn = self.db.begin().await?;

        let member = entity::prelude::ServerMember::insert(entity::server_member::ActiveModel {
            discord_id: ActiveValue::Set(param.discord_id.map(|id| id.to_string())),
            email: ActiveValue::Set(param.email),
            first_name: ActiveValue::Set(param.first_name),
            last_name: ActiveValue::Set(param.last_name),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
            ..Default::default()
        })
        .exec_with_returning(&txn)
        .await?;

        let roles = insert_roles(&txn, member.id, &param.roles).await?;

        txn.commit().await?;

        MemberRecord::from_entity(member, roles)
    }

    /// Updates profile fields and/or replaces the roles of a record.
    ///
    /// Fields left as `None` are not modified. When roles are given, every existing role
    /// row is replaced.
    ///
    /// # Arguments
    /// - `id` - Record id
    /// - `param` - Fields to change
    ///
    /// # Returns
    /// - `Ok(Some(MemberRecord))` - The updated record
    /// - `Ok(None)` - No record has that id
    /// - `Err(DbErr)` - Database error during update
    pub async fn update_by_id(
        &self,
        id: i32,
        param: UpdateServerMemberParam,
    ) -> Result<Option<MemberRecord>, DbErr> {
        let Some(existing) = entity::prelude::ServerMember::find_by_id(id)
            .one(self.db)
            .await?
        else {
            return Ok(None);
        };

        let txn = self.db.begin().await?;

        let mut active: entity::server_member::ActiveModel = existing.into();
        if let Some(email) = param.email {
            active.email = ActiveValue::Set(email);
        }
        if let Some(first_name) = param.first_name {
            active.first_name = ActiveValue::Set(first_name);
        }
        if let Some(last_name) = param.last_name {
            active.last_name = ActiveValue::Set(last_name);
        }
        active.updated_at = ActiveValue::Set(Utc::now());

        let member = active.update(&txn).await?;

        if let Some(roles) = param.roles {
            entity::prelude::ServerMemberRole::delete_many()
                .filter(entity::server_member_role::Column::ServerMemberId.eq(id))
                .exec(&txn)
                .await?;

            insert_roles(&txn, id, &roles).await?;
        }

        txn.commit().await?;

        Ok(Some(self.load(member).await?))
    }

    /// Sets or clears the Discord account linked to a record.
    ///
    /// # Returns
    /// - `Ok(Some(MemberRecord))` - The updated record
    /// - `Ok(None)` - No record has that id
    /// - `Err(DbErr)` - Database error, including a discord id linked to another record
    pub async fn set_discord_id(
        &self,
        id: i32,
        discord_id: Option<u64>,
    ) -> Result<Option<MemberRecord>, DbErr> {
        let Some(existing) = entity::prelude::ServerMember::find_by_id(id)
            .one(self.db)
            .await?
        else {
            return Ok(None);
        };

        let mut active: entity::server_member::ActiveModel = existing.into();
        active.discord_id = ActiveValue::Set(discord_id.map(|id| id.to_string()));
        active.updated_at = ActiveValue::Set(Utc::now());

        let member = active.update(self.db).await?;

        Ok(Some(self.load(member).await?))
    }

    /// Deletes a record and its role rows by email.
    ///
    /// # Returns
    /// - `Ok(true)` - A record was deleted
    /// - `Ok(false)` - No record has that email
    /// - `Err(DbErr)` - Database error during deletion
    pub async fn delete_by_email(&self, email: &str) -> Result<bool, DbErr> {
        let Some(existing) = entity::prelude::ServerMember::find()
            .filter(entity::server_member::Column::Email.eq(email))
            .one(self.db)
            .await?
        else {
            return Ok(false);
        };

        let txn = self.db.begin().await?;

        entity::prelude::ServerMemberRole::delete_many()
            .filter(entity::server_member_role::Column::ServerMemberId.eq(existing.id))
            .exec(&txn)
            .await?;

        let result = entity::prelude::ServerMember::delete_by_id(existing.id)
            .exec(&txn)
            .await?;

        txn.commit().await?;

        Ok(result.rows_affected > 0)
    }
}

/// Inserts one role row per role id, returning the inserted rows.
async fn insert_roles<C: sea_orm::ConnectionTrait>(
    db: &C,
    server_member_id: i32,
    roles: &RoleSet,
) -> Result<Vec<entity::server_member_role::Model>, DbErr> {
    let rows: Vec<entity::server_member_role::Model> = roles
        .iter()
        .map(|role_id| entity::server_member_role::Model {
            server_member_id,
            role_id: role_id.to_string(),
        })
        .collect();

    if rows.is_empty() {
        return Ok(rows);
    }

    entity::prelude::ServerMemberRole::insert_many(rows.iter().map(|row| {
        entity::server_member_role::ActiveModel {
            server_member_id: ActiveValue::Set(row.server_member_id),
            role_id: ActiveValue::Set(row.role_id.clone()),
        }
    }))
    .exec_without_returning(db)
    .await?;

    Ok(rows)
}

/// Maps write failures, turning unique violations into validation faults.
fn map_write_err(err: DbErr) -> Fault {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(message)) => {
            let field = if message.contains("discord_id") {
                "discord_id"
            } else {
                "email"
            };
            Fault::InvalidRecord(format!("{} must be unique", field))
        }
        _ => Fault::from(err),
    }
}

fn normalize_create_param(param: CreateServerMemberParam) -> CreateServerMemberParam {
    CreateServerMemberParam {
        email: normalize_email(&param.email),
        first_name: param.first_name.trim().to_string(),
        last_name: param.last_name.trim().to_string(),
        ..param
    }
}

#[async_trait]
impl MemberStore for ServerMemberRepository<'_> {
    async fn find_by_email(&self, email: &str) -> Result<Option<MemberRecord>, Fault> {
        Ok(ServerMemberRepository::find_by_email(self, &normalize_email(email)).await?)
    }

    async fn find_by_discord_id(&self, discord_id: u64) -> Result<Option<MemberRecord>, Fault> {
        Ok(ServerMemberRepository::find_by_discord_id(self, discord_id).await?)
    }

    async fn find_by_email_or_discord_id(
        &self,
        email: &str,
        discord_id: u64,
    ) -> Result<Option<MemberRecord>, Fault> {
        Ok(
            ServerMemberRepository::find_by_email_or_discord_id(
                self,
                &normalize_email(email),
                discord_id,
            )
            .await?,
        )
    }

    async fn create(&self, param: CreateServerMemberParam) -> Result<MemberRecord, Fault> {
        let param = normalize_create_param(param);
        validate_member_fields(&param.email, &param.first_name, &param.last_name)?;

        ServerMemberRepository::create(self, param)
            .await
            .map_err(map_write_err)
    }

    async fn create_many(
        &self,
        params: Vec<CreateServerMemberParam>,
    ) -> Vec<Result<MemberRecord, Fault>> {
        let mut results = Vec::with_capacity(params.len());

        for param in params {
            results.push(MemberStore::create(self, param).await);
        }

        results
    }

    async fn update_by_id(
        &self,
        id: i32,
        param: UpdateServerMemberParam,
    ) -> Result<Option<MemberRecord>, Fault> {
        let param = UpdateServerMemberParam {
            email: param.email.as_deref().map(normalize_email),
            first_name: param.first_name.map(|name| name.trim().to_string()),
            last_name: param.last_name.map(|name| name.trim().to_string()),
            roles: param.roles,
        };

        // Unchanged fields are checked with placeholders that always pass.
        validate_member_fields(
            param.email.as_deref().unwrap_or("x@x"),
            param.first_name.as_deref().unwrap_or("x"),
            param.last_name.as_deref().unwrap_or("x"),
        )?;

        ServerMemberRepository::update_by_id(self, id, param)
            .await
            .map_err(map_write_err)
    }

    async fn set_discord_id(
        &self,
        id: i32,
        discord_id: Option<u64>,
    ) -> Result<Option<MemberRecord>, Fault> {
        ServerMemberRepository::set_discord_id(self, id, discord_id)
            .await
            .map_err(map_write_err)
    }

    async fn delete_by_email(&self, email: &str) -> Result<bool, Fault> {
        Ok(ServerMemberRepository::delete_by_email(self, &normalize_email(email)).await?)
    }
}
