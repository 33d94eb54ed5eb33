//! Member record domain models and parameters.
//!
//! A member record is the persisted enrollment of a person: their email, name, the
//! roles they should hold, and optionally the platform account they're linked to.

use chrono::{DateTime, Utc};
use sea_orm::DbErr;

use crate::server::{
    error::AppError,
    model::{
        api::{CreateServerMemberDto, UpdateServerMemberDto},
        platform::RoleSet,
    },
};

/// Persisted member record.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberRecord {
    /// Internal id of the record
    pub id: i32,
    /// Linked platform account, `None` while unlinked
    pub discord_id: Option<u64>,
    /// Normalized (trimmed, lowercase) unique email
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// Roles the member should hold on the platform
    pub roles: RoleSet,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MemberRecord {
    /// Converts entity models to a member record at the repository boundary.
    ///
    /// # Arguments
    /// - `entity` - The member row
    /// - `roles` - The member's role rows
    ///
    /// # Returns
    /// - `Ok(MemberRecord)` - The converted record
    /// - `Err(DbErr::Custom)` - A stored discord id or role id failed to parse as u64
    pub fn from_entity(
        entity: entity::server_member::Model,
        roles: Vec<entity::server_member_role::Model>,
    ) -> Result<Self, DbErr> {
        let discord_id = entity
            .discord_id
            .map(|id| {
                id.parse::<u64>()
                    .map_err(|e| DbErr::Custom(format!("Failed to parse discord_id: {}", e)))
            })
            .transpose()?;

        let roles = roles
            .into_iter()
            .map(|role| {
                role.role_id
                    .parse::<u64>()
                    .map_err(|e| DbErr::Custom(format!("Failed to parse role_id: {}", e)))
            })
            .collect::<Result<RoleSet, DbErr>>()?;

        Ok(Self {
            id: entity.id,
            discord_id,
            email: entity.email,
            first_name: entity.first_name,
            last_name: entity.last_name,
            roles,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        })
    }
}

/// Parameters for creating a member record.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CreateServerMemberParam {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub discord_id: Option<u64>,
    pub roles: RoleSet,
}

/// Parameters for updating a member record's profile fields and/or roles.
///
/// Fields left as `None` are not modified.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UpdateServerMemberParam {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub roles: Option<RoleSet>,
}

impl CreateServerMemberParam {
    /// Converts the API payload, parsing its string ids.
    ///
    /// # Returns
    /// - `Ok(CreateServerMemberParam)` - Every id parsed
    /// - `Err(AppError::BadRequest)` - The discord id or a role id isn't a number
    pub fn from_dto(dto: CreateServerMemberDto) -> Result<Self, AppError> {
        Ok(Self {
            email: dto.email,
            first_name: dto.first_name,
            last_name: dto.last_name,
            discord_id: dto
                .discord_id
                .map(|id| parse_dto_id("discord_id", &id))
                .transpose()?,
            roles: parse_role_ids(&dto.roles)?,
        })
    }
}

impl UpdateServerMemberParam {
    pub fn from_dto(dto: UpdateServerMemberDto) -> Result<Self, AppError> {
        Ok(Self {
            email: dto.email,
            first_name: dto.first_name,
            last_name: dto.last_name,
            roles: dto.roles.as_deref().map(parse_role_ids).transpose()?,
        })
    }
}

/// Parses an id sent as a string in an API payload.
pub fn parse_dto_id(field: &str, value: &str) -> Result<u64, AppError> {
    value
        .trim()
        .parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid {}: {}", field, value)))
}

/// Parses role ids sent as strings in an API payload.
pub fn parse_role_ids(values: &[String]) -> Result<RoleSet, AppError> {
    values
        .iter()
        .map(|value| parse_dto_id("role id", value))
        .collect()
}

/// A lookup key accepted wherever an email or a platform id may be given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberIdentifier {
    Email(String),
    DiscordId(u64),
}

impl MemberIdentifier {
    /// Parses an identifier; anything containing `@` is an email, digits are a platform id.
    ///
    /// Input that is neither is treated as an email so the lookup reports it as not found.
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();

        if trimmed.contains('@') {
            return Self::Email(normalize_email(trimmed));
        }

        match trimmed.parse::<u64>() {
            Ok(id) => Self::DiscordId(id),
            Err(_) => Self::Email(normalize_email(trimmed)),
        }
    }
}

/// Normalizes an email for storage and lookup.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
