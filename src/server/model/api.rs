//! JSON payloads exchanged over the HTTP API.
//!
//! Platform ids are serialized as strings since snowflakes exceed the integer range
//! JavaScript clients can represent.

use serde::{Deserialize, Serialize};

use crate::server::{
    error::fault::Fault,
    model::{
        bulk::{BulkResults, ResultsStats},
        server_member::MemberRecord,
    },
};

/// Error body returned for every failed request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaultDto {
    pub code: String,
    pub message: String,
}

impl FaultDto {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl From<&Fault> for FaultDto {
    fn from(fault: &Fault) -> Self {
        Self::new(fault.code(), fault.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerMemberDto {
    pub id: i32,
    pub discord_id: Option<String>,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub roles: Vec<String>,
}

impl From<MemberRecord> for ServerMemberDto {
    fn from(record: MemberRecord) -> Self {
        Self {
            id: record.id,
            discord_id: record.discord_id.map(|id| id.to_string()),
            email: record.email,
            first_name: record.first_name,
            last_name: record.last_name,
            roles: record.roles.iter().map(|id| id.to_string()).collect(),
        }
    }
}

/// Platform account a moderation action was applied to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscordIdDto {
    pub discord_id: String,
}

/// Single entry of a bulk response, either `{"ok": ...}` or `{"fault": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultDto<T> {
    Ok(T),
    Fault(FaultDto),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulkResultsDto<T> {
    pub results: Vec<ResultDto<T>>,
    pub stats: ResultsStats,
}

impl<T> BulkResultsDto<T> {
    /// Converts bulk results, mapping each successful value with `f`.
    pub fn from_bulk<U>(bulk: BulkResults<U>, f: impl Fn(U) -> T) -> Self {
        Self {
            stats: bulk.stats,
            results: bulk
                .results
                .into_iter()
                .map(|result| match result {
                    Ok(value) => ResultDto::Ok(f(value)),
                    Err(fault) => ResultDto::Fault(FaultDto::from(&fault)),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreateServerMemberDto {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub discord_id: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreateManyServerMembersDto {
    pub members: Vec<CreateServerMemberDto>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct UpdateServerMemberDto {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub roles: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EmailsDto {
    pub emails: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChangeRolesDto {
    pub emails: Vec<String>,
    #[serde(default)]
    pub selected_roles: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct BanDto {
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DirectMessageManyDto {
    pub emails: Vec<String>,
    pub message: String,
    #[serde(default)]
    pub author_discord_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct UnlinkQuery {
    #[serde(default)]
    pub kick: bool,
}
