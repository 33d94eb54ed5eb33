//! Member record endpoints under `/api/discord/guilds/{guild_id}/servermembers`.
//!
//! Every handler loads the community scope of the path's guild, then runs one engine
//! operation. Faults keep their own status and `{code, message}` body. Bulk operations
//! answer 200 with per-item results even when some items failed. Callers of the API are
//! trusted operators, so role updates may grant administrator roles.

use std::str::FromStr;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::server::{
    data::ServerMemberRepository,
    error::AppError,
    model::{
        api::{
            BanDto, BulkResultsDto, ChangeRolesDto, CreateManyServerMembersDto,
            CreateServerMemberDto, DirectMessageManyDto, DiscordIdDto, EmailsDto,
            ServerMemberDto, UnlinkQuery, UpdateServerMemberDto,
        },
        server_member::{
            parse_dto_id, parse_role_ids, CreateServerMemberParam, UpdateServerMemberParam,
        },
    },
    policy::role_update::RoleUpdateMethod,
    service::{
        community::CommunityScope,
        server_member::{BanAction, ServerMemberService},
    },
    state::AppState,
};

async fn load_scope(state: &AppState, guild_id: u64) -> Result<CommunityScope, AppError> {
    CommunityScope::load(state.gateway.as_ref(), guild_id).await
}

/// Create many member records.
///
/// # Returns
/// - `200 OK` - Per-item results, failed items carry their fault
/// - `400 Bad Request` - More than the bulk limit, or an unparseable id
pub async fn create_many(
    State(state): State<AppState>,
    Path(guild_id): Path<u64>,
    Json(payload): Json<CreateManyServerMembersDto>,
) -> Result<impl IntoResponse, AppError> {
    let params = payload
        .members
        .into_iter()
        .map(CreateServerMemberParam::from_dto)
        .collect::<Result<Vec<_>, _>>()?;

    let scope = load_scope(&state, guild_id).await?;
    let store = ServerMemberRepository::new(&state.db);
    let service = ServerMemberService::new(&store, state.gateway.as_ref(), &scope);

    let results = service.create_many(params).await?;

    Ok((
        StatusCode::OK,
        Json(BulkResultsDto::from_bulk(results, ServerMemberDto::from)),
    ))
}

/// Find many member records by email.
pub async fn find_many(
    State(state): State<AppState>,
    Path(guild_id): Path<u64>,
    Json(payload): Json<EmailsDto>,
) -> Result<impl IntoResponse, AppError> {
    let scope = load_scope(&state, guild_id).await?;
    let store = ServerMemberRepository::new(&state.db);
    let service = ServerMemberService::new(&store, state.gateway.as_ref(), &scope);

    let results = service.find_many_by_emails(&payload.emails).await;

    Ok((
        StatusCode::OK,
        Json(BulkResultsDto::from_bulk(results, ServerMemberDto::from)),
    ))
}

/// Create a member record.
///
/// # Returns
/// - `201 Created` - The created record
/// - `400 Bad Request` - Invalid record, duplicate email, or a student holding an employee role
pub async fn create_one(
    State(state): State<AppState>,
    Path(guild_id): Path<u64>,
    Json(payload): Json<CreateServerMemberDto>,
) -> Result<impl IntoResponse, AppError> {
    let param = CreateServerMemberParam::from_dto(payload)?;

    let scope = load_scope(&state, guild_id).await?;
    let store = ServerMemberRepository::new(&state.db);
    let service = ServerMemberService::new(&store, state.gateway.as_ref(), &scope);

    let record = service.create(param).await?;

    Ok((StatusCode::CREATED, Json(ServerMemberDto::from(record))))
}

/// Direct message many linked members.
pub async fn direct_message_many(
    State(state): State<AppState>,
    Path(guild_id): Path<u64>,
    Json(payload): Json<DirectMessageManyDto>,
) -> Result<impl IntoResponse, AppError> {
    let author_id = payload
        .author_discord_id
        .as_deref()
        .map(|id| parse_dto_id("author_discord_id", id))
        .transpose()?;

    let scope = load_scope(&state, guild_id).await?;
    let store = ServerMemberRepository::new(&state.db);
    let service = ServerMemberService::new(&store, state.gateway.as_ref(), &scope);

    let results = service
        .dm_many(&payload.emails, &payload.message, author_id)
        .await?;

    Ok((
        StatusCode::OK,
        Json(BulkResultsDto::from_bulk(results, ServerMemberDto::from)),
    ))
}

async fn ban_or_unban(
    state: AppState,
    guild_id: u64,
    identifier: String,
    action: BanAction,
    reason: Option<String>,
) -> Result<impl IntoResponse, AppError> {
    let scope = load_scope(&state, guild_id).await?;
    let store = ServerMemberRepository::new(&state.db);
    let service = ServerMemberService::new(&store, state.gateway.as_ref(), &scope);

    let discord_id = service
        .ban_or_unban(&identifier, action, reason.as_deref())
        .await?;

    Ok((
        StatusCode::OK,
        Json(DiscordIdDto {
            discord_id: discord_id.to_string(),
        }),
    ))
}

/// Ban the account behind an email or a discord id.
///
/// A bare discord id is banned even when no record exists for it.
pub async fn ban(
    State(state): State<AppState>,
    Path((guild_id, identifier)): Path<(u64, String)>,
    Json(payload): Json<BanDto>,
) -> Result<impl IntoResponse, AppError> {
    ban_or_unban(state, guild_id, identifier, BanAction::Ban, payload.reason).await
}

/// Unban the account behind an email or a discord id.
pub async fn unban(
    State(state): State<AppState>,
    Path((guild_id, identifier)): Path<(u64, String)>,
) -> Result<impl IntoResponse, AppError> {
    ban_or_unban(state, guild_id, identifier, BanAction::Unban, None).await
}

/// Reset the roles of many members to the pre-enrollment baseline, then kick them.
pub async fn kick_many(
    State(state): State<AppState>,
    Path(guild_id): Path<u64>,
    Json(payload): Json<EmailsDto>,
) -> Result<impl IntoResponse, AppError> {
    let scope = load_scope(&state, guild_id).await?;
    let store = ServerMemberRepository::new(&state.db);
    let service = ServerMemberService::new(&store, state.gateway.as_ref(), &scope);

    let results = service.kick_many(&payload.emails).await?;

    Ok((
        StatusCode::OK,
        Json(BulkResultsDto::from_bulk(results, ServerMemberDto::from)),
    ))
}

/// Push a linked record's roles and nickname to its member.
///
/// # Returns
/// - `200 OK` - The synced record
/// - `400 Bad Request` - The record isn't linked
/// - `404 Not Found` - No record, or the linked account isn't in the guild
pub async fn sync_linked(
    State(state): State<AppState>,
    Path((guild_id, identifier)): Path<(u64, String)>,
) -> Result<impl IntoResponse, AppError> {
    let scope = load_scope(&state, guild_id).await?;
    let store = ServerMemberRepository::new(&state.db);
    let service = ServerMemberService::new(&store, state.gateway.as_ref(), &scope);

    let record = service.sync_linked(&identifier).await?;

    Ok((StatusCode::OK, Json(ServerMemberDto::from(record))))
}

/// Apply a role update method to many records.
///
/// # Returns
/// - `200 OK` - Per-item results
/// - `400 Bad Request` - Unknown method, invalid selection, or more than the bulk limit
pub async fn update_many_roles(
    State(state): State<AppState>,
    Path((guild_id, method)): Path<(u64, String)>,
    Json(payload): Json<ChangeRolesDto>,
) -> Result<impl IntoResponse, AppError> {
    let method = RoleUpdateMethod::from_str(&method)?;
    let selection = parse_role_ids(&payload.selected_roles)?;

    let scope = load_scope(&state, guild_id).await?;
    let store = ServerMemberRepository::new(&state.db);
    let service = ServerMemberService::new(&store, state.gateway.as_ref(), &scope);

    let results = service
        .update_many_roles(&payload.emails, method, &selection, true)
        .await?;

    Ok((
        StatusCode::OK,
        Json(BulkResultsDto::from_bulk(results, ServerMemberDto::from)),
    ))
}

/// Update a record, then sync it to its member if linked.
pub async fn update_and_sync(
    State(state): State<AppState>,
    Path((guild_id, identifier)): Path<(u64, String)>,
    Json(payload): Json<UpdateServerMemberDto>,
) -> Result<impl IntoResponse, AppError> {
    let param = UpdateServerMemberParam::from_dto(payload)?;

    let scope = load_scope(&state, guild_id).await?;
    let store = ServerMemberRepository::new(&state.db);
    let service = ServerMemberService::new(&store, state.gateway.as_ref(), &scope);

    let record = service.update_one_and_sync(&identifier, param).await?;

    Ok((StatusCode::OK, Json(ServerMemberDto::from(record))))
}

/// Link a discord account to the record of an email.
///
/// # Returns
/// - `200 OK` - The linked record, also when it was already linked to this account
/// - `400 Bad Request` - Either side is already linked elsewhere
/// - `404 Not Found` - No record for the email
pub async fn link(
    State(state): State<AppState>,
    Path((guild_id, email, discord_id)): Path<(u64, String, u64)>,
) -> Result<impl IntoResponse, AppError> {
    let scope = load_scope(&state, guild_id).await?;
    let store = ServerMemberRepository::new(&state.db);
    let service = ServerMemberService::new(&store, state.gateway.as_ref(), &scope);

    let record = service.link(&email, discord_id).await?;

    Ok((StatusCode::OK, Json(ServerMemberDto::from(record))))
}

/// Unlink the discord account of a record, kicking it first with `?kick=true`.
pub async fn unlink(
    State(state): State<AppState>,
    Path((guild_id, email)): Path<(u64, String)>,
    Query(query): Query<UnlinkQuery>,
) -> Result<impl IntoResponse, AppError> {
    let scope = load_scope(&state, guild_id).await?;
    let store = ServerMemberRepository::new(&state.db);
    let service = ServerMemberService::new(&store, state.gateway.as_ref(), &scope);

    let record = service.unlink(&email, query.kick).await?;

    Ok((StatusCode::OK, Json(ServerMemberDto::from(record))))
}

/// Update a record without touching the platform.
pub async fn update_one(
    State(state): State<AppState>,
    Path((guild_id, identifier)): Path<(u64, String)>,
    Json(payload): Json<UpdateServerMemberDto>,
) -> Result<impl IntoResponse, AppError> {
    let param = UpdateServerMemberParam::from_dto(payload)?;

    let scope = load_scope(&state, guild_id).await?;
    let store = ServerMemberRepository::new(&state.db);
    let service = ServerMemberService::new(&store, state.gateway.as_ref(), &scope);

    let record = service.update_one(&identifier, param).await?;

    Ok((StatusCode::OK, Json(ServerMemberDto::from(record))))
}

/// Find a record by email or discord id.
///
/// # Returns
/// - `200 OK` - The record
/// - `404 Not Found` - No record matches
pub async fn find_one(
    State(state): State<AppState>,
    Path((guild_id, identifier)): Path<(u64, String)>,
) -> Result<impl IntoResponse, AppError> {
    let scope = load_scope(&state, guild_id).await?;
    let store = ServerMemberRepository::new(&state.db);
    let service = ServerMemberService::new(&store, state.gateway.as_ref(), &scope);

    let record = service.find_one(&identifier).await?;

    Ok((StatusCode::OK, Json(ServerMemberDto::from(record))))
}

/// Delete an unlinked record.
///
/// # Returns
/// - `204 No Content` - The record was deleted
/// - `400 Bad Request` - The record is still linked
/// - `404 Not Found` - No record for the email
pub async fn delete_one(
    State(state): State<AppState>,
    Path((guild_id, email)): Path<(u64, String)>,
) -> Result<impl IntoResponse, AppError> {
    let scope = load_scope(&state, guild_id).await?;
    let store = ServerMemberRepository::new(&state.db);
    let service = ServerMemberService::new(&store, state.gateway.as_ref(), &scope);

    service.delete(&email).await?;

    Ok(StatusCode::NO_CONTENT)
}
