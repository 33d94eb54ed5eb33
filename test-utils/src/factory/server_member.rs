//! Server member factory for creating test member records.
//!
//! Inserts a `server_member` row and one `server_member_role` row per role.

use crate::factory::helpers::next_id;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr, EntityTrait};

/// Factory for creating test member records with customizable fields.
///
/// # Example
///
/// ```rust,ignore
/// use test_utils::factory::server_member::ServerMemberFactory;
///
/// let member = ServerMemberFactory::new(&db)
///     .email("jane@example.com")
///     .first_name("Jane")
///     .roles(&[111111111])
///     .build()
///     .await?;
/// ```
pub struct ServerMemberFactory<'a> {
    db: &'a DatabaseConnection,
    discord_id: Option<String>,
    email: String,
    first_name: String,
    last_name: String,
    roles: Vec<String>,
}

impl<'a> ServerMemberFactory<'a> {
    /// Creates a new ServerMemberFactory with default values.
    ///
    /// Defaults:
    /// - discord_id: `None`
    /// - email: `"member{id}@example.com"` where id is auto-incremented
    /// - first_name: `"First{id}"`
    /// - last_name: `"Last{id}"`
    /// - roles: none
    ///
    /// # Arguments
    /// - `db` - Database connection for inserting the entity
    pub fn new(db: &'a DatabaseConnection) -> Self {
        let id = next_id();
        Self {
            db,
            discord_id: None,
            email: format!("member{}@example.com", id),
            first_name: format!("First{}", id),
            last_name: format!("Last{}", id),
            roles: Vec::new(),
        }
    }

    /// Links the record to a Discord account.
    pub fn discord_id(mut self, discord_id: u64) -> Self {
        self.discord_id = Some(discord_id.to_string());
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    pub fn first_name(mut self, first_name: impl Into<String>) -> Self {
        self.first_name = first_name.into();
        self
    }

    pub fn last_name(mut self, last_name: impl Into<String>) -> Self {
        self.last_name = last_name.into();
        self
    }

    /// Sets the role ids stored for the record.
    pub fn roles(mut self, roles: &[u64]) -> Self {
        self.roles = roles.iter().map(|id| id.to_string()).collect();
        self
    }

    /// Builds and inserts the member record and its role rows.
    ///
    /// # Returns
    /// - `Ok(entity::server_member::Model)` - Created member entity
    /// - `Err(DbErr)` - Database error during insert
    pub async fn build(self) -> Result<entity::server_member::Model, DbErr> {
        let now = Utc::now();
        let member = entity::server_member::ActiveModel {
            discord_id: ActiveValue::Set(self.discord_id),
            email: ActiveValue::Set(self.email),
            first_name: ActiveValue::Set(self.first_name),
            last_name: ActiveValue::Set(self.last_name),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
            ..Default::default()
        }
        .insert(self.db)
        .await?;

        if !self.roles.is_empty() {
            entity::prelude::ServerMemberRole::insert_many(self.roles.into_iter().map(|role_id| {
                entity::server_member_role::ActiveModel {
                    server_member_id: ActiveValue::Set(member.id),
                    role_id: ActiveValue::Set(role_id),
                }
            }))
            .exec_without_returning(self.db)
            .await?;
        }

        Ok(member)
    }
}

/// Creates an unlinked member record with default values.
///
/// Shorthand for `ServerMemberFactory::new(db).build().await`.
pub async fn create_server_member(
    db: &DatabaseConnection,
) -> Result<entity::server_member::Model, DbErr> {
    ServerMemberFactory::new(db).build().await
}

/// Creates a member record linked to the given Discord account.
///
/// # Arguments
/// - `db` - Database connection
/// - `discord_id` - Discord user ID to link
/// - `roles` - Role ids stored for the record
pub async fn create_linked_server_member(
    db: &DatabaseConnection,
    discord_id: u64,
    roles: &[u64],
) -> Result<entity::server_member::Model, DbErr> {
    ServerMemberFactory::new(db)
        .discord_id(discord_id)
        .roles(roles)
        .build()
        .await
}
