//! Role administration: cohort roles and bulk role deletion.

use crate::server::{
    error::fault::Fault,
    gateway::PlatformGateway,
    model::{
        bulk::{check_bulk_limit, BulkResults},
        platform::{CommunityRole, NewRole},
    },
    policy::taxonomy::cohort_name,
    service::community::CommunityScope,
};

/// Colour given to new cohort roles.
pub const COHORT_ROLE_COLOUR: u32 = 0xED4245;

const COHORT_ROLE_REASON: &str = "Setting up a new cohort for specified instructor.";

pub struct RoleService<'a> {
    gateway: &'a dyn PlatformGateway,
    scope: &'a CommunityScope,
}

impl<'a> RoleService<'a> {
    pub fn new(gateway: &'a dyn PlatformGateway, scope: &'a CommunityScope) -> Self {
        Self { gateway, scope }
    }

    /// Creates a mentionable cohort role.
    ///
    /// # Arguments
    /// - `name` - Cohort name, typically the instructor's first name and last initial
    ///
    /// # Returns
    /// - `Ok(CommunityRole)` - The created `cohort-` role
    /// - `Err(Fault::InvalidRoleSelection)` - Blank name, or a role with that name exists
    /// - `Err(Fault::RoleCreateFailed)` - The platform refused the role
    pub async fn create_cohort_role(&self, name: &str) -> Result<CommunityRole, Fault> {
        let name = cohort_name(name).ok_or_else(|| {
            Fault::InvalidRoleSelection("the cohort name is blank".to_string())
        })?;

        if self
            .scope
            .community
            .roles
            .iter()
            .any(|role| role.name.trim().eq_ignore_ascii_case(&name))
        {
            return Err(Fault::InvalidRoleSelection(format!(
                "a role named {} already exists",
                name
            )));
        }

        let role = self
            .gateway
            .create_role(
                self.scope.id(),
                &NewRole {
                    name,
                    colour: COHORT_ROLE_COLOUR,
                    mentionable: true,
                    reason: Some(COHORT_ROLE_REASON.to_string()),
                },
            )
            .await?;

        tracing::info!("Created cohort role {} ({})", role.name, role.id);

        Ok(role)
    }

    /// Deletes many roles of the community.
    ///
    /// Key roles, `@everyone` and roles managed by an integration are refused per item
    /// since the taxonomy or the platform depends on them.
    ///
    /// # Returns
    /// - `Ok(BulkResults)` - Per-role results in input order
    /// - `Err(Fault::InvalidRoleSelection)` - No roles were given
    /// - `Err(Fault::BulkRequestLimit)` - Too many roles
    pub async fn delete_many(&self, role_ids: &[u64]) -> Result<BulkResults<CommunityRole>, Fault> {
        if role_ids.is_empty() {
            return Err(Fault::InvalidRoleSelection(
                "no roles were mentioned".to_string(),
            ));
        }
        check_bulk_limit(role_ids.len())?;

        let mut results = Vec::with_capacity(role_ids.len());

        for role_id in role_ids {
            results.push(self.delete_one(*role_id).await);
        }

        Ok(BulkResults::from_results(results))
    }

    async fn delete_one(&self, role_id: u64) -> Result<CommunityRole, Fault> {
        let role = self
            .scope
            .community
            .role(role_id)
            .filter(|_| role_id != self.scope.id())
            .cloned()
            .ok_or_else(|| {
                Fault::InvalidRoleSelection(format!("<@&{}> can't be deleted", role_id))
            })?;

        if self.scope.taxonomy.is_key_role(role_id) || role.managed {
            return Err(Fault::InvalidRoleSelection(format!(
                "{} is a key role or managed by an integration",
                role.name
            )));
        }

        self.gateway.delete_role(self.scope.id(), role_id).await?;

        Ok(role)
    }
}
