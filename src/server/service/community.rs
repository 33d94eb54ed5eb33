use crate::server::{
    error::AppError,
    gateway::PlatformGateway,
    model::platform::Community,
    policy::taxonomy::RoleTaxonomy,
};

/// A community snapshot together with its resolved role taxonomy.
///
/// Loaded once per command invocation, API request or bot event and handed to the
/// reconciliation engine, which never resolves the taxonomy itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommunityScope {
    pub community: Community,
    pub taxonomy: RoleTaxonomy,
}

impl CommunityScope {
    /// Fetches the community and resolves its taxonomy.
    ///
    /// # Arguments
    /// - `gateway` - Platform gateway used to fetch the community
    /// - `community_id` - Guild id
    ///
    /// # Returns
    /// - `Ok(CommunityScope)` - Community fetched and every key role found
    /// - `Err(AppError::Fault)` - Community isn't visible to the bot
    /// - `Err(AppError::TaxonomyErr)` - One or more key roles are missing
    pub async fn load(
        gateway: &dyn PlatformGateway,
        community_id: u64,
    ) -> Result<Self, AppError> {
        let community = gateway.fetch_community(community_id).await?;
        let taxonomy = RoleTaxonomy::resolve(&community)?;

        Ok(Self {
            community,
            taxonomy,
        })
    }

    pub fn id(&self) -> u64 {
        self.community.id
    }
}
