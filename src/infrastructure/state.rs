//! Shared application state

use std::sync::Arc;

use anyhow::Result;

use crate::application::ports::outbound::{
    CampaignRepositoryPort, CatalogRepositoryPort, CharacterDataPort, CharacterRepositoryPort,
};
use crate::application::services::{
    BuilderService, CampaignService, CharacterServiceImpl, ResourceService, SheetService,
};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::persistence::SqliteRepository;

/// Shared application state
pub struct AppState {
    pub config: AppConfig,
    pub repository: SqliteRepository,
    /// Catalog reads go straight to the repository
    pub catalog: Arc<dyn CatalogRepositoryPort>,
    // Application services
    pub character_service: CharacterServiceImpl,
    pub sheet_service: SheetService,
    pub resource_service: Arc<ResourceService>,
    pub builder_service: Arc<BuilderService>,
    pub campaign_service: CampaignService,
}

impl AppState {
    pub async fn new(config: AppConfig) -> Result<Self> {
        let repository = SqliteRepository::new(&config.database_url).await?;
        Ok(Self::with_repository(config, repository))
    }

    pub fn with_repository(config: AppConfig, repository: SqliteRepository) -> Self {
        let characters: Arc<dyn CharacterRepositoryPort> = Arc::new(repository.characters());
        let data: Arc<dyn CharacterDataPort> = Arc::new(repository.characters());
        let catalog: Arc<dyn CatalogRepositoryPort> = Arc::new(repository.catalog());
        let campaigns: Arc<dyn CampaignRepositoryPort> = Arc::new(repository.campaigns());

        let resource_service = Arc::new(ResourceService::new(
            data.clone(),
            config.debounce_settings(),
        ));

        Self {
            character_service: CharacterServiceImpl::new(
                characters.clone(),
                data.clone(),
                campaigns.clone(),
            ),
            sheet_service: SheetService::new(data, resource_service.clone()),
            builder_service: Arc::new(BuilderService::new(catalog.clone(), characters.clone())),
            campaign_service: CampaignService::new(campaigns, characters),
            resource_service,
            catalog,
            repository,
            config,
        }
    }
}
