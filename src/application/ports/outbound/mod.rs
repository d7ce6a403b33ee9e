//! Outbound ports - Interfaces that the application requires from external systems

mod repository_port;

#[cfg(test)]
pub use repository_port::{
    MockCampaignRepositoryPort, MockCatalogRepositoryPort, MockCharacterDataPort,
    MockCharacterRepositoryPort,
};
pub use repository_port::{
    CampaignRepositoryPort, CatalogRepositoryPort, CharacterDataPort, CharacterRepositoryPort,
    RepoError,
};
