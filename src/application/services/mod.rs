//! Application services - Use case implementations
//!
//! Each service accepts its repository ports explicitly and returns domain
//! entities. Services report failures with `anyhow`, wrapping the typed
//! errors the HTTP layer maps onto status codes.

pub mod builder_service;
pub mod campaign_service;
pub mod character_service;
pub mod debounced_writer;
pub mod equipment_resolver;
pub mod errors;
pub mod resource_service;
pub mod sheet_service;

pub use builder_service::{BuilderService, StepInput};
pub use campaign_service::{CampaignDetails, CampaignService, CreateCampaignRequest};
pub use character_service::{CharacterService, CharacterServiceImpl, CreateCharacterRequest};
pub use debounced_writer::DebounceSettings;
pub use errors::ServiceError;
pub use resource_service::{ResourceError, ResourceService, ResourceSnapshot, RollResult};
pub use sheet_service::{CharacterSheet, SheetService};
