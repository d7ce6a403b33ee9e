//! Builder Service - drives character drafts through the builder steps
//!
//! Drafts live in memory until finalized. Each step is checked against the
//! catalog before it is recorded; finalizing persists the character with a
//! single create call and drops the draft. Drafts left untouched are expired
//! by [`BuilderService::expire_idle`].

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, info, instrument};

use super::errors::ServiceError;
use crate::application::ports::outbound::{CatalogRepositoryPort, CharacterRepositoryPort};
use crate::domain::entities::Character;
use crate::domain::services::{BackgroundInput, BuilderError, BuilderStep, CharacterDraft};
use crate::domain::value_objects::{
    AncestryId, ClassId, CommunityId, DraftId, Experience, SubclassId, TraitScores,
};

/// The payload of one builder step
#[derive(Debug, Clone, PartialEq)]
pub enum StepInput {
    Class {
        class_id: ClassId,
        subclass_id: SubclassId,
    },
    Heritage {
        ancestry_id: AncestryId,
        community_id: CommunityId,
    },
    Traits(TraitScores),
    Background(BackgroundInput),
    Experiences(Vec<Experience>),
}

#[derive(serde::Deserialize)]
struct ClassChoice {
    class_id: ClassId,
    subclass_id: SubclassId,
}

#[derive(serde::Deserialize)]
struct HeritageChoice {
    ancestry_id: AncestryId,
    community_id: CommunityId,
}

#[derive(serde::Deserialize)]
struct ExperienceChoice {
    experiences: Vec<Experience>,
}

impl StepInput {
    /// Interpret a JSON body as the input for `step`
    pub fn from_json(step: BuilderStep, body: serde_json::Value) -> Result<Self, serde_json::Error> {
        fn parse<T: DeserializeOwned>(body: serde_json::Value) -> Result<T, serde_json::Error> {
            serde_json::from_value(body)
        }

        Ok(match step {
            BuilderStep::Class => {
                let choice: ClassChoice = parse(body)?;
                StepInput::Class {
                    class_id: choice.class_id,
                    subclass_id: choice.subclass_id,
                }
            }
            BuilderStep::Heritage => {
                let choice: HeritageChoice = parse(body)?;
                StepInput::Heritage {
                    ancestry_id: choice.ancestry_id,
                    community_id: choice.community_id,
                }
            }
            BuilderStep::Traits => StepInput::Traits(parse(body)?),
            BuilderStep::Background => StepInput::Background(parse(body)?),
            BuilderStep::Experiences => {
                StepInput::Experiences(parse::<ExperienceChoice>(body)?.experiences)
            }
        })
    }

    pub fn step(&self) -> BuilderStep {
        match self {
            StepInput::Class { .. } => BuilderStep::Class,
            StepInput::Heritage { .. } => BuilderStep::Heritage,
            StepInput::Traits(_) => BuilderStep::Traits,
            StepInput::Background(_) => BuilderStep::Background,
            StepInput::Experiences(_) => BuilderStep::Experiences,
        }
    }
}

type DraftEdit = Box<dyn FnOnce(&mut CharacterDraft) -> Result<(), BuilderError> + Send>;

struct DraftEntry {
    draft: CharacterDraft,
    touched: Instant,
}

impl DraftEntry {
    fn new(draft: CharacterDraft) -> Self {
        Self {
            draft,
            touched: Instant::now(),
        }
    }
}

pub struct BuilderService {
    catalog: Arc<dyn CatalogRepositoryPort>,
    characters: Arc<dyn CharacterRepositoryPort>,
    drafts: RwLock<HashMap<DraftId, DraftEntry>>,
}

impl BuilderService {
    pub fn new(
        catalog: Arc<dyn CatalogRepositoryPort>,
        characters: Arc<dyn CharacterRepositoryPort>,
    ) -> Self {
        Self {
            catalog,
            characters,
            drafts: RwLock::new(HashMap::new()),
        }
    }

    #[instrument(skip(self))]
    pub async fn start(&self, owner_id: &str) -> CharacterDraft {
        let draft = CharacterDraft::new(owner_id);
        self.drafts
            .write()
            .await
            .insert(draft.id, DraftEntry::new(draft.clone()));
        debug!(draft_id = %draft.id, "Started character draft");
        draft
    }

    pub async fn get(&self, owner_id: &str, id: DraftId) -> Result<CharacterDraft> {
        let drafts = self.drafts.read().await;
        let entry = drafts
            .get(&id)
            .ok_or_else(|| ServiceError::not_found("Draft", id))?;
        Self::ensure_owner(&entry.draft, owner_id)?;
        Ok(entry.draft.clone())
    }

    fn ensure_owner(draft: &CharacterDraft, owner_id: &str) -> Result<(), ServiceError> {
        if draft.owner_id != owner_id {
            return Err(ServiceError::not_owner("Draft"));
        }
        Ok(())
    }

    /// Remove a draft from the registry so no other request can act on it
    async fn take(&self, owner_id: &str, id: DraftId) -> Result<CharacterDraft> {
        let mut drafts = self.drafts.write().await;
        let entry = drafts
            .get(&id)
            .ok_or_else(|| ServiceError::not_found("Draft", id))?;
        Self::ensure_owner(&entry.draft, owner_id)?;
        drafts
            .remove(&id)
            .map(|entry| entry.draft)
            .ok_or_else(|| ServiceError::not_found("Draft", id).into())
    }

    /// Validate a step against the catalog and record it on the draft
    #[instrument(skip(self, input), fields(draft_id = %id, step = %input.step()))]
    pub async fn apply_step(
        &self,
        owner_id: &str,
        id: DraftId,
        input: StepInput,
    ) -> Result<CharacterDraft> {
        self.get(owner_id, id).await?;
        let apply = self.resolve(input).await?;

        let mut drafts = self.drafts.write().await;
        let entry = drafts
            .get_mut(&id)
            .ok_or_else(|| ServiceError::not_found("Draft", id))?;
        apply(&mut entry.draft)?;
        entry.touched = Instant::now();

        debug!(next_step = ?entry.draft.next_step(), "Recorded builder step");
        Ok(entry.draft.clone())
    }

    pub async fn discard(&self, owner_id: &str, id: DraftId) -> Result<()> {
        self.take(owner_id, id).await?;
        debug!(draft_id = %id, "Discarded character draft");
        Ok(())
    }

    /// Persist the finished character. The draft is held out of the registry
    /// while the create runs and is put back if it fails.
    #[instrument(skip(self), fields(draft_id = %id))]
    pub async fn finalize(&self, owner_id: &str, id: DraftId) -> Result<Character> {
        let draft = self.take(owner_id, id).await?;

        let created = match draft.finalize() {
            Ok(character) => self
                .characters
                .create(&character)
                .await
                .map(|_| character)
                .context("Failed to create character from draft"),
            Err(e) => Err(e.into()),
        };

        match created {
            Ok(character) => {
                info!(character_id = %character.id, "Finalized character: {}", character.name);
                Ok(character)
            }
            Err(e) => {
                self.drafts.write().await.insert(id, DraftEntry::new(draft));
                Err(e)
            }
        }
    }

    /// Drop drafts nobody has worked on for `max_idle`
    pub async fn expire_idle(&self, max_idle: Duration) -> usize {
        let mut drafts = self.drafts.write().await;
        let before = drafts.len();
        drafts.retain(|_, entry| entry.touched.elapsed() < max_idle);
        let expired = before - drafts.len();
        if expired > 0 {
            debug!(expired, "Expired idle character drafts");
        }
        expired
    }

    /// Look up the catalog records a step refers to and return the mutation
    /// to apply to the draft.
    async fn resolve(&self, input: StepInput) -> Result<DraftEdit> {
        Ok(match input {
            StepInput::Class {
                class_id,
                subclass_id,
            } => {
                let class = self
                    .catalog
                    .get_class(class_id)
                    .await
                    .context("Failed to load class")?
                    .ok_or_else(|| ServiceError::not_found("Class", class_id))?;
                let subclass = self
                    .catalog
                    .get_subclass(subclass_id)
                    .await
                    .context("Failed to load subclass")?
                    .ok_or_else(|| ServiceError::not_found("Subclass", subclass_id))?;
                Box::new(move |draft: &mut CharacterDraft| {
                    draft.choose_class(&class, &subclass)
                }) as DraftEdit
            }
            StepInput::Heritage {
                ancestry_id,
                community_id,
            } => {
                let ancestry = self
                    .catalog
                    .get_ancestry(ancestry_id)
                    .await
                    .context("Failed to load ancestry")?
                    .ok_or_else(|| ServiceError::not_found("Ancestry", ancestry_id))?;
                let community = self
                    .catalog
                    .get_community(community_id)
                    .await
                    .context("Failed to load community")?
                    .ok_or_else(|| ServiceError::not_found("Community", community_id))?;
                Box::new(move |draft: &mut CharacterDraft| {
                    draft.choose_heritage(&ancestry, &community)
                }) as DraftEdit
            }
            StepInput::Traits(traits) => {
                Box::new(move |draft: &mut CharacterDraft| draft.assign_traits(traits)) as DraftEdit
            }
            StepInput::Background(background) => {
                Box::new(move |draft: &mut CharacterDraft| draft.write_background(background))
                    as DraftEdit
            }
            StepInput::Experiences(experiences) => {
                Box::new(move |draft: &mut CharacterDraft| draft.choose_experiences(experiences))
                    as DraftEdit
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::outbound::{
        MockCatalogRepositoryPort, MockCharacterRepositoryPort, RepoError,
    };
    use crate::domain::entities::{Ancestry, CharacterClass, Community, Subclass};
    use crate::domain::value_objects::{CampaignId, CharacterId};
    use std::sync::atomic::{AtomicU32, Ordering};

    struct Catalog {
        class: CharacterClass,
        subclass: Subclass,
        ancestry: Ancestry,
        community: Community,
    }

    fn catalog() -> (Catalog, MockCatalogRepositoryPort) {
        let class = CharacterClass::new("Warrior", 6, 11);
        let subclass = Subclass::new(class.id, "Call of the Brave");
        let ancestry = Ancestry::new("Giant");
        let community = Community::new("Highborne");
        let fixture = Catalog {
            class: class.clone(),
            subclass: subclass.clone(),
            ancestry: ancestry.clone(),
            community: community.clone(),
        };

        let mut mock = MockCatalogRepositoryPort::new();
        mock.expect_get_class()
            .returning(move |id| Ok((id == class.id).then(|| class.clone())));
        mock.expect_get_subclass()
            .returning(move |id| Ok((id == subclass.id).then(|| subclass.clone())));
        mock.expect_get_ancestry()
            .returning(move |_| Ok(Some(ancestry.clone())));
        mock.expect_get_community()
            .returning(move |_| Ok(Some(community.clone())));
        (fixture, mock)
    }

    async fn complete_steps(service: &BuilderService, fixture: &Catalog, id: DraftId) {
        let steps = vec![
            StepInput::Class {
                class_id: fixture.class.id,
                subclass_id: fixture.subclass.id,
            },
            StepInput::Heritage {
                ancestry_id: fixture.ancestry.id,
                community_id: fixture.community.id,
            },
            StepInput::Traits(TraitScores {
                agility: 0,
                strength: 2,
                finesse: -1,
                instinct: 1,
                presence: 1,
                knowledge: 0,
            }),
            StepInput::Background(BackgroundInput {
                name: "Brakka".to_string(),
                ..Default::default()
            }),
            StepInput::Experiences(vec![
                Experience::new("Mercenary", 2),
                Experience::new("Blacksmith", 2),
            ]),
        ];
        for step in steps {
            service.apply_step("user-1", id, step).await.unwrap();
        }
    }

    #[tokio::test]
    async fn finalize_creates_once_and_drops_draft() {
        let (fixture, catalog) = catalog();
        let mut characters = MockCharacterRepositoryPort::new();
        characters
            .expect_create()
            .withf(|c| c.is_complete && c.hit_points.max() == 6 && c.hope.max() == 6)
            .times(1)
            .returning(|_| Ok(()));

        let service = BuilderService::new(Arc::new(catalog), Arc::new(characters));
        let draft = service.start("user-1").await;
        complete_steps(&service, &fixture, draft.id).await;

        let character = service.finalize("user-1", draft.id).await.unwrap();
        assert_eq!(character.name, "Brakka");
        assert_eq!(character.stress.max(), 6);
        assert!(service.get("user-1", draft.id).await.is_err());
    }

    #[tokio::test]
    async fn unknown_subclass_is_not_found() {
        let (fixture, catalog) = catalog();
        let service = BuilderService::new(Arc::new(catalog), Arc::new(MockCharacterRepositoryPort::new()));
        let draft = service.start("user-1").await;

        let err = service
            .apply_step(
                "user-1",
                draft.id,
                StepInput::Class {
                    class_id: fixture.class.id,
                    subclass_id: SubclassId::new(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ServiceError>(),
            Some(ServiceError::NotFound { entity_type: "Subclass", .. })
        ));
    }

    #[tokio::test]
    async fn steps_out_of_order_are_rejected() {
        let (_, catalog) = catalog();
        let service = BuilderService::new(Arc::new(catalog), Arc::new(MockCharacterRepositoryPort::new()));
        let draft = service.start("user-1").await;

        let err = service
            .apply_step("user-1", draft.id, StepInput::Experiences(vec![]))
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BuilderError>(),
            Some(BuilderError::OutOfOrder { .. })
        ));
    }

    #[tokio::test]
    async fn drafts_are_private_to_their_owner() {
        let (_, catalog) = catalog();
        let service = BuilderService::new(Arc::new(catalog), Arc::new(MockCharacterRepositoryPort::new()));
        let draft = service.start("user-1").await;

        let err = service.discard("user-2", draft.id).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ServiceError>(),
            Some(ServiceError::Forbidden(_))
        ));
        service.discard("user-1", draft.id).await.unwrap();
        assert!(service.get("user-1", draft.id).await.is_err());
    }

    #[tokio::test]
    async fn failed_create_keeps_the_draft() {
        let (fixture, catalog) = catalog();
        let mut characters = MockCharacterRepositoryPort::new();
        characters
            .expect_create()
            .returning(|_| Err(RepoError::Database("locked".to_string())));

        let service = BuilderService::new(Arc::new(catalog), Arc::new(characters));
        let draft = service.start("user-1").await;
        complete_steps(&service, &fixture, draft.id).await;

        assert!(service.finalize("user-1", draft.id).await.is_err());
        assert!(service.get("user-1", draft.id).await.unwrap().is_ready());
    }

    /// Character store whose create suspends once, so concurrent callers interleave
    #[derive(Default)]
    struct YieldingCharacters {
        created: AtomicU32,
    }

    #[async_trait::async_trait]
    impl CharacterRepositoryPort for YieldingCharacters {
        async fn create(&self, _character: &Character) -> Result<(), RepoError> {
            tokio::task::yield_now().await;
            self.created.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
        async fn get(&self, _id: CharacterId) -> Result<Option<Character>, RepoError> {
            Ok(None)
        }
        async fn list_by_owner(&self, _owner_id: &str) -> Result<Vec<Character>, RepoError> {
            Ok(vec![])
        }
        async fn list_by_campaign(&self, _campaign_id: CampaignId) -> Result<Vec<Character>, RepoError> {
            Ok(vec![])
        }
        async fn save(&self, _character: &Character) -> Result<(), RepoError> {
            Ok(())
        }
        async fn set_campaign(
            &self,
            _id: CharacterId,
            _campaign_id: Option<CampaignId>,
        ) -> Result<(), RepoError> {
            Ok(())
        }
        async fn delete(&self, _id: CharacterId) -> Result<(), RepoError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn concurrent_finalize_creates_one_character() {
        let (fixture, catalog) = catalog();
        let characters = Arc::new(YieldingCharacters::default());
        let service = BuilderService::new(Arc::new(catalog), characters.clone());
        let draft = service.start("user-1").await;
        complete_steps(&service, &fixture, draft.id).await;

        let (first, second) = tokio::join!(
            service.finalize("user-1", draft.id),
            service.finalize("user-1", draft.id)
        );
        assert!(first.is_ok() != second.is_ok());
        assert_eq!(characters.created.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn incomplete_draft_survives_finalize() {
        let (_, catalog) = catalog();
        let service = BuilderService::new(Arc::new(catalog), Arc::new(MockCharacterRepositoryPort::new()));
        let draft = service.start("user-1").await;

        let err = service.finalize("user-1", draft.id).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BuilderError>(),
            Some(BuilderError::Incomplete(_))
        ));
        assert!(service.get("user-1", draft.id).await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn idle_drafts_expire() {
        let (fixture, catalog) = catalog();
        let service = BuilderService::new(Arc::new(catalog), Arc::new(MockCharacterRepositoryPort::new()));
        let stale = service.start("user-1").await;
        let active = service.start("user-1").await;

        tokio::time::advance(Duration::from_secs(50 * 60)).await;
        service
            .apply_step(
                "user-1",
                active.id,
                StepInput::Class {
                    class_id: fixture.class.id,
                    subclass_id: fixture.subclass.id,
                },
            )
            .await
            .unwrap();
        tokio::time::advance(Duration::from_secs(20 * 60)).await;

        assert_eq!(service.expire_idle(Duration::from_secs(60 * 60)).await, 1);
        assert!(service.get("user-1", stale.id).await.is_err());
        assert!(service.get("user-1", active.id).await.is_ok());
    }

    #[test]
    fn step_input_parses_by_step() {
        let body = serde_json::json!({
            "experiences": [
                { "name": "Sailor", "bonus": 2 },
                { "name": "Gambler", "bonus": 2 }
            ]
        });
        let input = StepInput::from_json(BuilderStep::Experiences, body).unwrap();
        assert_eq!(input.step(), BuilderStep::Experiences);

        assert!(StepInput::from_json(BuilderStep::Class, serde_json::json!({})).is_err());
    }
}
