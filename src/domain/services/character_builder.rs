//! Character builder - provisional multi-step character creation
//!
//! A draft collects each builder step in order. Nothing is persisted until
//! [`CharacterDraft::finalize`] turns the completed draft into a character.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::{
    Ancestry, Character, CharacterClass, CharacterError, Community, Subclass,
    MAX_BACKGROUND_LENGTH,
};
use crate::domain::value_objects::{
    AncestryId, ClassId, CommunityId, DraftId, Experience, ResourceCounter, SubclassId,
    TraitScores,
};

pub const STARTING_EXPERIENCE_COUNT: usize = 2;
pub const STARTING_EXPERIENCE_BONUS: i8 = 2;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BuilderError {
    #[error("Step {step} requires {missing} to be completed first")]
    OutOfOrder {
        step: BuilderStep,
        missing: BuilderStep,
    },
    #[error("Subclass {subclass} does not belong to class {class}")]
    SubclassMismatch { class: String, subclass: String },
    #[error("Traits must be assigned +2, +1, +1, +0, +0, -1")]
    InvalidTraits,
    #[error("Exactly {count} experiences are required, got {0}", count = STARTING_EXPERIENCE_COUNT)]
    ExperienceCount(usize),
    #[error("Experience '{0}' must have a name and a +{bonus} bonus", bonus = STARTING_EXPERIENCE_BONUS)]
    InvalidExperience(String),
    #[error("Draft is incomplete: {0} has not been completed")]
    Incomplete(BuilderStep),
    #[error(transparent)]
    Character(#[from] CharacterError),
}

/// Builder steps in the order they must be completed
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuilderStep {
    Class,
    Heritage,
    Traits,
    Background,
    Experiences,
}

impl BuilderStep {
    pub const ORDER: [BuilderStep; 5] = [
        BuilderStep::Class,
        BuilderStep::Heritage,
        BuilderStep::Traits,
        BuilderStep::Background,
        BuilderStep::Experiences,
    ];

    fn predecessors(&self) -> impl Iterator<Item = BuilderStep> + '_ {
        BuilderStep::ORDER.into_iter().take_while(move |s| s != self)
    }
}

impl fmt::Display for BuilderStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BuilderStep::Class => "class",
            BuilderStep::Heritage => "heritage",
            BuilderStep::Traits => "traits",
            BuilderStep::Background => "background",
            BuilderStep::Experiences => "experiences",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for BuilderStep {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BuilderStep::ORDER
            .into_iter()
            .find(|step| step.to_string() == s.to_ascii_lowercase())
            .ok_or_else(|| format!("Unknown builder step: {}", s))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackgroundInput {
    pub name: String,
    #[serde(default)]
    pub pronouns: Option<String>,
    #[serde(default)]
    pub background: String,
    #[serde(default)]
    pub answers: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CharacterDraft {
    pub id: DraftId,
    pub owner_id: String,
    pub class_id: Option<ClassId>,
    pub subclass_id: Option<SubclassId>,
    pub base_hit_points: u8,
    pub ancestry_id: Option<AncestryId>,
    pub community_id: Option<CommunityId>,
    pub traits: Option<TraitScores>,
    pub background: Option<BackgroundInput>,
    pub experiences: Vec<Experience>,
    pub completed: BTreeSet<BuilderStep>,
    pub created_at: DateTime<Utc>,
}

impl CharacterDraft {
    pub fn new(owner_id: impl Into<String>) -> Self {
        Self {
            id: DraftId::new(),
            owner_id: owner_id.into(),
            class_id: None,
            subclass_id: None,
            base_hit_points: 0,
            ancestry_id: None,
            community_id: None,
            traits: None,
            background: None,
            experiences: Vec::new(),
            completed: BTreeSet::new(),
            created_at: Utc::now(),
        }
    }

    /// The first step not yet completed, if any
    pub fn next_step(&self) -> Option<BuilderStep> {
        BuilderStep::ORDER
            .into_iter()
            .find(|step| !self.completed.contains(step))
    }

    pub fn is_ready(&self) -> bool {
        self.next_step().is_none()
    }

    fn ensure_reachable(&self, step: BuilderStep) -> Result<(), BuilderError> {
        match step.predecessors().find(|p| !self.completed.contains(p)) {
            Some(missing) => Err(BuilderError::OutOfOrder { step, missing }),
            None => Ok(()),
        }
    }

    pub fn choose_class(
        &mut self,
        class: &CharacterClass,
        subclass: &Subclass,
    ) -> Result<(), BuilderError> {
        if subclass.class_id != class.id {
            return Err(BuilderError::SubclassMismatch {
                class: class.name.clone(),
                subclass: subclass.name.clone(),
            });
        }
        self.class_id = Some(class.id);
        self.subclass_id = Some(subclass.id);
        self.base_hit_points = class.base_hit_points;
        self.completed.insert(BuilderStep::Class);
        Ok(())
    }

    pub fn choose_heritage(
        &mut self,
        ancestry: &Ancestry,
        community: &Community,
    ) -> Result<(), BuilderError> {
        self.ensure_reachable(BuilderStep::Heritage)?;
        self.ancestry_id = Some(ancestry.id);
        self.community_id = Some(community.id);
        self.completed.insert(BuilderStep::Heritage);
        Ok(())
    }

    pub fn assign_traits(&mut self, traits: TraitScores) -> Result<(), BuilderError> {
        self.ensure_reachable(BuilderStep::Traits)?;
        if !traits.is_starting_distribution() {
            return Err(BuilderError::InvalidTraits);
        }
        self.traits = Some(traits);
        self.completed.insert(BuilderStep::Traits);
        Ok(())
    }

    pub fn write_background(&mut self, input: BackgroundInput) -> Result<(), BuilderError> {
        self.ensure_reachable(BuilderStep::Background)?;
        Character::validate_name(&input.name)?;
        if input.background.len() > MAX_BACKGROUND_LENGTH {
            return Err(CharacterError::BackgroundTooLong.into());
        }
        self.background = Some(input);
        self.completed.insert(BuilderStep::Background);
        Ok(())
    }

    pub fn choose_experiences(&mut self, experiences: Vec<Experience>) -> Result<(), BuilderError> {
        self.ensure_reachable(BuilderStep::Experiences)?;
        if experiences.len() != STARTING_EXPERIENCE_COUNT {
            return Err(BuilderError::ExperienceCount(experiences.len()));
        }
        if let Some(bad) = experiences
            .iter()
            .find(|e| e.name.trim().is_empty() || e.bonus != STARTING_EXPERIENCE_BONUS)
        {
            return Err(BuilderError::InvalidExperience(bad.name.clone()));
        }
        self.experiences = experiences;
        self.completed.insert(BuilderStep::Experiences);
        Ok(())
    }

    /// Build the complete character this draft describes
    pub fn finalize(&self) -> Result<Character, BuilderError> {
        if let Some(step) = self.next_step() {
            return Err(BuilderError::Incomplete(step));
        }
        let background = self
            .background
            .clone()
            .ok_or(BuilderError::Incomplete(BuilderStep::Background))?;

        let mut character = Character::new(self.owner_id.clone(), background.name);
        character.pronouns = background.pronouns.filter(|p| !p.trim().is_empty());
        character.background = background.background;
        character.class_id = self.class_id;
        character.subclass_id = self.subclass_id;
        character.ancestry_id = self.ancestry_id;
        character.community_id = self.community_id;
        character.traits = self.traits.unwrap_or_default();
        character.hit_points = ResourceCounter::empty(self.base_hit_points);
        character.additional_data.background_answers = background.answers;
        character.additional_data.experiences = self.experiences.clone();
        character.is_complete = true;
        Ok(character)
    }
}
