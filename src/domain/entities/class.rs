//! Class and subclass catalog entities

use serde::{Deserialize, Serialize};

use super::Feature;
use crate::domain::value_objects::{AdditionalData, ClassId, SubclassId, SubclassTier};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterClass {
    pub id: ClassId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// The two domains whose cards the class may take
    #[serde(default)]
    pub domains: Vec<String>,
    pub base_hit_points: u8,
    pub base_evasion: i32,
    #[serde(default)]
    pub features: Vec<Feature>,
}

impl CharacterClass {
    pub fn new(name: impl Into<String>, base_hit_points: u8, base_evasion: i32) -> Self {
        Self {
            id: ClassId::new(),
            name: name.into(),
            description: String::new(),
            domains: Vec::new(),
            base_hit_points,
            base_evasion,
            features: Vec::new(),
        }
    }

    pub fn with_domains(mut self, domains: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.domains = domains.into_iter().map(Into::into).collect();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subclass {
    pub id: SubclassId,
    pub class_id: ClassId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub foundation: Vec<Feature>,
    #[serde(default)]
    pub specialization: Vec<Feature>,
    #[serde(default)]
    pub mastery: Vec<Feature>,
}

impl Subclass {
    pub fn new(class_id: ClassId, name: impl Into<String>) -> Self {
        Self {
            id: SubclassId::new(),
            class_id,
            name: name.into(),
            description: String::new(),
            foundation: Vec::new(),
            specialization: Vec::new(),
            mastery: Vec::new(),
        }
    }

    pub fn with_feature(mut self, tier: SubclassTier, feature: Feature) -> Self {
        match tier {
            SubclassTier::Foundation => self.foundation.push(feature),
            SubclassTier::Specialization => self.specialization.push(feature),
            SubclassTier::Mastery => self.mastery.push(feature),
        }
        self
    }

    pub fn features(&self, tier: SubclassTier) -> &[Feature] {
        match tier {
            SubclassTier::Foundation => &self.foundation,
            SubclassTier::Specialization => &self.specialization,
            SubclassTier::Mastery => &self.mastery,
        }
    }

    /// Foundation features plus any tier the character has unlocked
    pub fn active_features<'a>(
        &'a self,
        data: &'a AdditionalData,
    ) -> impl Iterator<Item = &'a Feature> + 'a {
        [
            SubclassTier::Foundation,
            SubclassTier::Specialization,
            SubclassTier::Mastery,
        ]
        .into_iter()
        .filter(move |tier| data.is_unlocked(*tier))
        .flat_map(move |tier| self.features(tier).iter())
    }
}
