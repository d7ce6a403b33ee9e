//! Typed "additional data" section of a character record
//!
//! Holds the loosely related extras a sheet collects over time: unlocked
//! subclass tiers, background and connection answers, and experiences.
//! Updates merge whole named sections so that writing one section never
//! clobbers another.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::SubclassTier;

/// A narrative experience with its roll bonus
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Experience {
    pub name: String,
    pub bonus: i8,
}

impl Experience {
    pub fn new(name: impl Into<String>, bonus: i8) -> Self {
        Self {
            name: name.into(),
            bonus,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdditionalData {
    #[serde(default)]
    pub unlocked_tiers: BTreeSet<SubclassTier>,
    #[serde(default)]
    pub background_answers: BTreeMap<String, String>,
    #[serde(default)]
    pub connection_answers: BTreeMap<String, String>,
    #[serde(default)]
    pub experiences: Vec<Experience>,
}

impl AdditionalData {
    /// Whether a tier's features are active. Foundation always is.
    pub fn is_unlocked(&self, tier: SubclassTier) -> bool {
        !tier.requires_unlock() || self.unlocked_tiers.contains(&tier)
    }

    pub fn unlock(&mut self, tier: SubclassTier) {
        if tier.requires_unlock() {
            self.unlocked_tiers.insert(tier);
        }
    }

    /// Merge a partial update section by section
    pub fn apply(&mut self, patch: AdditionalDataPatch) {
        if let Some(tiers) = patch.unlocked_tiers {
            self.unlocked_tiers = tiers.into_iter().filter(|t| t.requires_unlock()).collect();
        }
        if let Some(answers) = patch.background_answers {
            merge_answers(&mut self.background_answers, answers);
        }
        if let Some(answers) = patch.connection_answers {
            merge_answers(&mut self.connection_answers, answers);
        }
        if let Some(experiences) = patch.experiences {
            self.experiences = experiences;
        }
    }
}

/// An empty answer removes the question's entry.
fn merge_answers(target: &mut BTreeMap<String, String>, answers: BTreeMap<String, String>) {
    for (question, answer) in answers {
        if answer.trim().is_empty() {
            target.remove(&question);
        } else {
            target.insert(question, answer);
        }
    }
}

/// Partial update of [`AdditionalData`]; `None` leaves a section untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdditionalDataPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unlocked_tiers: Option<BTreeSet<SubclassTier>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_answers: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_answers: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experiences: Option<Vec<Experience>>,
}

impl AdditionalDataPatch {
    /// Combine with a later patch. Answer maps union with the later value
    /// winning per key; whole sections are replaced.
    pub fn merge(mut self, newer: AdditionalDataPatch) -> Self {
        if newer.unlocked_tiers.is_some() {
            self.unlocked_tiers = newer.unlocked_tiers;
        }
        self.background_answers = merge_maps(self.background_answers, newer.background_answers);
        self.connection_answers = merge_maps(self.connection_answers, newer.connection_answers);
        if newer.experiences.is_some() {
            self.experiences = newer.experiences;
        }
        self
    }
}

fn merge_maps(
    older: Option<BTreeMap<String, String>>,
    newer: Option<BTreeMap<String, String>>,
) -> Option<BTreeMap<String, String>> {
    match (older, newer) {
        (Some(mut older), Some(newer)) => {
            older.extend(newer);
            Some(older)
        }
        (older, None) => older,
        (None, newer) => newer,
    }
}
