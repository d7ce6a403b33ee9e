//! Ancestry and community catalog entities

use serde::{Deserialize, Serialize};

use super::Feature;
use crate::domain::value_objects::{AncestryId, CommunityId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ancestry {
    pub id: AncestryId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub features: Vec<Feature>,
}

impl Ancestry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: AncestryId::new(),
            name: name.into(),
            description: String::new(),
            features: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Community {
    pub id: CommunityId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub features: Vec<Feature>,
}

impl Community {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: CommunityId::new(),
            name: name.into(),
            description: String::new(),
            features: Vec::new(),
        }
    }
}
