//! Features - named rules text attached to items, classes and heritage

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::ModifierMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Stat deltas this feature applies while active
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modifiers: Option<ModifierMap>,
}

impl Feature {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            modifiers: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_modifier(mut self, stat: impl Into<String>, delta: i32) -> Self {
        let modifiers = self.modifiers.take().unwrap_or_default();
        self.modifiers = Some(modifiers.with(stat, delta));
        self
    }

    /// Total delta this feature applies to `stat` (0 if it has no modifiers)
    pub fn modifier_total(&self, stat: &str) -> i32 {
        self.modifiers.as_ref().map_or(0, |m| m.total(stat))
    }
}
