use serde::Serialize;

use super::CharacterResponseDto;
use crate::application::services::CharacterSheet;
use crate::domain::entities::Feature;
use crate::domain::services::{DerivedStats, ResolvedItem};

#[derive(Debug, Serialize)]
pub struct SheetItemDto {
    pub item_id: String,
    pub name: String,
    pub item_type: String,
    pub tier: u8,
    pub quantity: u32,
    pub equipped: bool,
    pub features: Vec<Feature>,
}

impl From<ResolvedItem> for SheetItemDto {
    fn from(r: ResolvedItem) -> Self {
        Self {
            item_id: r.item.id.to_string(),
            item_type: r.item.type_label().to_string(),
            features: r.item.features().to_vec(),
            name: r.item.name,
            tier: r.item.tier,
            quantity: r.quantity,
            equipped: r.equipped,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CharacterSheetResponseDto {
    pub character: CharacterResponseDto,
    pub class_name: String,
    pub subclass_name: String,
    pub ancestry_name: String,
    pub community_name: String,
    pub domains: Vec<String>,
    /// Subclass features currently active for the character
    pub subclass_features: Vec<Feature>,
    pub items: Vec<SheetItemDto>,
    pub stats: DerivedStats,
}

impl From<CharacterSheet> for CharacterSheetResponseDto {
    fn from(sheet: CharacterSheet) -> Self {
        let details = sheet.details;
        let subclass_features = details
            .subclass
            .as_ref()
            .map(|s| {
                s.active_features(&details.character.additional_data)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        Self {
            class_name: details.class_name().to_string(),
            subclass_name: details.subclass_name().to_string(),
            ancestry_name: details.ancestry_name().to_string(),
            community_name: details.community_name().to_string(),
            domains: details
                .class
                .as_ref()
                .map(|c| c.domains.clone())
                .unwrap_or_default(),
            subclass_features,
            character: CharacterResponseDto::from(details.character),
            items: sheet.items.into_iter().map(SheetItemDto::from).collect(),
            stats: sheet.stats,
        }
    }
}
