use serde::Serialize;

use crate::domain::services::{BuilderStep, CharacterDraft};

#[derive(Debug, Serialize)]
pub struct DraftResponseDto {
    #[serde(flatten)]
    pub draft: CharacterDraft,
    pub next_step: Option<BuilderStep>,
    pub ready: bool,
}

impl From<CharacterDraft> for DraftResponseDto {
    fn from(draft: CharacterDraft) -> Self {
        Self {
            next_step: draft.next_step(),
            ready: draft.is_ready(),
            draft,
        }
    }
}
