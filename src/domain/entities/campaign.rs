//! Campaign entity - a table of characters run by one game master

use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{CampaignId, CharacterId};

pub const INVITE_CODE_LENGTH: usize = 8;
pub const MAX_CAMPAIGN_NAME_LENGTH: usize = 255;
pub const MAX_CAMPAIGN_DESCRIPTION_LENGTH: usize = 10000;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CampaignError {
    #[error("Campaign name must be between 1 and {} characters", MAX_CAMPAIGN_NAME_LENGTH)]
    InvalidName,
    #[error("Campaign description cannot exceed {} characters", MAX_CAMPAIGN_DESCRIPTION_LENGTH)]
    DescriptionTooLong,
    #[error("No campaign uses invite code {0}")]
    UnknownInviteCode(String),
    #[error("Character {0} already belongs to another campaign")]
    AlreadyInCampaign(CharacterId),
    #[error("Character {0} is not a member of this campaign")]
    NotMember(CharacterId),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: CampaignId,
    /// The game master's user id
    pub owner_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Campaign frame / setting the table plays in
    #[serde(default)]
    pub frame: Option<String>,
    pub invite_code: String,
    #[serde(default)]
    pub members: Vec<CharacterId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Campaign {
    pub fn new(owner_id: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: CampaignId::new(),
            owner_id: owner_id.into(),
            name: name.into(),
            description: String::new(),
            frame: None,
            invite_code: generate_invite_code(&mut rand::thread_rng()),
            members: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.frame = Some(frame.into());
        self
    }

    pub fn validate(name: &str, description: &str) -> Result<(), CampaignError> {
        if name.trim().is_empty() || name.len() > MAX_CAMPAIGN_NAME_LENGTH {
            return Err(CampaignError::InvalidName);
        }
        if description.len() > MAX_CAMPAIGN_DESCRIPTION_LENGTH {
            return Err(CampaignError::DescriptionTooLong);
        }
        Ok(())
    }

    pub fn is_member(&self, character_id: &CharacterId) -> bool {
        self.members.contains(character_id)
    }

    /// Returns false if the character was already a member
    pub fn add_member(&mut self, character_id: CharacterId) -> bool {
        if self.is_member(&character_id) {
            return false;
        }
        self.members.push(character_id);
        self.updated_at = Utc::now();
        true
    }

    pub fn remove_member(&mut self, character_id: &CharacterId) -> bool {
        if let Some(pos) = self.members.iter().position(|id| id == character_id) {
            self.members.remove(pos);
            self.updated_at = Utc::now();
            true
        } else {
            false
        }
    }
}

/// Invite codes are matched ignoring case and surrounding whitespace
pub fn normalize_invite_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

/// Uppercase alphanumeric invite code
pub fn generate_invite_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    rng.sample_iter(&Alphanumeric)
        .take(INVITE_CODE_LENGTH)
        .map(|b| char::from(b).to_ascii_uppercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invite_code_shape() {
        let campaign = Campaign::new("gm-1", "The Witherwild");
        assert_eq!(campaign.invite_code.len(), INVITE_CODE_LENGTH);
        assert!(campaign
            .invite_code
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[test]
    fn test_membership_is_unique() {
        let mut campaign = Campaign::new("gm-1", "The Witherwild");
        let pc = CharacterId::new();
        assert!(campaign.add_member(pc));
        assert!(!campaign.add_member(pc));
        assert!(campaign.remove_member(&pc));
        assert!(!campaign.remove_member(&pc));
    }

    #[test]
    fn test_validation_limits() {
        assert_eq!(Campaign::validate("", ""), Err(CampaignError::InvalidName));
        assert_eq!(
            Campaign::validate(&"x".repeat(256), ""),
            Err(CampaignError::InvalidName)
        );
        assert_eq!(
            Campaign::validate("Age of Umbra", &"x".repeat(10001)),
            Err(CampaignError::DescriptionTooLong)
        );
        assert!(Campaign::validate("Age of Umbra", "").is_ok());
        assert_eq!(normalize_invite_code(" ab12cd34 "), "AB12CD34");
    }
}
