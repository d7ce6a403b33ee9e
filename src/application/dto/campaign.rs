use serde::{Deserialize, Serialize};

use crate::application::services::CampaignDetails;
use crate::domain::entities::{Campaign, Character};

#[derive(Debug, Deserialize)]
pub struct CreateCampaignRequestDto {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub frame: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct JoinCampaignRequestDto {
    pub invite_code: String,
    pub character_id: String,
}

#[derive(Debug, Deserialize)]
pub struct LeaveCampaignRequestDto {
    pub character_id: String,
}

#[derive(Debug, Serialize)]
pub struct CampaignResponseDto {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub description: String,
    pub frame: Option<String>,
    pub invite_code: String,
    pub members: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Campaign> for CampaignResponseDto {
    fn from(c: Campaign) -> Self {
        Self {
            id: c.id.to_string(),
            owner_id: c.owner_id,
            name: c.name,
            description: c.description,
            frame: c.frame,
            invite_code: c.invite_code,
            members: c.members.iter().map(|id| id.to_string()).collect(),
            created_at: c.created_at.to_rfc3339(),
            updated_at: c.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CampaignMemberDto {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub level: u8,
}

impl From<Character> for CampaignMemberDto {
    fn from(c: Character) -> Self {
        Self {
            id: c.id.to_string(),
            owner_id: c.owner_id,
            name: c.name,
            level: c.level,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CampaignDetailsResponseDto {
    #[serde(flatten)]
    pub campaign: CampaignResponseDto,
    pub member_characters: Vec<CampaignMemberDto>,
}

impl From<CampaignDetails> for CampaignDetailsResponseDto {
    fn from(d: CampaignDetails) -> Self {
        Self {
            campaign: d.campaign.into(),
            member_characters: d.members.into_iter().map(Into::into).collect(),
        }
    }
}
