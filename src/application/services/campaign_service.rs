//! Campaign Service - campaigns, invite codes and membership

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info, instrument, warn};

use super::errors::ServiceError;
use crate::application::ports::outbound::{CampaignRepositoryPort, CharacterRepositoryPort};
use crate::domain::entities::{
    generate_invite_code, normalize_invite_code, Campaign, CampaignError, Character,
};
use crate::domain::value_objects::{CampaignId, CharacterId};

/// Attempts at drawing an unused invite code before giving up
const INVITE_CODE_ATTEMPTS: usize = 5;

#[derive(Debug, Clone)]
pub struct CreateCampaignRequest {
    pub name: String,
    pub description: Option<String>,
    pub frame: Option<String>,
}

/// A campaign with its member characters loaded
#[derive(Debug, Clone)]
pub struct CampaignDetails {
    pub campaign: Campaign,
    pub members: Vec<Character>,
}

pub struct CampaignService {
    campaigns: Arc<dyn CampaignRepositoryPort>,
    characters: Arc<dyn CharacterRepositoryPort>,
}

impl CampaignService {
    pub fn new(
        campaigns: Arc<dyn CampaignRepositoryPort>,
        characters: Arc<dyn CharacterRepositoryPort>,
    ) -> Self {
        Self {
            campaigns,
            characters,
        }
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create_campaign(
        &self,
        owner_id: &str,
        request: CreateCampaignRequest,
    ) -> Result<Campaign> {
        let description = request.description.unwrap_or_default();
        Campaign::validate(&request.name, &description)?;

        let mut campaign = Campaign::new(owner_id, request.name.trim()).with_description(description);
        if let Some(frame) = request.frame.filter(|f| !f.trim().is_empty()) {
            campaign = campaign.with_frame(frame);
        }
        campaign.invite_code = self.unused_invite_code().await?;

        self.campaigns
            .create(&campaign)
            .await
            .context("Failed to create campaign in repository")?;

        info!(campaign_id = %campaign.id, "Created campaign: {}", campaign.name);
        Ok(campaign)
    }

    #[instrument(skip(self))]
    pub async fn get_campaign(&self, id: CampaignId) -> Result<CampaignDetails> {
        let campaign = self.load(id).await?;
        let members = self
            .characters
            .list_by_campaign(id)
            .await
            .context("Failed to list campaign members")?;
        Ok(CampaignDetails { campaign, members })
    }

    pub async fn list_campaigns(&self, owner_id: &str) -> Result<Vec<Campaign>> {
        self.campaigns
            .list_by_owner(owner_id)
            .await
            .context("Failed to list campaigns")
    }

    /// Join the campaign behind `invite_code` with one of the caller's characters
    #[instrument(skip(self, invite_code), fields(character_id = %character_id))]
    pub async fn join_campaign(
        &self,
        owner_id: &str,
        invite_code: &str,
        character_id: CharacterId,
    ) -> Result<Campaign> {
        let code = normalize_invite_code(invite_code);
        let character = self.owned_character(owner_id, character_id).await?;

        let mut campaign = self
            .campaigns
            .get_by_invite_code(&code)
            .await
            .context("Failed to look up invite code")?
            .ok_or_else(|| CampaignError::UnknownInviteCode(code.clone()))?;

        match character.campaign_id {
            Some(current) if current == campaign.id => {
                debug!("Character already in campaign");
                return Ok(campaign);
            }
            Some(_) => return Err(CampaignError::AlreadyInCampaign(character_id).into()),
            None => {}
        }

        campaign.add_member(character_id);
        self.campaigns
            .update(&campaign)
            .await
            .context("Failed to add campaign member")?;
        self.characters
            .set_campaign(character_id, Some(campaign.id))
            .await
            .context("Failed to attach character to campaign")?;

        info!(campaign_id = %campaign.id, "Character joined campaign");
        Ok(campaign)
    }

    #[instrument(skip(self), fields(campaign_id = %id, character_id = %character_id))]
    pub async fn leave_campaign(
        &self,
        owner_id: &str,
        id: CampaignId,
        character_id: CharacterId,
    ) -> Result<Campaign> {
        let character = self.owned_character(owner_id, character_id).await?;
        let mut campaign = self.load(id).await?;

        if !campaign.remove_member(&character_id) && character.campaign_id != Some(id) {
            return Err(CampaignError::NotMember(character_id).into());
        }

        self.campaigns
            .update(&campaign)
            .await
            .context("Failed to remove campaign member")?;
        self.characters
            .set_campaign(character_id, None)
            .await
            .context("Failed to detach character from campaign")?;

        info!("Character left campaign");
        Ok(campaign)
    }

    /// Delete a campaign the caller owns; member characters are detached
    #[instrument(skip(self), fields(campaign_id = %id))]
    pub async fn delete_campaign(&self, owner_id: &str, id: CampaignId) -> Result<()> {
        let campaign = self.load(id).await?;
        if campaign.owner_id != owner_id {
            return Err(ServiceError::not_owner("Campaign").into());
        }

        for member in &campaign.members {
            if let Err(e) = self.characters.set_campaign(*member, None).await {
                if !e.is_not_found() {
                    return Err(e).context("Failed to detach campaign member");
                }
                warn!(character_id = %member, "Campaign member no longer exists");
            }
        }

        self.campaigns
            .delete(id)
            .await
            .context("Failed to delete campaign from repository")?;

        info!(campaign_id = %id, "Deleted campaign: {}", campaign.name);
        Ok(())
    }

    async fn load(&self, id: CampaignId) -> Result<Campaign> {
        Ok(self
            .campaigns
            .get(id)
            .await
            .context("Failed to load campaign")?
            .ok_or_else(|| ServiceError::not_found("Campaign", id))?)
    }

    async fn owned_character(&self, owner_id: &str, id: CharacterId) -> Result<Character> {
        let character = self
            .characters
            .get(id)
            .await
            .context("Failed to load character")?
            .ok_or_else(|| ServiceError::character_not_found(id))?;
        if character.owner_id != owner_id {
            return Err(ServiceError::not_owner("Character").into());
        }
        Ok(character)
    }

    async fn unused_invite_code(&self) -> Result<String> {
        for _ in 0..INVITE_CODE_ATTEMPTS {
            let code = generate_invite_code(&mut rand::thread_rng());
            let taken = self
                .campaigns
                .get_by_invite_code(&code)
                .await
                .context("Failed to check invite code")?;
            if taken.is_none() {
                return Ok(code);
            }
        }
        Err(ServiceError::Conflict("Could not allocate a unique invite code".to_string()).into())
    }
}
