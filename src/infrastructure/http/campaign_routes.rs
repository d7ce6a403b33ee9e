//! Campaign API routes

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use super::error::{error_response, parse_id, ApiError};
use super::owner::Owner;
use crate::application::dto::{
    CampaignDetailsResponseDto, CampaignResponseDto, CreateCampaignRequestDto,
    JoinCampaignRequestDto, LeaveCampaignRequestDto,
};
use crate::application::services::CreateCampaignRequest;
use crate::domain::value_objects::{CampaignId, CharacterId};
use crate::infrastructure::state::AppState;

/// List campaigns the caller runs
pub async fn list_campaigns(
    State(state): State<Arc<AppState>>,
    Owner(owner): Owner,
) -> Result<Json<Vec<CampaignResponseDto>>, ApiError> {
    let campaigns = state
        .campaign_service
        .list_campaigns(&owner)
        .await
        .map_err(error_response)?;

    Ok(Json(campaigns.into_iter().map(CampaignResponseDto::from).collect()))
}

pub async fn create_campaign(
    State(state): State<Arc<AppState>>,
    Owner(owner): Owner,
    Json(req): Json<CreateCampaignRequestDto>,
) -> Result<(StatusCode, Json<CampaignResponseDto>), ApiError> {
    let request = CreateCampaignRequest {
        name: req.name,
        description: req.description,
        frame: req.frame,
    };

    let campaign = state
        .campaign_service
        .create_campaign(&owner, request)
        .await
        .map_err(error_response)?;

    Ok((StatusCode::CREATED, Json(CampaignResponseDto::from(campaign))))
}

/// Get a campaign with its member characters
pub async fn get_campaign(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<CampaignDetailsResponseDto>, ApiError> {
    let id: CampaignId = parse_id(&id, "campaign")?;

    let details = state
        .campaign_service
        .get_campaign(id)
        .await
        .map_err(error_response)?;

    Ok(Json(CampaignDetailsResponseDto::from(details)))
}

pub async fn delete_campaign(
    State(state): State<Arc<AppState>>,
    Owner(owner): Owner,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id: CampaignId = parse_id(&id, "campaign")?;

    state
        .campaign_service
        .delete_campaign(&owner, id)
        .await
        .map_err(error_response)?;

    Ok(StatusCode::NO_CONTENT)
}

/// Join a campaign by invite code with one of the caller's characters
pub async fn join_campaign(
    State(state): State<Arc<AppState>>,
    Owner(owner): Owner,
    Json(req): Json<JoinCampaignRequestDto>,
) -> Result<Json<CampaignResponseDto>, ApiError> {
    let character_id: CharacterId = parse_id(&req.character_id, "character")?;

    let campaign = state
        .campaign_service
        .join_campaign(&owner, &req.invite_code, character_id)
        .await
        .map_err(error_response)?;

    Ok(Json(CampaignResponseDto::from(campaign)))
}

pub async fn leave_campaign(
    State(state): State<Arc<AppState>>,
    Owner(owner): Owner,
    Path(id): Path<String>,
    Json(req): Json<LeaveCampaignRequestDto>,
) -> Result<Json<CampaignResponseDto>, ApiError> {
    let id: CampaignId = parse_id(&id, "campaign")?;
    let character_id: CharacterId = parse_id(&req.character_id, "character")?;

    let campaign = state
        .campaign_service
        .leave_campaign(&owner, id, character_id)
        .await
        .map_err(error_response)?;

    Ok(Json(CampaignResponseDto::from(campaign)))
}
