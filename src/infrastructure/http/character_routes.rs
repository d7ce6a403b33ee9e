//! Character API routes

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use super::error::{error_response, parse_id, ApiError};
use super::owner::Owner;
use crate::application::dto::{
    AddItemRequestDto, CharacterResponseDto, CharacterSheetResponseDto, CreateCharacterRequestDto,
    SetEquippedRequestDto,
};
use crate::application::services::{CharacterService, CreateCharacterRequest};
use crate::domain::entities::{CharacterPatch, InventoryEntry};
use crate::domain::services::DerivedStats;
use crate::domain::value_objects::{CharacterId, ItemId};
use crate::infrastructure::state::AppState;

/// List the caller's characters
pub async fn list_characters(
    State(state): State<Arc<AppState>>,
    Owner(owner): Owner,
) -> Result<Json<Vec<CharacterResponseDto>>, ApiError> {
    let characters = state
        .character_service
        .list_characters(&owner)
        .await
        .map_err(error_response)?;

    Ok(Json(characters.into_iter().map(CharacterResponseDto::from).collect()))
}

/// Create a character
pub async fn create_character(
    State(state): State<Arc<AppState>>,
    Owner(owner): Owner,
    Json(req): Json<CreateCharacterRequestDto>,
) -> Result<(StatusCode, Json<CharacterResponseDto>), ApiError> {
    let request = CreateCharacterRequest {
        name: req.name,
        pronouns: req.pronouns,
        background: req.background,
    };

    let character = state
        .character_service
        .create_character(&owner, request)
        .await
        .map_err(error_response)?;

    Ok((
        StatusCode::CREATED,
        Json(CharacterResponseDto::from(character)),
    ))
}

/// Get a character by ID
pub async fn get_character(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<CharacterResponseDto>, ApiError> {
    let id: CharacterId = parse_id(&id, "character")?;

    let character = state
        .character_service
        .get_character(id)
        .await
        .map_err(error_response)?;

    Ok(Json(CharacterResponseDto::from(character)))
}

/// Apply a partial update
pub async fn update_character(
    State(state): State<Arc<AppState>>,
    Owner(owner): Owner,
    Path(id): Path<String>,
    Json(patch): Json<CharacterPatch>,
) -> Result<Json<CharacterResponseDto>, ApiError> {
    let id: CharacterId = parse_id(&id, "character")?;

    // Pending tracker writes would otherwise land after this update
    state
        .resource_service
        .close(&owner, id)
        .await
        .map_err(error_response)?;

    let character = state
        .character_service
        .update_character(&owner, id, patch)
        .await
        .map_err(error_response)?;

    Ok(Json(CharacterResponseDto::from(character)))
}

/// Delete a character
pub async fn delete_character(
    State(state): State<Arc<AppState>>,
    Owner(owner): Owner,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id: CharacterId = parse_id(&id, "character")?;

    state
        .resource_service
        .close(&owner, id)
        .await
        .map_err(error_response)?;
    state
        .character_service
        .delete_character(&owner, id)
        .await
        .map_err(error_response)?;

    Ok(StatusCode::NO_CONTENT)
}

/// Get the assembled character sheet with derived stats
pub async fn get_sheet(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<CharacterSheetResponseDto>, ApiError> {
    let id: CharacterId = parse_id(&id, "character")?;

    let sheet = state
        .sheet_service
        .load_sheet(id)
        .await
        .map_err(error_response)?;

    Ok(Json(CharacterSheetResponseDto::from(sheet)))
}

/// Get derived evasion, armor and damage thresholds
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DerivedStats>, ApiError> {
    let id: CharacterId = parse_id(&id, "character")?;

    let stats = state
        .sheet_service
        .load_stats(id)
        .await
        .map_err(error_response)?;

    Ok(Json(stats))
}

/// Add a catalog item to a character's equipment
pub async fn add_item(
    State(state): State<Arc<AppState>>,
    Owner(owner): Owner,
    Path(id): Path<String>,
    Json(req): Json<AddItemRequestDto>,
) -> Result<Json<CharacterResponseDto>, ApiError> {
    let id: CharacterId = parse_id(&id, "character")?;
    let item_id: ItemId = parse_id(&req.item_id, "item")?;

    let character = state
        .character_service
        .add_item(&owner, id, item_id, req.quantity)
        .await
        .map_err(error_response)?;

    Ok(Json(CharacterResponseDto::from(character)))
}

/// Equip or unequip a held item
pub async fn set_equipped(
    State(state): State<Arc<AppState>>,
    Owner(owner): Owner,
    Path((id, item_id)): Path<(String, String)>,
    Json(req): Json<SetEquippedRequestDto>,
) -> Result<Json<CharacterResponseDto>, ApiError> {
    let id: CharacterId = parse_id(&id, "character")?;
    let item_id: ItemId = parse_id(&item_id, "item")?;

    let character = state
        .character_service
        .set_equipped(&owner, id, item_id, req.equipped)
        .await
        .map_err(error_response)?;

    Ok(Json(CharacterResponseDto::from(character)))
}

/// Remove an item from a character's equipment
pub async fn remove_item(
    State(state): State<Arc<AppState>>,
    Owner(owner): Owner,
    Path((id, item_id)): Path<(String, String)>,
) -> Result<Json<CharacterResponseDto>, ApiError> {
    let id: CharacterId = parse_id(&id, "character")?;
    let item_id: ItemId = parse_id(&item_id, "item")?;

    let character = state
        .character_service
        .remove_item(&owner, id, item_id)
        .await
        .map_err(error_response)?;

    Ok(Json(CharacterResponseDto::from(character)))
}

/// Append a freeform inventory line
pub async fn add_inventory_entry(
    State(state): State<Arc<AppState>>,
    Owner(owner): Owner,
    Path(id): Path<String>,
    Json(entry): Json<InventoryEntry>,
) -> Result<Json<CharacterResponseDto>, ApiError> {
    let id: CharacterId = parse_id(&id, "character")?;

    let character = state
        .character_service
        .add_inventory_entry(&owner, id, entry)
        .await
        .map_err(error_response)?;

    Ok(Json(CharacterResponseDto::from(character)))
}

pub async fn remove_inventory_entry(
    State(state): State<Arc<AppState>>,
    Owner(owner): Owner,
    Path((id, index)): Path<(String, usize)>,
) -> Result<Json<CharacterResponseDto>, ApiError> {
    let id: CharacterId = parse_id(&id, "character")?;

    let character = state
        .character_service
        .remove_inventory_entry(&owner, id, index)
        .await
        .map_err(error_response)?;

    Ok(Json(CharacterResponseDto::from(character)))
}

pub async fn level_up(
    State(state): State<Arc<AppState>>,
    Owner(owner): Owner,
    Path(id): Path<String>,
) -> Result<Json<CharacterResponseDto>, ApiError> {
    let id: CharacterId = parse_id(&id, "character")?;

    let character = state
        .character_service
        .level_up(&owner, id)
        .await
        .map_err(error_response)?;

    Ok(Json(CharacterResponseDto::from(character)))
}
