//! Resource tracking and dice routes
//!
//! These act on the character's open tracker, which is created on first use
//! and closed with `DELETE /api/characters/{id}/session`.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use super::error::{error_response, parse_id, ApiError};
use super::owner::Owner;
use crate::application::dto::{
    RollRequestDto, RollResponseDto, SetMaxRequestDto, ToggleSlotRequestDto,
};
use crate::domain::value_objects::{CharacterId, ResourceCounter, ResourceKind, Trait};
use crate::infrastructure::state::AppState;

fn parse_kind(raw: &str) -> Result<ResourceKind, ApiError> {
    raw.parse().map_err(|e| (StatusCode::NOT_FOUND, e))
}

/// Check or uncheck a slot on a resource track
pub async fn toggle_slot(
    State(state): State<Arc<AppState>>,
    Owner(owner): Owner,
    Path((id, resource)): Path<(String, String)>,
    Json(req): Json<ToggleSlotRequestDto>,
) -> Result<Json<ResourceCounter>, ApiError> {
    let id: CharacterId = parse_id(&id, "character")?;
    let kind = parse_kind(&resource)?;

    let counter = state
        .resource_service
        .toggle_slot(&owner, id, kind, req.index, req.checked)
        .await
        .map_err(error_response)?;

    Ok(Json(counter))
}

/// Change a resource maximum. Only hope accepts this; it is saved immediately
pub async fn set_max(
    State(state): State<Arc<AppState>>,
    Owner(owner): Owner,
    Path((id, resource)): Path<(String, String)>,
    Json(req): Json<SetMaxRequestDto>,
) -> Result<Json<ResourceCounter>, ApiError> {
    let id: CharacterId = parse_id(&id, "character")?;
    let kind = parse_kind(&resource)?;

    let counter = state
        .resource_service
        .set_max(&owner, id, kind, req.max)
        .await
        .map_err(error_response)?;

    Ok(Json(counter))
}

/// Write any pending resource changes now
pub async fn flush_resources(
    State(state): State<Arc<AppState>>,
    Owner(owner): Owner,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id: CharacterId = parse_id(&id, "character")?;

    state
        .resource_service
        .flush(&owner, id)
        .await
        .map_err(error_response)?;

    Ok(StatusCode::NO_CONTENT)
}

/// Flush and close the character's tracker
pub async fn close_session(
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

    Ok(StatusCode::NO_CONTENT)
}

/// Roll the duality dice and apply the outcome to hope and stress
pub async fn roll(
    State(state): State<Arc<AppState>>,
    Owner(owner): Owner,
    Path(id): Path<String>,
    Json(req): Json<RollRequestDto>,
) -> Result<Json<RollResponseDto>, ApiError> {
    let id: CharacterId = parse_id(&id, "character")?;
    let with_trait = req
        .trait_name
        .as_deref()
        .map(str::parse::<Trait>)
        .transpose()
        .map_err(|e| (StatusCode::BAD_REQUEST, e))?;

    let result = state
        .resource_service
        .roll(&owner, id, with_trait, req.modifier)
        .await
        .map_err(error_response)?;

    Ok(Json(RollResponseDto::from(result)))
}
