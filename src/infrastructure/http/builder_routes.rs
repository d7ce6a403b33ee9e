//! Character builder routes

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use super::error::{error_response, parse_id, ApiError};
use super::owner::Owner;
use crate::application::dto::{CharacterResponseDto, DraftResponseDto};
use crate::application::services::StepInput;
use crate::domain::services::BuilderStep;
use crate::domain::value_objects::DraftId;
use crate::infrastructure::state::AppState;

/// Start a new draft
pub async fn start_draft(
    State(state): State<Arc<AppState>>,
    Owner(owner): Owner,
) -> (StatusCode, Json<DraftResponseDto>) {
    let draft = state.builder_service.start(&owner).await;
    (StatusCode::CREATED, Json(DraftResponseDto::from(draft)))
}

pub async fn get_draft(
    State(state): State<Arc<AppState>>,
    Owner(owner): Owner,
    Path(id): Path<String>,
) -> Result<Json<DraftResponseDto>, ApiError> {
    let id: DraftId = parse_id(&id, "draft")?;

    let draft = state
        .builder_service
        .get(&owner, id)
        .await
        .map_err(error_response)?;

    Ok(Json(DraftResponseDto::from(draft)))
}

/// Record one builder step; the body shape depends on the step
pub async fn apply_step(
    State(state): State<Arc<AppState>>,
    Owner(owner): Owner,
    Path((id, step)): Path<(String, String)>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<DraftResponseDto>, ApiError> {
    let id: DraftId = parse_id(&id, "draft")?;
    let step: BuilderStep = step.parse().map_err(|e| (StatusCode::NOT_FOUND, e))?;
    let input = StepInput::from_json(step, body).map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            format!("Invalid {} step: {}", step, e),
        )
    })?;

    let draft = state
        .builder_service
        .apply_step(&owner, id, input)
        .await
        .map_err(error_response)?;

    Ok(Json(DraftResponseDto::from(draft)))
}

pub async fn discard_draft(
    State(state): State<Arc<AppState>>,
    Owner(owner): Owner,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id: DraftId = parse_id(&id, "draft")?;

    state
        .builder_service
        .discard(&owner, id)
        .await
        .map_err(error_response)?;

    Ok(StatusCode::NO_CONTENT)
}

/// Create the character described by a completed draft
pub async fn finalize_draft(
    State(state): State<Arc<AppState>>,
    Owner(owner): Owner,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<CharacterResponseDto>), ApiError> {
    let id: DraftId = parse_id(&id, "draft")?;

    let character = state
        .builder_service
        .finalize(&owner, id)
        .await
        .map_err(error_response)?;

    Ok((
        StatusCode::CREATED,
        Json(CharacterResponseDto::from(character)),
    ))
}
