//! Catalog API routes (read-only)

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use super::error::{error_response, parse_id, ApiError};
use crate::domain::entities::{Ancestry, CharacterClass, Community, Item, Subclass};
use crate::domain::value_objects::ClassId;
use crate::infrastructure::state::AppState;

pub async fn list_items(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Item>>, ApiError> {
    let items = state
        .catalog
        .list_items()
        .await
        .map_err(|e| error_response(e.into()))?;
    Ok(Json(items))
}

pub async fn list_classes(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<CharacterClass>>, ApiError> {
    let classes = state
        .catalog
        .list_classes()
        .await
        .map_err(|e| error_response(e.into()))?;
    Ok(Json(classes))
}

/// Subclasses available to one class
pub async fn list_subclasses(
    State(state): State<Arc<AppState>>,
    Path(class_id): Path<String>,
) -> Result<Json<Vec<Subclass>>, ApiError> {
    let class_id: ClassId = parse_id(&class_id, "class")?;

    let subclasses = state
        .catalog
        .list_subclasses(class_id)
        .await
        .map_err(|e| error_response(e.into()))?;
    Ok(Json(subclasses))
}

pub async fn list_ancestries(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Ancestry>>, ApiError> {
    let ancestries = state
        .catalog
        .list_ancestries()
        .await
        .map_err(|e| error_response(e.into()))?;
    Ok(Json(ancestries))
}

pub async fn list_communities(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Community>>, ApiError> {
    let communities = state
        .catalog
        .list_communities()
        .await
        .map_err(|e| error_response(e.into()))?;
    Ok(Json(communities))
}
