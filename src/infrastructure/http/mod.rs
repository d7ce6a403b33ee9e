//! HTTP REST API routes
//!
//! Every route except the catalog and public reads identifies the caller by
//! the `X-User-Id` header.

mod builder_routes;
mod campaign_routes;
mod catalog_routes;
mod character_routes;
mod error;
mod owner;
mod resource_routes;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;

use crate::infrastructure::state::AppState;

/// Create all API routes
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        // Character routes
        .route("/api/characters", get(character_routes::list_characters))
        .route("/api/characters", post(character_routes::create_character))
        .route("/api/characters/{id}", get(character_routes::get_character))
        .route("/api/characters/{id}", put(character_routes::update_character))
        .route(
            "/api/characters/{id}",
            delete(character_routes::delete_character),
        )
        .route("/api/characters/{id}/sheet", get(character_routes::get_sheet))
        .route("/api/characters/{id}/stats", get(character_routes::get_stats))
        .route(
            "/api/characters/{id}/equipment",
            post(character_routes::add_item),
        )
        .route(
            "/api/characters/{id}/equipment/{item_id}",
            put(character_routes::set_equipped),
        )
        .route(
            "/api/characters/{id}/equipment/{item_id}",
            delete(character_routes::remove_item),
        )
        .route(
            "/api/characters/{id}/inventory",
            post(character_routes::add_inventory_entry),
        )
        .route(
            "/api/characters/{id}/inventory/{index}",
            delete(character_routes::remove_inventory_entry),
        )
        .route(
            "/api/characters/{id}/level-up",
            post(character_routes::level_up),
        )
        // Resource tracking routes
        .route(
            "/api/characters/{id}/resources/{resource}/max",
            put(resource_routes::set_max),
        )
        .route(
            "/api/characters/{id}/resources/flush",
            post(resource_routes::flush_resources),
        )
        .route(
            "/api/characters/{id}/resources/{resource}/toggle",
            post(resource_routes::toggle_slot),
        )
        .route(
            "/api/characters/{id}/session",
            delete(resource_routes::close_session),
        )
        .route("/api/characters/{id}/rolls", post(resource_routes::roll))
        // Builder routes
        .route("/api/builder/drafts", post(builder_routes::start_draft))
        .route("/api/builder/drafts/{id}", get(builder_routes::get_draft))
        .route(
            "/api/builder/drafts/{id}",
            delete(builder_routes::discard_draft),
        )
        .route(
            "/api/builder/drafts/{id}/finalize",
            post(builder_routes::finalize_draft),
        )
        .route(
            "/api/builder/drafts/{id}/{step}",
            put(builder_routes::apply_step),
        )
        // Catalog routes
        .route("/api/catalog/items", get(catalog_routes::list_items))
        .route("/api/catalog/classes", get(catalog_routes::list_classes))
        .route(
            "/api/catalog/classes/{id}/subclasses",
            get(catalog_routes::list_subclasses),
        )
        .route("/api/catalog/ancestries", get(catalog_routes::list_ancestries))
        .route(
            "/api/catalog/communities",
            get(catalog_routes::list_communities),
        )
        // Campaign routes
        .route("/api/campaigns", get(campaign_routes::list_campaigns))
        .route("/api/campaigns", post(campaign_routes::create_campaign))
        .route("/api/campaigns/join", post(campaign_routes::join_campaign))
        .route("/api/campaigns/{id}", get(campaign_routes::get_campaign))
        .route(
            "/api/campaigns/{id}",
            delete(campaign_routes::delete_campaign),
        )
        .route(
            "/api/campaigns/{id}/leave",
            post(campaign_routes::leave_campaign),
        )
}
