//! Mapping of service errors onto HTTP responses

use axum::http::StatusCode;
use uuid::Uuid;

use crate::application::ports::outbound::RepoError;
use crate::application::services::{ResourceError, ServiceError};
use crate::domain::entities::{CampaignError, CharacterError};
use crate::domain::services::BuilderError;

pub type ApiError = (StatusCode, String);

/// Parse a path segment as an id
pub fn parse_id<T: From<Uuid>>(raw: &str, what: &str) -> Result<T, ApiError> {
    Uuid::parse_str(raw)
        .map(T::from)
        .map_err(|_| (StatusCode::BAD_REQUEST, format!("Invalid {} ID", what)))
}

/// Convert a service failure into a status code and message.
///
/// The first typed error found in the chain decides the status; anything
/// unrecognised is a 500.
pub fn error_response(err: anyhow::Error) -> ApiError {
    let status = err
        .chain()
        .find_map(status_for)
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    if status.is_server_error() {
        tracing::error!("Request failed: {:#}", err);
    } else {
        tracing::debug!("Request rejected ({}): {:#}", status, err);
    }
    (status, format!("{:#}", err))
}

fn status_for(cause: &(dyn std::error::Error + 'static)) -> Option<StatusCode> {
    if let Some(e) = cause.downcast_ref::<ServiceError>() {
        return Some(match e {
            ServiceError::NotFound { .. } => StatusCode::NOT_FOUND,
            ServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
        });
    }
    if cause.downcast_ref::<CharacterError>().is_some()
        || cause.downcast_ref::<BuilderError>().is_some()
    {
        return Some(StatusCode::BAD_REQUEST);
    }
    if let Some(e) = cause.downcast_ref::<CampaignError>() {
        return Some(match e {
            CampaignError::UnknownInviteCode(_) => StatusCode::NOT_FOUND,
            CampaignError::AlreadyInCampaign(_) => StatusCode::CONFLICT,
            _ => StatusCode::BAD_REQUEST,
        });
    }
    if let Some(e) = cause.downcast_ref::<ResourceError>() {
        return Some(match e {
            ResourceError::FixedMaximum(_) => StatusCode::BAD_REQUEST,
            ResourceError::Write(_) => StatusCode::BAD_GATEWAY,
        });
    }
    if let Some(e) = cause.downcast_ref::<RepoError>() {
        return Some(match e {
            RepoError::NotFound { .. } => StatusCode::NOT_FOUND,
            RepoError::Invalid(_) => StatusCode::BAD_REQUEST,
            RepoError::Database(_) | RepoError::Serialization(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        });
    }
    None
}
