//! Errors raised by application services ahead of any persistence call

use crate::domain::value_objects::CharacterId;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Conflict: {0}")]
    Conflict(String),
}

impl ServiceError {
    pub fn not_found(entity_type: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity_type,
            id: id.to_string(),
        }
    }

    pub fn character_not_found(id: CharacterId) -> Self {
        Self::not_found("Character", id)
    }

    pub fn not_owner(what: &str) -> Self {
        Self::Forbidden(format!("{} belongs to another user", what))
    }
}
