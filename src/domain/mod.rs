//! Domain layer - Core business logic with no knowledge of storage or transport
//!
//! This layer contains:
//! - Entities: Character, Item, Class/Subclass, Ancestry/Community, Campaign
//! - Value Objects: ids, modifiers, resource counters, traits, duality dice
//! - Domain Services: derived stat aggregation and the character builder

pub mod entities;
pub mod services;
pub mod value_objects;
