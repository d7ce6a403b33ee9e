//! Domain services - Pure business logic operations

pub mod character_builder;
pub mod derived_stats;

pub use character_builder::{BackgroundInput, BuilderError, BuilderStep, CharacterDraft};
pub use derived_stats::{derive_stats, DerivedStats, ResolvedItem};
