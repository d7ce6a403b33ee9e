//! Data Transfer Objects - For API boundaries
//!
//! Request bodies carry ids as strings and are parsed by the handlers;
//! responses flatten domain ids and timestamps to strings.

mod builder;
mod campaign;
mod character;
mod sheet;

pub use builder::*;
pub use campaign::*;
pub use character::*;
pub use sheet::*;
