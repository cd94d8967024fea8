//! Legal entities of the group and their intercompany relationship graph.
//!
//! Entities are immutable values; relationships are edges held by the
//! registry, never references between entities.

pub mod error;
pub mod registry;
pub mod types;

pub use error::RegistryError;
pub use registry::EntityRegistry;
pub use types::{Entity, EntityRole, Relationship};
