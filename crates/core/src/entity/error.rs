//! Entity registry error types.

use consolidator_shared::types::EntityId;
use thiserror::Error;

/// Errors raised while building the entity registry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// No entities configured.
    #[error("At least one entity must be configured")]
    NoEntities,

    /// Two entities share an id.
    #[error("Duplicate entity id: {0}")]
    DuplicateEntity(EntityId),

    /// A relationship references an entity that is not registered.
    #[error("Relationship references unknown entity: {0}")]
    UnknownEntity(EntityId),

    /// A relationship links an entity to itself.
    #[error("Entity {0} cannot have a relationship with itself")]
    SelfRelationship(EntityId),

    /// The same unordered pair is configured twice.
    #[error("Relationship between {0} and {1} is configured more than once")]
    DuplicateRelationship(EntityId, EntityId),

    /// The VAT number carries no country prefix.
    #[error("VAT number of entity {0} has no jurisdiction prefix")]
    MissingJurisdiction(EntityId),
}
