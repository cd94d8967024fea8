//! Entity registry: a small fixed graph of entities and relationship edges.

use std::collections::HashSet;

use consolidator_shared::config::{EntityConfig, RelationshipConfig};
use consolidator_shared::types::EntityId;
use serde::Serialize;

use super::error::RegistryError;
use super::types::{Entity, Relationship};

/// The group's entities and their intercompany relationships.
///
/// Built once at startup and shared read-only afterwards. Entity and
/// relationship order is the configured order, which keeps report output stable.
#[derive(Debug, Clone, Serialize)]
pub struct EntityRegistry {
    entities: Vec<Entity>,
    relationships: Vec<Relationship>,
}

impl EntityRegistry {
    /// Builds a registry, validating the relationship graph.
    ///
    /// # Errors
    ///
    /// Returns a `RegistryError` for empty or duplicate entities, edges that
    /// point at unknown entities or at themselves, duplicate edges, and VAT
    /// numbers without a country prefix.
    pub fn new(
        entities: Vec<Entity>,
        relationships: Vec<Relationship>,
    ) -> Result<Self, RegistryError> {
        if entities.is_empty() {
            return Err(RegistryError::NoEntities);
        }

        let mut ids = HashSet::new();
        for entity in &entities {
            if !ids.insert(entity.id) {
                return Err(RegistryError::DuplicateEntity(entity.id));
            }
            if entity.jurisdiction().is_none() {
                return Err(RegistryError::MissingJurisdiction(entity.id));
            }
        }

        let mut edges = HashSet::new();
        for rel in &relationships {
            for end in [rel.a, rel.b] {
                if !ids.contains(&end) {
                    return Err(RegistryError::UnknownEntity(end));
                }
            }
            if rel.a == rel.b {
                return Err(RegistryError::SelfRelationship(rel.a));
            }
            if !edges.insert(rel.key()) {
                return Err(RegistryError::DuplicateRelationship(rel.a, rel.b));
            }
        }

        Ok(Self {
            entities,
            relationships,
        })
    }

    /// Builds a registry from static configuration.
    ///
    /// # Errors
    ///
    /// See [`EntityRegistry::new`].
    pub fn from_config(
        entities: &[EntityConfig],
        relationships: &[RelationshipConfig],
    ) -> Result<Self, RegistryError> {
        Self::new(
            entities.iter().map(Entity::from).collect(),
            relationships
                .iter()
                .map(|r| {
                    let (a, b) = r.ends();
                    Relationship { a, b }
                })
                .collect(),
        )
    }

    /// All entities in configured order.
    #[must_use]
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// All relationships in configured order.
    #[must_use]
    pub fn relationships(&self) -> &[Relationship] {
        &self.relationships
    }

    /// Looks up an entity by id.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    /// Returns true if `id` is a registered entity.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.get(id).is_some()
    }

    /// Returns the entities `id` has a relationship with.
    #[must_use]
    pub fn partners_of(&self, id: EntityId) -> Vec<EntityId> {
        self.relationships
            .iter()
            .filter_map(|r| {
                if r.a == id {
                    Some(r.b)
                } else if r.b == id {
                    Some(r.a)
                } else {
                    None
                }
            })
            .collect()
    }

    /// Display label for an entity, falling back to its id.
    #[must_use]
    pub fn label(&self, id: EntityId) -> String {
        self.get(id)
            .map_or_else(|| format!("Company {id}"), |e| e.short_name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::types::EntityRole;

    fn entity(id: u32, vat: &str) -> Entity {
        Entity {
            id: EntityId(id),
            legal_name: format!("Entity {id} B.V."),
            short_name: format!("E{id}"),
            vat_number: vat.to_string(),
            role: EntityRole::Sibling,
        }
    }

    fn rel(a: u32, b: u32) -> Relationship {
        Relationship {
            a: EntityId(a),
            b: EntityId(b),
        }
    }

    #[test]
    fn test_builds_three_entity_triangle() {
        let registry = EntityRegistry::new(
            vec![entity(1, "NL1"), entity(2, "NL2"), entity(3, "NL3")],
            vec![rel(1, 3), rel(1, 2), rel(3, 2)],
        )
        .unwrap();

        assert_eq!(registry.entities().len(), 3);
        assert_eq!(registry.relationships().len(), 3);
        assert_eq!(registry.partners_of(EntityId(1)), vec![EntityId(3), EntityId(2)]);
        assert_eq!(registry.label(EntityId(2)), "E2");
        assert_eq!(registry.label(EntityId(9)), "Company 9");
    }

    #[test]
    fn test_rejects_empty_registry() {
        assert_eq!(
            EntityRegistry::new(vec![], vec![]).unwrap_err(),
            RegistryError::NoEntities
        );
    }

    #[test]
    fn test_rejects_duplicate_entity() {
        let err = EntityRegistry::new(vec![entity(1, "NL1"), entity(1, "NL2")], vec![]).unwrap_err();
        assert_eq!(err, RegistryError::DuplicateEntity(EntityId(1)));
    }

    #[test]
    fn test_rejects_unknown_relationship_end() {
        let err = EntityRegistry::new(vec![entity(1, "NL1")], vec![rel(1, 4)]).unwrap_err();
        assert_eq!(err, RegistryError::UnknownEntity(EntityId(4)));
    }

    #[test]
    fn test_rejects_self_relationship() {
        let err = EntityRegistry::new(vec![entity(1, "NL1")], vec![rel(1, 1)]).unwrap_err();
        assert_eq!(err, RegistryError::SelfRelationship(EntityId(1)));
    }

    #[test]
    fn test_rejects_reversed_duplicate_edge() {
        let err = EntityRegistry::new(
            vec![entity(1, "NL1"), entity(2, "NL2")],
            vec![rel(1, 2), rel(2, 1)],
        )
        .unwrap_err();
        assert_eq!(err, RegistryError::DuplicateRelationship(EntityId(2), EntityId(1)));
    }

    #[test]
    fn test_rejects_vat_number_without_prefix() {
        let err = EntityRegistry::new(vec![entity(1, "820994297B01")], vec![]).unwrap_err();
        assert_eq!(err, RegistryError::MissingJurisdiction(EntityId(1)));
    }
}
