//! Entity and relationship types.

pub use consolidator_shared::config::EntityRole;
use consolidator_shared::config::EntityConfig;
use consolidator_shared::types::EntityId;
use serde::{Deserialize, Serialize};

/// A legal entity of the group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// ERP company id.
    pub id: EntityId,
    /// Registered name.
    pub legal_name: String,
    /// Short label.
    pub short_name: String,
    /// VAT registration number, e.g. `NL820994297B01`.
    pub vat_number: String,
    /// Role in the group.
    pub role: EntityRole,
}

impl Entity {
    /// Returns the VAT jurisdiction, the country prefix of the VAT number.
    #[must_use]
    pub fn jurisdiction(&self) -> Option<String> {
        jurisdiction_of(&self.vat_number)
    }
}

impl From<&EntityConfig> for Entity {
    fn from(config: &EntityConfig) -> Self {
        Self {
            id: EntityId(config.id),
            legal_name: config.legal_name.clone(),
            short_name: config.short_name.clone(),
            vat_number: config.vat_number.trim().to_uppercase(),
            role: config.role,
        }
    }
}

/// Extracts the two-letter country prefix from a VAT number.
#[must_use]
pub fn jurisdiction_of(vat_number: &str) -> Option<String> {
    let prefix: String = vat_number.trim().chars().take(2).collect();
    (prefix.len() == 2 && prefix.chars().all(|c| c.is_ascii_alphabetic()))
        .then(|| prefix.to_ascii_uppercase())
}

/// An intercompany relationship. `a` is the side whose view is reported first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    /// First entity.
    pub a: EntityId,
    /// Second entity.
    pub b: EntityId,
}

impl Relationship {
    /// Returns true if the relationship links `x` and `y` in either order.
    #[must_use]
    pub fn links(&self, x: EntityId, y: EntityId) -> bool {
        (self.a == x && self.b == y) || (self.a == y && self.b == x)
    }

    /// Returns the unordered key of this edge.
    #[must_use]
    pub fn key(&self) -> (EntityId, EntityId) {
        if self.a <= self.b {
            (self.a, self.b)
        } else {
            (self.b, self.a)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("NL820994297B01", Some("NL"))]
    #[case(" be0123456789", Some("BE"))]
    #[case("820994297B01", None)]
    #[case("N", None)]
    fn test_jurisdiction_of(#[case] vat: &str, #[case] expected: Option<&str>) {
        assert_eq!(jurisdiction_of(vat).as_deref(), expected);
    }

    #[test]
    fn test_entity_from_config_keeps_role() {
        let config = EntityConfig {
            id: 3,
            legal_name: "Pure & Original International B.V.".into(),
            short_name: "P&O Int".into(),
            vat_number: " nl862809095b01".into(),
            role: EntityRole::Subsidiary,
        };

        let entity = Entity::from(&config);

        assert_eq!(entity.role, EntityRole::Subsidiary);
        assert_eq!(entity.vat_number, "NL862809095B01");
        let json = serde_json::to_value(&entity).unwrap();
        assert_eq!(json["role"], "subsidiary");
    }

    #[test]
    fn test_relationship_links_either_order() {
        let rel = Relationship {
            a: EntityId(3),
            b: EntityId(1),
        };
        assert!(rel.links(EntityId(1), EntityId(3)));
        assert!(rel.links(EntityId(3), EntityId(1)));
        assert!(!rel.links(EntityId(1), EntityId(2)));
        assert_eq!(rel.key(), (EntityId(1), EntityId(3)));
    }
}
