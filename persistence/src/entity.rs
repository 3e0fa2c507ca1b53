//! Entities stored in the transactional store
//!
//! Entities carry primitive properties only. Nested data is modelled as
//! separate entities joined by named links.

use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeMap;

/// Store-assigned entity identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub(crate) u64);

impl EntityId {
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl std::str::FromStr for EntityId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim_start_matches('#').parse().map(Self)
    }
}

/// Primitive property value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyValue {
    String(String),
    Bool(bool),
    Int(i64),
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u32> for PropertyValue {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<usize> for PropertyValue {
    fn from(value: usize) -> Self {
        Self::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl std::fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String(value) => f.write_str(value),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Int(value) => write!(f, "{value}"),
        }
    }
}

/// Named, directed link to another entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub name: String,
    pub target: EntityId,
}

/// A stored entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub entity_type: String,
    pub properties: BTreeMap<String, PropertyValue>,
    pub links: Vec<Link>,
    /// Bumped on every committed change, used to detect write conflicts
    pub version: u64,
}

impl Entity {
    pub(crate) fn new(id: EntityId, entity_type: &str) -> Self {
        Self {
            id,
            entity_type: entity_type.to_string(),
            properties: BTreeMap::new(),
            links: Vec::new(),
            version: 0,
        }
    }

    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    pub fn string(&self, name: &str) -> Option<&str> {
        match self.properties.get(name) {
            Some(PropertyValue::String(value)) => Some(value),
            _ => None,
        }
    }

    pub fn bool(&self, name: &str) -> Option<bool> {
        match self.properties.get(name) {
            Some(PropertyValue::Bool(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        match self.properties.get(name) {
            Some(PropertyValue::Int(value)) => Some(*value),
            _ => None,
        }
    }

    /// Targets of all links called `name`, in insertion order
    pub fn links_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = EntityId> + 'a {
        self.links
            .iter()
            .filter(move |link| link.name == name)
            .map(|link| link.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_accessors() {
        let mut entity = Entity::new(EntityId(1), "Diagnostic");
        entity.properties.insert("kind".to_string(), "ERROR".into());
        entity.properties.insert("line".to_string(), 12u32.into());
        entity.properties.insert("result".to_string(), false.into());

        assert_eq!(entity.string("kind"), Some("ERROR"));
        assert_eq!(entity.int("line"), Some(12));
        assert_eq!(entity.bool("result"), Some(false));
        assert_eq!(entity.string("line"), None);
        assert_eq!(entity.int("missing"), None);
    }

    #[test]
    fn test_entity_id_parse() {
        assert_eq!("#7".parse::<EntityId>(), Ok(EntityId(7)));
        assert_eq!("42".parse::<EntityId>(), Ok(EntityId(42)));
        assert!("x".parse::<EntityId>().is_err());
        assert_eq!(EntityId(3).to_string(), "#3");
    }
}
