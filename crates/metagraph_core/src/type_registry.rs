//! Type registry: resolves type names to descriptors.
//!
//! A descriptor carries the type's category, declared property names, a
//! supertype link, the legal lifecycle statuses, and (for relationship
//! and classification types) attachment constraints. The registry is
//! built once and shared read-only.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::MetaGraphError;
use crate::types::InstanceStatus;

/// Statuses every type supports unless the descriptor narrows them.
pub const DEFAULT_LEGAL_STATUSES: [InstanceStatus; 5] = [
    InstanceStatus::Draft,
    InstanceStatus::Proposed,
    InstanceStatus::Prepared,
    InstanceStatus::Active,
    InstanceStatus::Deleted,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeCategory {
    Entity,
    Relationship,
    Classification,
}

impl TypeCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Entity => "entity",
            Self::Relationship => "relationship",
            Self::Classification => "classification",
        }
    }
}

impl std::fmt::Display for TypeCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A type descriptor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeDef {
    pub type_id: Uuid,
    pub name: String,
    pub category: TypeCategory,
    #[serde(default)]
    pub description: String,
    /// Property names declared directly on this type (supertype
    /// properties are inherited through the chain, not repeated here).
    #[serde(default)]
    pub properties: Vec<String>,
    #[serde(default)]
    pub super_type: Option<String>,
    /// Empty = `DEFAULT_LEGAL_STATUSES`.
    #[serde(default)]
    pub legal_statuses: Vec<InstanceStatus>,
    /// Allowed element type names at each relationship end; empty = any.
    #[serde(default)]
    pub end_one_types: Vec<String>,
    #[serde(default)]
    pub end_two_types: Vec<String>,
    /// Element type names a classification may attach to; empty = any.
    #[serde(default)]
    pub valid_element_types: Vec<String>,
}

impl TypeDef {
    fn base(name: impl Into<String>, category: TypeCategory) -> Self {
        Self {
            type_id: Uuid::new_v4(),
            name: name.into(),
            category,
            description: String::new(),
            properties: Vec::new(),
            super_type: None,
            legal_statuses: Vec::new(),
            end_one_types: Vec::new(),
            end_two_types: Vec::new(),
            valid_element_types: Vec::new(),
        }
    }

    pub fn entity(name: impl Into<String>, properties: &[&str]) -> Self {
        Self {
            properties: properties.iter().map(|p| p.to_string()).collect(),
            ..Self::base(name, TypeCategory::Entity)
        }
    }

    pub fn relationship(
        name: impl Into<String>,
        properties: &[&str],
        end_one_types: &[&str],
        end_two_types: &[&str],
    ) -> Self {
        Self {
            properties: properties.iter().map(|p| p.to_string()).collect(),
            end_one_types: end_one_types.iter().map(|t| t.to_string()).collect(),
            end_two_types: end_two_types.iter().map(|t| t.to_string()).collect(),
            ..Self::base(name, TypeCategory::Relationship)
        }
    }

    pub fn classification(
        name: impl Into<String>,
        properties: &[&str],
        valid_element_types: &[&str],
    ) -> Self {
        Self {
            properties: properties.iter().map(|p| p.to_string()).collect(),
            valid_element_types: valid_element_types.iter().map(|t| t.to_string()).collect(),
            ..Self::base(name, TypeCategory::Classification)
        }
    }

    pub fn with_super_type(mut self, super_type: impl Into<String>) -> Self {
        self.super_type = Some(super_type.into());
        self
    }

    pub fn with_legal_statuses(mut self, statuses: &[InstanceStatus]) -> Self {
        self.legal_statuses = statuses.to_vec();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

// ── Registry ──────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct TypeRegistryBuilder {
    defs: Vec<TypeDef>,
}

impl TypeRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, def: TypeDef) -> Self {
        self.defs.push(def);
        self
    }

    /// Validates name uniqueness and that every supertype link resolves
    /// to an existing descriptor of the same category, acyclically.
    pub fn build(self) -> Result<TypeRegistry, MetaGraphError> {
        let mut defs: HashMap<String, TypeDef> = HashMap::with_capacity(self.defs.len());
        for def in self.defs {
            if defs.insert(def.name.clone(), def.clone()).is_some() {
                return Err(MetaGraphError::TypeError {
                    type_name: def.name,
                    message: "duplicate type name".into(),
                });
            }
        }
        for def in defs.values() {
            let mut seen: HashSet<&str> = HashSet::from([def.name.as_str()]);
            let mut cursor = def.super_type.as_deref();
            while let Some(parent_name) = cursor {
                let parent = defs.get(parent_name).ok_or_else(|| MetaGraphError::TypeError {
                    type_name: def.name.clone(),
                    message: format!("supertype {parent_name} is not registered"),
                })?;
                if parent.category != def.category {
                    return Err(MetaGraphError::TypeError {
                        type_name: def.name.clone(),
                        message: format!(
                            "supertype {parent_name} is a {} type, not {}",
                            parent.category, def.category
                        ),
                    });
                }
                if !seen.insert(parent_name) {
                    return Err(MetaGraphError::TypeError {
                        type_name: def.name.clone(),
                        message: "supertype chain contains a cycle".into(),
                    });
                }
                cursor = parent.super_type.as_deref();
            }
        }
        Ok(TypeRegistry { defs })
    }
}

/// Name-indexed, read-only type descriptor lookup.
#[derive(Debug)]
pub struct TypeRegistry {
    defs: HashMap<String, TypeDef>,
}

impl TypeRegistry {
    pub fn builder() -> TypeRegistryBuilder {
        TypeRegistryBuilder::new()
    }

    pub fn resolve(&self, name: &str) -> Result<&TypeDef, MetaGraphError> {
        self.defs.get(name).ok_or_else(|| MetaGraphError::TypeError {
            type_name: name.to_string(),
            message: "unknown type name".into(),
        })
    }

    pub fn require_category(
        &self,
        name: &str,
        category: TypeCategory,
    ) -> Result<&TypeDef, MetaGraphError> {
        let def = self.resolve(name)?;
        if def.category != category {
            return Err(MetaGraphError::TypeError {
                type_name: name.to_string(),
                message: format!("expected a {category} type, found {}", def.category),
            });
        }
        Ok(def)
    }

    /// Walks the supertype chain. Unknown type names fail; unknown
    /// property names on a known type return `false`.
    pub fn property_defined(&self, type_name: &str, property: &str) -> Result<bool, MetaGraphError> {
        let mut cursor = Some(self.resolve(type_name)?);
        while let Some(def) = cursor {
            if def.properties.iter().any(|p| p == property) {
                return Ok(true);
            }
            cursor = match def.super_type.as_deref() {
                Some(parent) => Some(self.resolve(parent)?),
                None => None,
            };
        }
        Ok(false)
    }

    pub fn status_legal(&self, type_name: &str, status: InstanceStatus) -> Result<bool, MetaGraphError> {
        if status == InstanceStatus::Unknown {
            return Ok(false);
        }
        let def = self.resolve(type_name)?;
        if def.legal_statuses.is_empty() {
            Ok(DEFAULT_LEGAL_STATUSES.contains(&status))
        } else {
            Ok(def.legal_statuses.contains(&status))
        }
    }

    /// `name` is itself or a transitive subtype of `ancestor`.
    pub fn is_subtype_of(&self, name: &str, ancestor: &str) -> bool {
        let mut cursor = self.defs.get(name);
        while let Some(def) = cursor {
            if def.name == ancestor {
                return true;
            }
            cursor = def.super_type.as_deref().and_then(|p| self.defs.get(p));
        }
        false
    }

    fn end_compatible(&self, allowed: &[String], end_type: &str) -> bool {
        allowed.is_empty() || allowed.iter().any(|a| self.is_subtype_of(end_type, a))
    }

    /// Both ends must satisfy the relationship type's declared end-type
    /// constraints (supertype-aware).
    pub fn ends_compatible(
        &self,
        rel: &TypeDef,
        end_one_type: &str,
        end_two_type: &str,
    ) -> Result<(), MetaGraphError> {
        if !self.end_compatible(&rel.end_one_types, end_one_type) {
            return Err(MetaGraphError::TypeError {
                type_name: rel.name.clone(),
                message: format!("end one type {end_one_type} is not compatible"),
            });
        }
        if !self.end_compatible(&rel.end_two_types, end_two_type) {
            return Err(MetaGraphError::TypeError {
                type_name: rel.name.clone(),
                message: format!("end two type {end_two_type} is not compatible"),
            });
        }
        Ok(())
    }

    /// A classification type attaches only to its declared element types
    /// (supertype-aware); an empty declaration attaches anywhere.
    pub fn classification_attachable(
        &self,
        cls: &TypeDef,
        element_type: &str,
    ) -> Result<(), MetaGraphError> {
        if self.end_compatible(&cls.valid_element_types, element_type) {
            Ok(())
        } else {
            Err(MetaGraphError::TypeError {
                type_name: cls.name.clone(),
                message: format!("not attachable to elements of type {element_type}"),
            })
        }
    }

    /// Expands a type-name filter to include every registered subtype,
    /// sorted for stable downstream queries. Empty stays empty (meaning
    /// "no constraint").
    pub fn with_subtypes(&self, names: &[String]) -> Vec<String> {
        if names.is_empty() {
            return Vec::new();
        }
        let mut expanded: Vec<String> = self
            .defs
            .keys()
            .filter(|candidate| names.iter().any(|n| self.is_subtype_of(candidate, n)))
            .cloned()
            .collect();
        expanded.sort();
        expanded
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}
