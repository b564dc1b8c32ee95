use crate::attribute::AttributeRecord;
use crate::name::canonical_name;
use serde::{Deserialize, Serialize};

/// One row of the flat type list returned by the repository bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    /// Type name in the server's casing.
    pub name: String,

    /// Parent type name; `None` for a hierarchy root.
    pub super_type: Option<String>,

    /// Classification flag from the source system.
    pub is_internal: bool,
}

/// Per-attribute detail returned by the bridge for one type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDescriptor {
    pub name: String,
    pub data_type: String,
    pub length: u32,
    pub is_repeating: bool,
    pub is_inherited: bool,
}

/// Full detail response for one type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDetails {
    pub name: String,
    pub super_type: Option<String>,
    pub attributes: Vec<AttributeDescriptor>,
}

/// One type in the cached hierarchy.
///
/// `name` and `super_type` are stored canonicalized (lower-cased); the
/// server's original casing is kept in `display_name` for rendering.
/// `children` is derived, recomputed on every full rebuild, and sorted for
/// deterministic iteration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeNode {
    pub name: String,
    pub display_name: String,
    pub super_type: Option<String>,
    pub is_internal: bool,

    /// Empty until lazily fetched; non-empty means fully loaded for the
    /// current cache generation.
    pub attributes: Vec<AttributeRecord>,

    pub children: Vec<String>,
}

impl TypeNode {
    #[must_use]
    pub fn from_descriptor(desc: &TypeDescriptor) -> Self {
        let super_type = desc
            .super_type
            .as_deref()
            .map(canonical_name)
            .filter(|s| !s.is_empty());
        Self {
            name: canonical_name(&desc.name),
            display_name: desc.name.clone(),
            super_type,
            is_internal: desc.is_internal,
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Whether this node is a hierarchy root.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.super_type.is_none()
    }

    /// Whether attribute detail has been loaded.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        !self.attributes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn descriptor_names_are_canonicalized() {
        let node = TypeNode::from_descriptor(&TypeDescriptor {
            name: "DM_Document".to_string(),
            super_type: Some("DM_SysObject".to_string()),
            is_internal: false,
        });
        assert_eq!(node.name, "dm_document");
        assert_eq!(node.display_name, "DM_Document");
        assert_eq!(node.super_type.as_deref(), Some("dm_sysobject"));
        assert!(!node.is_root());
        assert!(!node.is_loaded());
    }

    #[test]
    fn blank_super_type_means_root() {
        let node = TypeNode::from_descriptor(&TypeDescriptor {
            name: "dm_sysobject".to_string(),
            super_type: Some("  ".to_string()),
            is_internal: false,
        });
        assert!(node.is_root());
    }
}
