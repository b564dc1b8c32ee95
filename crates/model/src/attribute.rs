use serde::{Deserialize, Serialize};

/// Category of a repository attribute.
///
/// Reserved name prefixes mark attributes owned by the server (`r_`), its
/// internals (`i_`) or the application layer (`a_`); everything else is either
/// part of a type's inherited standard set or a custom field the type defines
/// itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeCategory {
    /// Defined by the type being inspected, not by its ancestry.
    Custom,
    /// Inherited from the standard object hierarchy.
    Standard,
    /// Server-owned (`r_` prefix).
    System,
    /// Application-owned (`a_` prefix).
    Application,
    /// Repository-internal (`i_` prefix).
    Internal,
}

/// Map a reserved name prefix to its category; plain names are Standard.
#[must_use]
pub fn category_for_prefix(name: &str) -> AttributeCategory {
    if name.starts_with("r_") {
        AttributeCategory::System
    } else if name.starts_with("i_") {
        AttributeCategory::Internal
    } else if name.starts_with("a_") {
        AttributeCategory::Application
    } else {
        AttributeCategory::Standard
    }
}

/// Value carried by an attribute record.
///
/// Repeating attributes hold their values in the order the dump emitted them.
/// Values are raw text; escaping/unescaping is a rendering concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Scalar(String),
    Repeating(Vec<String>),
}

impl AttributeValue {
    /// Append a value, promoting a scalar record if necessary.
    pub fn push(&mut self, value: String) {
        match self {
            Self::Repeating(values) => values.push(value),
            Self::Scalar(first) => {
                let first = std::mem::take(first);
                *self = Self::Repeating(vec![first, value]);
            }
        }
    }

    #[must_use]
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Self::Scalar(value) => Some(value),
            Self::Repeating(_) => None,
        }
    }
}

impl Default for AttributeValue {
    fn default() -> Self {
        Self::Scalar(String::new())
    }
}

/// One attribute of a type or object instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeRecord {
    /// Attribute name as it appeared in the source.
    pub name: String,

    /// Declared semantic type, e.g. "STRING", "ID", "INT".
    pub data_type: String,

    /// Declared length; 0 means not applicable or unbounded.
    pub length: u32,

    /// Whether the attribute holds an ordered multi-valued sequence.
    pub is_repeating: bool,

    /// Whether the attribute is inherited from a supertype.
    pub is_inherited: bool,

    /// Derived category (see [`AttributeCategory`]).
    pub category: AttributeCategory,

    /// Raw value(s); empty scalar for records from type definitions.
    pub value: AttributeValue,
}

impl AttributeRecord {
    /// Record for an attribute coming from a type definition.
    ///
    /// Attributes defined directly on the inspected type are always Custom;
    /// inherited ones take the prefix-derived category.
    #[must_use]
    pub fn from_type_definition(
        name: impl Into<String>,
        data_type: impl Into<String>,
        length: u32,
        is_repeating: bool,
        is_inherited: bool,
    ) -> Self {
        let name = name.into();
        let category = if is_inherited {
            category_for_prefix(&name)
        } else {
            AttributeCategory::Custom
        };
        Self {
            name,
            data_type: data_type.into(),
            length,
            is_repeating,
            is_inherited,
            category,
            value: AttributeValue::default(),
        }
    }
}
