//! Schema descriptor types
//!
//! These are the machine-readable declarations that external tooling reads:
//! a [`TypeRef`] names a value shape, a [`RecordShape`] names the fields of
//! one record, and the [`Record`] trait ties each Rust model to its shape.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Reference to a value shape
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeRef {
    /// 64-bit signed integer
    Integer,
    /// UTF-8 string
    String,
    /// true / false
    Boolean,
    /// Ordered sequence of items
    Array { items: Box<TypeRef> },
    /// A named record shape from the registry
    Record { name: String },
    /// Object with no declared structure
    OpaqueObject,
}

impl TypeRef {
    /// Reference a record by name
    pub fn record(name: impl Into<String>) -> Self {
        TypeRef::Record { name: name.into() }
    }

    /// Sequence of `items`
    pub fn array_of(items: TypeRef) -> Self {
        TypeRef::Array {
            items: Box::new(items),
        }
    }

    /// Name of the record this type points at, looking through sequences
    pub fn record_name(&self) -> Option<&str> {
        match self {
            TypeRef::Record { name } => Some(name),
            TypeRef::Array { items } => items.record_name(),
            _ => None,
        }
    }

    /// Whether this is a scalar (usable as a path or header value)
    pub fn is_scalar(&self) -> bool {
        matches!(self, TypeRef::Integer | TypeRef::String | TypeRef::Boolean)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Integer => write!(f, "integer"),
            TypeRef::String => write!(f, "string"),
            TypeRef::Boolean => write!(f, "boolean"),
            TypeRef::Array { items } => write!(f, "[{}]", items),
            TypeRef::Record { name } => write!(f, "{}", name),
            TypeRef::OpaqueObject => write!(f, "object"),
        }
    }
}

/// A single field of a record shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Wire name (e.g. "photoUrls")
    pub name: String,
    /// Declared value shape
    #[serde(rename = "type")]
    pub type_ref: TypeRef,
    /// Required fields must be present; all others may be absent
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl FieldDef {
    pub fn required(name: impl Into<String>, type_ref: TypeRef) -> Self {
        Self {
            name: name.into(),
            type_ref,
            required: true,
            description: None,
        }
    }

    pub fn optional(name: impl Into<String>, type_ref: TypeRef) -> Self {
        Self {
            name: name.into(),
            type_ref,
            required: false,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A named record shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordShape {
    /// Unique name of the record (e.g. "Pet")
    pub name: String,
    /// Fields in declaration order
    pub fields: Vec<FieldDef>,
}

impl RecordShape {
    /// Create a new record shape
    pub fn new(name: impl Into<String>, fields: Vec<FieldDef>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }

    /// Get a field by wire name
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Names of the required fields
    pub fn required_fields(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name.as_str())
            .collect()
    }

    /// Records embedded by this shape's fields
    pub fn references(&self) -> Vec<&str> {
        let mut refs: Vec<&str> = Vec::new();
        for name in self.fields.iter().filter_map(|f| f.type_ref.record_name()) {
            if !refs.contains(&name) {
                refs.push(name);
            }
        }
        refs
    }
}

/// A Rust model that corresponds to a record shape
pub trait Record: Serialize + DeserializeOwned {
    /// Wire name of the record
    const NAME: &'static str;

    /// Descriptor of the record's fields
    fn shape() -> RecordShape;
}
