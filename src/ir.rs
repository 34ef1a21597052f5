// Schema-side IR produced by `convert` and consumed by `render`. No source types here.
use serde::Serialize;

/// One GraphQL object type, fields in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeDefinition {
    pub name: String,
    pub fields: Vec<FieldDefinition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDefinition {
    pub name: String,            // declared Go name
    pub type_name: String,       // resolved GraphQL type, e.g. `[String]`
    pub tag: String,             // raw tag, parsed at render time
    pub embedded: bool,
    pub opaque: bool,            // needs a `scalar <type_name>` declaration
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub nested: Vec<TypeDefinition>,    // auxiliary types this field introduced
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub embedded_fields: Vec<FieldDefinition>, // pre-flattened, only when embedded
}

/// What the type mapper resolved for one field type.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldTypeResult {
    pub type_name: String,
    pub opaque: bool,
    pub auxiliary: Vec<TypeDefinition>,
    /// Set when an embedded field's aggregate was expanded.
    pub embedded_fields: Option<Vec<FieldDefinition>>,
}

impl FieldTypeResult {
    pub fn named(type_name: impl Into<String>) -> Self {
        Self { type_name: type_name.into(), ..Self::default() }
    }
    pub fn opaque(type_name: impl Into<String>) -> Self {
        Self { type_name: type_name.into(), opaque: true, ..Self::default() }
    }
}
