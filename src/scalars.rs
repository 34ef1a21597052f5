//! Basic kind → GraphQL scalar table.
//!
//! GraphQL's `Int` is a signed 32-bit integer, so every 64-bit (and
//! pointer-sized) kind becomes the custom `BigInt` scalar.
use std::collections::BTreeMap;
use serde::Deserialize;
use thiserror::Error;

use crate::catalog::BasicKind;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScalarMapping {
    pub name: String,
    /// true when the schema must declare `scalar <name>`
    #[serde(default)]
    pub opaque: bool,
}

/// Immutable once built; shared by reference with the converter.
#[derive(Debug, Clone)]
pub struct ScalarTable {
    entries: BTreeMap<BasicKind, ScalarMapping>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScalarError {
    #[error("unknown basic kind `{0}`")]
    UnknownKind(String),
    #[error("`{0}` cannot be mapped to a scalar")]
    NotMappable(BasicKind),
    #[error("empty scalar name for `{0}`")]
    EmptyName(BasicKind),
}

const STANDARD: &[(BasicKind, &str, bool)] = &[
    (BasicKind::Bool,           "Boolean",       false),
    (BasicKind::Int,            "Int",           false),
    (BasicKind::Int8,           "Int",           false),
    (BasicKind::Int16,          "Int",           false),
    (BasicKind::Int32,          "Int",           false),
    (BasicKind::Int64,          "BigInt",        true),
    (BasicKind::Uint,           "Int",           false),
    (BasicKind::Uint8,          "Int",           false),
    (BasicKind::Uint16,         "Int",           false),
    (BasicKind::Uint32,         "Int",           false),
    (BasicKind::Uint64,         "BigInt",        true),
    (BasicKind::Uintptr,        "BigInt",        true),
    (BasicKind::Float32,        "Float",         false),
    (BasicKind::Float64,        "Float",         false),
    (BasicKind::Complex64,      "ComplexNumber", true),
    (BasicKind::Complex128,     "ComplexNumber", true),
    (BasicKind::String,         "String",        false),
    (BasicKind::UnsafePointer,  "UnsafePointer", true),
    (BasicKind::UntypedBool,    "Boolean",       false),
    (BasicKind::UntypedInt,     "BigInt",        true),
    (BasicKind::UntypedRune,    "Int",           false),
    (BasicKind::UntypedFloat,   "Float",         false),
    (BasicKind::UntypedComplex, "ComplexNumber", true),
    (BasicKind::UntypedString,  "String",        false),
    (BasicKind::UntypedNil,     "UntypedNil",    true),
];

impl ScalarTable {
    pub fn standard() -> Self {
        let entries = STANDARD
            .iter()
            .map(|&(kind, name, opaque)| (kind, ScalarMapping { name: name.to_string(), opaque }))
            .collect();
        Self { entries }
    }

    /// Standard table with entries replaced per kind name (`"int64"`, `"untyped nil"`, ...).
    pub fn with_overrides<'a, I>(overrides: I) -> Result<Self, ScalarError>
    where
        I: IntoIterator<Item = (&'a String, &'a ScalarMapping)>,
    {
        let mut table = Self::standard();
        for (kind_name, mapping) in overrides {
            let kind = BasicKind::from_name(kind_name)
                .ok_or_else(|| ScalarError::UnknownKind(kind_name.clone()))?;
            if kind == BasicKind::Invalid {
                return Err(ScalarError::NotMappable(kind));
            }
            if mapping.name.trim().is_empty() {
                return Err(ScalarError::EmptyName(kind));
            }
            tracing::debug!(kind = %kind, scalar = %mapping.name, "scalar override");
            table.entries.insert(kind, mapping.clone());
        }
        Ok(table)
    }

    pub fn lookup(&self, kind: BasicKind) -> Option<&ScalarMapping> {
        self.entries.get(&kind)
    }
}

impl Default for ScalarTable {
    fn default() -> Self { Self::standard() }
}

// ------------------------------- Tests ------------------------------------ //
