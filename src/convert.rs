//! Go type graph → GraphQL type definitions.
//!
//! Two halves that call each other:
//! - `mapper`: one source type → one [`FieldTypeResult`]
//! - `builder`: one aggregate → one [`TypeDefinition`], mapping field by field
//!
//! Maps and embedded structs send the mapper back into the builder. Both
//! halves are pure: synthesized types come back as return values.
mod builder;
mod mapper;

use thiserror::Error;

use crate::catalog::{Catalog, DiscoveredType, SourceType};
use crate::ir::{FieldTypeResult, TypeDefinition};
use crate::scalars::ScalarTable;

/// Suffix of the object type synthesized for a map-typed field.
pub const MAP_SUFFIX: &str = "Map";
/// Scalar used for `interface{}` / `any`.
pub const EMPTY_INTERFACE_SCALAR: &str = "interfaceEmpty";
/// Prefix of the scalar synthesized for a non-empty interface field.
pub const INTERFACE_PREFIX: &str = "interface";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConvertError {
    #[error("invalid type: {0}")]
    InvalidType(String),
    #[error("circular type: {0} embeds itself")]
    CircularType(String),
}

pub struct Converter<'a> {
    scalars: &'a ScalarTable,
    catalog: &'a Catalog,
}

impl<'a> Converter<'a> {
    pub fn new(scalars: &'a ScalarTable, catalog: &'a Catalog) -> Self {
        Self { scalars, catalog }
    }

    /// Build one aggregate. A single bad field fails the whole aggregate.
    pub fn build(&self, ty: &DiscoveredType) -> Result<TypeDefinition, ConvertError> {
        self.build_in(ty, &mut Vec::new())
    }

    /// Build every aggregate of the catalog, in catalog order. Stops at the
    /// first failing aggregate.
    pub fn build_all(&self) -> Result<Vec<TypeDefinition>, ConvertError> {
        let mut out = Vec::with_capacity(self.catalog.len());
        for ty in self.catalog.iter() {
            match self.build(ty) {
                Ok(def) => {
                    tracing::debug!(aggregate = %def.name, fields = def.fields.len(), "converted");
                    out.push(def);
                }
                Err(error) => {
                    tracing::debug!(aggregate = %ty.name, %error, "conversion aborted");
                    return Err(error);
                }
            }
        }
        Ok(out)
    }

    /// Resolve the GraphQL type of a field named `field_name`.
    pub fn map_type(
        &self,
        field_name: &str,
        embedded: bool,
        ty: &SourceType,
    ) -> Result<FieldTypeResult, ConvertError> {
        self.map_in(field_name, embedded, ty, &mut Vec::new())
    }
}

/// Aggregates currently being expanded, outermost first.
type Chain = Vec<String>;
