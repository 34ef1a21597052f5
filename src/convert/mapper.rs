use crate::catalog::{BasicKind, DiscoveredField, DiscoveredType, SourceType};
use crate::ir::FieldTypeResult;

use super::{Chain, ConvertError, Converter, EMPTY_INTERFACE_SCALAR, INTERFACE_PREFIX, MAP_SUFFIX};

impl Converter<'_> {
    pub(super) fn map_in(
        &self,
        field_name: &str,
        embedded: bool,
        ty: &SourceType,
        chain: &mut Chain,
    ) -> Result<FieldTypeResult, ConvertError> {
        match ty {
            SourceType::Basic(kind) => self.map_basic(*kind),
            SourceType::Sequence(elem) => {
                let inner = self.map_in(field_name, false, elem, chain)?;
                Ok(FieldTypeResult {
                    type_name: format!("[{}]", inner.type_name),
                    opaque: inner.opaque,
                    auxiliary: inner.auxiliary,
                    embedded_fields: None,
                })
            }
            // optionality is not reflected; `!` comes from tag policy only
            SourceType::Pointer(elem) => self.map_in(field_name, embedded, elem, chain),
            SourceType::Map { key, value } => self.map_map(field_name, key, value, chain),
            SourceType::NamedAggregate(name) => {
                if !embedded {
                    return Ok(FieldTypeResult::named(name.clone()));
                }
                self.expand_embedded(name, chain)
            }
            SourceType::NamedScalar(name) => Ok(FieldTypeResult::opaque(name.clone())),
            SourceType::Interface { empty: true } => Ok(FieldTypeResult::opaque(EMPTY_INTERFACE_SCALAR)),
            SourceType::Interface { empty: false } => {
                Ok(FieldTypeResult::opaque(format!("{INTERFACE_PREFIX}{field_name}")))
            }
            SourceType::Unsupported(desc) => Err(ConvertError::InvalidType(desc.clone())),
        }
    }

    fn map_basic(&self, kind: BasicKind) -> Result<FieldTypeResult, ConvertError> {
        if kind == BasicKind::Invalid {
            return Err(ConvertError::InvalidType(kind.to_string()));
        }
        let mapping = self
            .scalars
            .lookup(kind)
            .ok_or_else(|| ConvertError::InvalidType(kind.to_string()))?;
        Ok(FieldTypeResult {
            type_name: mapping.name.clone(),
            opaque: mapping.opaque,
            ..FieldTypeResult::default()
        })
    }

    /// `F map[K]V` becomes `F: FMap` plus `type FMap { key: K  values: V }`.
    fn map_map(
        &self,
        field_name: &str,
        key: &SourceType,
        value: &SourceType,
        chain: &mut Chain,
    ) -> Result<FieldTypeResult, ConvertError> {
        let synthetic = DiscoveredType::new(
            format!("{field_name}{MAP_SUFFIX}"),
            vec![
                DiscoveredField::new("key", key.clone()),
                DiscoveredField::new("values", value.clone()),
            ],
        );
        let def = self.build_in(&synthetic, chain)?;
        Ok(FieldTypeResult {
            type_name: synthetic.name,
            opaque: false,
            auxiliary: vec![def],
            embedded_fields: None,
        })
    }

    fn expand_embedded(&self, name: &str, chain: &mut Chain) -> Result<FieldTypeResult, ConvertError> {
        if chain.iter().any(|n| n == name) {
            return Err(ConvertError::CircularType(name.to_string()));
        }
        let fields = match self.catalog.get(name) {
            Some(decl) => self.build_in(decl, chain)?.fields,
            None => {
                // imported struct, e.g. `time.Time`: fields are not known
                tracing::debug!(aggregate = name, "embedded aggregate outside catalog, nothing to flatten");
                Vec::new()
            }
        };
        Ok(FieldTypeResult {
            type_name: name.to_string(),
            opaque: false,
            auxiliary: Vec::new(),
            embedded_fields: Some(fields),
        })
    }
}

// ------------------------------- Tests ------------------------------------ //
