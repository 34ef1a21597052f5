use crate::catalog::{DiscoveredField, DiscoveredType};
use crate::ir::{FieldDefinition, TypeDefinition};

use super::{Chain, ConvertError, Converter};

impl Converter<'_> {
    /// One field definition per declared field, same order; exclusion is a
    /// render-time decision.
    pub(super) fn build_in(&self, ty: &DiscoveredType, chain: &mut Chain) -> Result<TypeDefinition, ConvertError> {
        chain.push(ty.name.clone());
        let fields = ty
            .fields
            .iter()
            .map(|field| self.build_field(field, chain))
            .collect::<Result<Vec<_>, _>>();
        chain.pop();

        Ok(TypeDefinition { name: ty.name.clone(), fields: fields? })
    }

    fn build_field(&self, field: &DiscoveredField, chain: &mut Chain) -> Result<FieldDefinition, ConvertError> {
        let resolved = self.map_in(&field.name, field.embedded, &field.ty, chain)?;
        tracing::trace!(field = %field.name, source = %field.ty, graphql = %resolved.type_name, "mapped");
        Ok(FieldDefinition {
            name: field.name.clone(),
            type_name: resolved.type_name,
            tag: field.tag.clone(),
            embedded: field.embedded,
            opaque: resolved.opaque,
            nested: resolved.auxiliary,
            embedded_fields: resolved.embedded_fields.unwrap_or_default(),
        })
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use crate::catalog::{BasicKind, Catalog, DiscoveredField, DiscoveredType, SourceType};
    use crate::convert::{ConvertError, Converter};
    use crate::scalars::ScalarTable;

    fn int() -> SourceType { SourceType::Basic(BasicKind::Int) }

    #[test]
    fn empty_struct_builds() {
        let scalars = ScalarTable::standard();
        let catalog = Catalog::new();
        let def = Converter::new(&scalars, &catalog).build(&DiscoveredType::new("EmptyStruct", vec![])).unwrap();
        assert_eq!(def.name, "EmptyStruct");
        assert!(def.fields.is_empty());
    }

    #[test]
    fn fields_keep_order_tags_and_flags() {
        let scalars = ScalarTable::standard();
        let catalog = Catalog::new();
        let ty = DiscoveredType::new(
            "StructWithFields",
            vec![
                DiscoveredField::new("someField", SourceType::Basic(BasicKind::Bool)).with_tag("tagValue"),
                DiscoveredField::new("Count", SourceType::Basic(BasicKind::Uint64)),
                DiscoveredField::new("Kind", SourceType::NamedScalar("Kind".into())),
            ],
        );
        let def = Converter::new(&scalars, &catalog).build(&ty).unwrap();
        let summary: Vec<_> = def.fields.iter().map(|f| (f.name.as_str(), f.type_name.as_str(), f.opaque)).collect();
        assert_eq!(summary, [("someField", "Boolean", false), ("Count", "BigInt", true), ("Kind", "Kind", true)]);
        assert_eq!(def.fields[0].tag, "tagValue");
        assert!(def.fields.iter().all(|f| !f.embedded && f.nested.is_empty()));
    }

    #[test]
    fn one_bad_field_fails_the_aggregate() {
        let scalars = ScalarTable::standard();
        let catalog = Catalog::new();
        let ty = DiscoveredType::new(
            "ErrorHandlingInConvertType",
            vec![
                DiscoveredField::new("ok", int()),
                DiscoveredField::new("invalidField", SourceType::Unsupported("chan bool".into())),
            ],
        );
        let err = Converter::new(&scalars, &catalog).build(&ty).unwrap_err();
        assert_eq!(err, ConvertError::InvalidType("chan bool".into()));
    }

    #[test]
    fn embedded_field_carries_flattened_fields() {
        let scalars = ScalarTable::standard();
        let catalog: Catalog = [
            DiscoveredType::new("Base", vec![DiscoveredField::new("ID", int())]),
            DiscoveredType::new(
                "User",
                vec![
                    DiscoveredField::new("Base", SourceType::NamedAggregate("Base".into())).embedded(),
                    DiscoveredField::new("Name", SourceType::Basic(BasicKind::String)),
                ],
            ),
        ]
        .into_iter()
        .collect();
        let defs = Converter::new(&scalars, &catalog).build_all().unwrap();
        assert_eq!(defs.len(), 2);
        let user = &defs[1];
        assert!(user.fields[0].embedded);
        assert_eq!(user.fields[0].embedded_fields.len(), 1);
        assert_eq!(user.fields[0].embedded_fields[0].name, "ID");
    }

    #[test]
    fn self_embedding_is_reported_not_overflowed() {
        let scalars = ScalarTable::standard();
        let catalog: Catalog = [
            DiscoveredType::new(
                "Node",
                vec![DiscoveredField::new(
                    "Node",
                    SourceType::Pointer(Box::new(SourceType::NamedAggregate("Node".into()))),
                )
                .embedded()],
            ),
        ]
        .into_iter()
        .collect();
        let err = Converter::new(&scalars, &catalog).build_all().unwrap_err();
        assert_eq!(err, ConvertError::CircularType("Node".into()));
    }

    #[test]
    fn indirect_embedding_cycle_is_reported() {
        let scalars = ScalarTable::standard();
        let embed = |name: &str| {
            DiscoveredField::new(name, SourceType::Pointer(Box::new(SourceType::NamedAggregate(name.into())))).embedded()
        };
        let catalog: Catalog = [
            DiscoveredType::new("A", vec![embed("B")]),
            DiscoveredType::new("B", vec![embed("A")]),
        ]
        .into_iter()
        .collect();
        let err = Converter::new(&scalars, &catalog).build_all().unwrap_err();
        assert_eq!(err, ConvertError::CircularType("A".into()));
    }

    #[test]
    fn self_reference_by_name_is_fine() {
        let scalars = ScalarTable::standard();
        let catalog: Catalog = [DiscoveredType::new(
            "Node",
            vec![DiscoveredField::new("Next", SourceType::Pointer(Box::new(SourceType::NamedAggregate("Node".into()))))],
        )]
        .into_iter()
        .collect();
        let defs = Converter::new(&scalars, &catalog).build_all().unwrap();
        assert_eq!(defs[0].fields[0].type_name, "Node");
    }

    #[test]
    fn batch_stops_at_first_failure() {
        let scalars = ScalarTable::standard();
        let catalog: Catalog = [
            DiscoveredType::new("Bad", vec![DiscoveredField::new("F", SourceType::Unsupported("func()".into()))]),
            DiscoveredType::new("Good", vec![DiscoveredField::new("G", int())]),
        ]
        .into_iter()
        .collect();
        assert!(Converter::new(&scalars, &catalog).build_all().is_err());
    }
}
