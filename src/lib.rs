//! Go struct declarations → GraphQL SDL.
//!
//! Pipeline: [`discover`] parses a Go file into a [`catalog::Catalog`],
//! [`convert`] turns each struct into a [`ir::TypeDefinition`] tree, and
//! [`render`] prints the forest as schema text.
pub mod catalog;
pub mod cli;
pub mod config;
pub mod convert;
pub mod discover;
pub mod ir;
pub mod logging;
pub mod render;
pub mod scalars;
pub mod tags;

use std::path::Path;

use thiserror::Error;

use convert::{ConvertError, Converter};
use discover::DiscoverError;
use render::{RenderError, RenderOptions};
use scalars::ScalarTable;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Discover(#[from] DiscoverError),
    #[error(transparent)]
    Convert(#[from] ConvertError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Whole pipeline over one Go file.
pub fn generate(path: impl AsRef<Path>, scalars: &ScalarTable, opts: &RenderOptions) -> Result<String, Error> {
    let catalog = discover::discover_file(path)?;
    generate_catalog(&catalog, scalars, opts)
}

/// Whole pipeline over Go source text.
pub fn generate_source(source: &str, scalars: &ScalarTable, opts: &RenderOptions) -> Result<String, Error> {
    let catalog = discover::discover_source(source)?;
    generate_catalog(&catalog, scalars, opts)
}

fn generate_catalog(catalog: &catalog::Catalog, scalars: &ScalarTable, opts: &RenderOptions) -> Result<String, Error> {
    let defs = Converter::new(scalars, catalog).build_all()?;
    Ok(render::render(&defs, opts)?)
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RequireTag;

    fn plain(source: &str) -> Result<String, Error> {
        generate_source(source, &ScalarTable::standard(), &RenderOptions::default())
    }

    #[test]
    fn person() {
        let schema = plain("package p\n\ntype Person struct {\n\tName string `json:\"name\"`\n\tAge int\n}\n").unwrap();
        assert_eq!(schema, "\ntype Person {\n  Name: String\n  Age: Int\n}\n\n");
    }

    #[test]
    fn map_field_gets_its_own_type() {
        let schema = plain("package p\n\ntype T struct {\n\tTags map[string]int\n}\n").unwrap();
        assert_eq!(
            schema,
            "\ntype T {\n  Tags: TagsMap\n}\n\ntype TagsMap {\n  key: String\n  values: Int\n}\n\n"
        );
    }

    #[test]
    fn opaque_kinds_are_declared_once() {
        let schema = plain("package p\n\ntype T struct {\n\tA uint64\n\tB []uint64\n\tC complex128\n}\n").unwrap();
        assert_eq!(
            schema,
            "scalar BigInt\nscalar ComplexNumber\n\ntype T {\n  A: BigInt\n  B: [BigInt]\n  C: ComplexNumber\n}\n\n"
        );
    }

    #[test]
    fn no_structs() {
        assert!(matches!(plain("package testdata"), Err(Error::Discover(DiscoverError::NoStructs))));
    }

    #[test]
    fn unsupported_field_type() {
        let err = plain("package p\n\ntype T struct {\n\tC chan int\n}\n").unwrap_err();
        assert_eq!(err.to_string(), "invalid type: chan int");
    }

    #[test]
    fn generation_is_repeatable() {
        let src = "package p\n\ntype A struct {\n\tX uint\n\tM map[string]B\n}\n\ntype B struct {\n\tY int8\n}\n";
        assert_eq!(plain(src).unwrap(), plain(src).unwrap());
    }

    #[test]
    fn cms_with_json_tags_and_required() {
        let src = r#"package cms

type Metadata struct {
	CreatedAt string `json:"created_at"`
	CachedAt  string `json:"-"`
}

type User struct {
	ID int `json:"id" validate:"required"`
	Metadata
}
"#;
        let opts = RenderOptions {
            use_json_tags: true,
            require: Some(RequireTag { key: "validate".into(), value: "required".into() }),
            ..RenderOptions::default()
        };
        let schema = generate_source(src, &ScalarTable::standard(), &opts).unwrap();
        assert_eq!(
            schema,
            "\ntype Metadata {\n  created_at: String\n}\n\ntype User {\n  id: Int!\n  created_at: String\n}\n\n"
        );
    }

    #[test]
    fn from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("person.go");
        std::fs::write(&path, "package p\n\ntype Person struct {\n\tName string\n}\n").unwrap();
        let schema = generate(&path, &ScalarTable::standard(), &RenderOptions::default()).unwrap();
        assert_eq!(schema, "\ntype Person {\n  Name: String\n}\n\n");
        assert!(matches!(
            generate(dir.path().join("nope.go"), &ScalarTable::standard(), &RenderOptions::default()),
            Err(Error::Discover(DiscoverError::Read { .. }))
        ));
    }
}
