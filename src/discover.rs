//! Go source file → [`Catalog`] of its package-level struct declarations.
//!
//! Parsing is tree-sitter's Go grammar; name resolution is [`scope`]. The
//! result matches what the Go type checker would list: every named type whose
//! underlying type is a struct, sorted by name.
mod scope;

use std::path::{Path, PathBuf};

use thiserror::Error;
use tree_sitter::{Node, Parser, Tree};

use crate::catalog::{Catalog, DiscoveredField, DiscoveredType, SourceType};
use scope::{Scope, StructBody};

#[derive(Debug, Error)]
pub enum DiscoverError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse the file, error was: {0}")]
    Parse(String),
    #[error("failed to type check the file, error was: {0}")]
    TypeCheck(String),
    #[error("no structs found")]
    NoStructs,
    #[error("tree-sitter init: {0}")]
    Grammar(String),
}

pub fn discover_file(path: impl AsRef<Path>) -> Result<Catalog, DiscoverError> {
    let path = path.as_ref();
    tracing::info!(file = %path.display(), "finding structs");
    let source = std::fs::read_to_string(path).map_err(|source| DiscoverError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    discover_source(&source)
}

pub fn discover_source(source: &str) -> Result<Catalog, DiscoverError> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_go::LANGUAGE.into())
        .map_err(|e| DiscoverError::Grammar(e.to_string()))?;
    let tree = parser
        .parse(source, None)
        .ok_or_else(|| DiscoverError::Parse("parser returned no tree".into()))?;

    check_syntax(source, &tree)?;
    let scope = Scope::collect(source, tree.root_node())?;
    scope.check()?;
    let ctx = ExtractContext { source, scope: &scope };

    let mut catalog = Catalog::new();
    for name in scope.decls.keys() {
        if let Some(body) = scope.struct_body(name)? {
            let fields = ctx.extract_fields(&body)?;
            tracing::debug!(aggregate = %name, fields = fields.len(), "struct found");
            catalog.insert(DiscoveredType::new(name.clone(), fields));
        }
    }
    if catalog.is_empty() {
        return Err(DiscoverError::NoStructs);
    }
    catalog.sort_by_name();
    Ok(catalog)
}

pub(crate) fn node_text<'a>(source: &'a str, node: Node<'_>) -> &'a str {
    node.utf8_text(source.as_bytes()).unwrap_or("")
}

fn check_syntax(source: &str, tree: &Tree) -> Result<(), DiscoverError> {
    let root = tree.root_node();
    if let Some(bad) = first_error(root) {
        let at = bad.start_position();
        let what = if bad.is_missing() {
            format!("missing {}", bad.kind())
        } else {
            format!("unexpected `{}`", node_text(source, bad).lines().next().unwrap_or(""))
        };
        return Err(DiscoverError::Parse(format!("{}:{}: {what}", at.row + 1, at.column + 1)));
    }
    let mut cursor = root.walk();
    if !root.named_children(&mut cursor).any(|n| n.kind() == "package_clause") {
        return Err(DiscoverError::Parse("1:1: expected 'package'".into()));
    }
    Ok(())
}

fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<_> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error)
}

struct ExtractContext<'s, 'a> {
    source: &'a str,
    scope: &'s Scope<'a>,
}

impl<'a> ExtractContext<'_, 'a> {
    fn extract_fields(&self, body: &StructBody<'a>) -> Result<Vec<DiscoveredField>, DiscoverError> {
        let mut fields = Vec::new();
        let mut cursor = body.node.walk();
        let Some(list) = body.node.named_children(&mut cursor).find(|n| n.kind() == "field_declaration_list") else {
            return Ok(fields);
        };

        let mut cursor = list.walk();
        for decl in list.named_children(&mut cursor) {
            if decl.kind() != "field_declaration" {
                continue;
            }
            let ty_node = decl
                .child_by_field_name("type")
                .ok_or_else(|| DiscoverError::Parse("field without a type".into()))?;
            let tag = match decl.child_by_field_name("tag") {
                Some(tag) => self.string_literal(tag)?,
                None => String::new(),
            };

            let mut names_cursor = decl.walk();
            let names: Vec<_> = decl
                .children_by_field_name("name", &mut names_cursor)
                .map(|n| node_text(self.source, n).to_string())
                .collect();

            if names.is_empty() {
                fields.push(self.embedded_field(decl, ty_node, tag, &body.params)?);
                continue;
            }
            let ty = self.scope.resolve(ty_node, &body.params)?;
            for name in names {
                fields.push(DiscoveredField { name, ty: ty.clone(), tag: tag.clone(), embedded: false });
            }
        }
        Ok(fields)
    }

    /// `Base`, `*Base`, `pkg.Base`: the field is named after the type.
    fn embedded_field(
        &self,
        decl: Node<'a>,
        ty_node: Node<'a>,
        tag: String,
        params: &[String],
    ) -> Result<DiscoveredField, DiscoverError> {
        let mut cursor = decl.walk();
        let starred = decl.children(&mut cursor).any(|n| n.kind() == "*");
        let resolved = self.scope.resolve(ty_node, params)?;
        let ty = if starred { SourceType::Pointer(Box::new(resolved)) } else { resolved };
        Ok(DiscoveredField { name: self.embedded_name(ty_node), ty, tag, embedded: true })
    }

    fn embedded_name(&self, node: Node<'a>) -> String {
        let named = match node.kind() {
            "qualified_type" => node.child_by_field_name("name"),
            "generic_type" => node.child_by_field_name("type"),
            "pointer_type" => node.named_child(0),
            _ => None,
        };
        match named {
            Some(inner) => self.embedded_name(inner),
            None => node_text(self.source, node).to_string(),
        }
    }

    /// Raw `` `...` `` or interpreted `"..."` literal → its value.
    fn string_literal(&self, node: Node<'a>) -> Result<String, DiscoverError> {
        let text = node_text(self.source, node);
        if let Some(raw) = text.strip_prefix('`').and_then(|t| t.strip_suffix('`')) {
            return Ok(raw.replace('\r', ""));
        }
        let body = text
            .strip_prefix('"')
            .and_then(|t| t.strip_suffix('"'))
            .ok_or_else(|| DiscoverError::Parse(format!("malformed tag literal {text}")))?;
        crate::tags::unquote(body).map_err(|_| DiscoverError::Parse(format!("invalid escape in tag {text}")))
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::BasicKind;

    fn field<'c>(catalog: &'c Catalog, ty: &str, field: &str) -> &'c DiscoveredField {
        catalog.get(ty).unwrap().fields.iter().find(|f| f.name == field).unwrap()
    }

    const CMS: &str = r#"package examples

import (
	"fmt"
	"time"
)

type Another struct{}

func (a *Another) DoSomething() {
	fmt.Println("Another doing something")
}

// Metadata provides common metadata fields for various entities.
type Metadata struct {
	CreatedAt time.Time `json:"created_at"`
	UpdatedAt time.Time `json:"updated_at"`
	CachedAt  time.Time `json:"-"`
}

type User struct {
	ID       int    `json:"id"`
	Username string `json:"username"`
	Verified bool   `json:"verified"`
	Metadata
}

type Article struct {
	ID          int                                   `json:"id" validate:"required"`
	Author      *User                                 `json:"author"`
	Tags        []string                              `json:"tags"`
	Status      PublicationStatus                     `json:"status"`
	Errors      error                                 `json:"error"`
	Anything    interface{}                           `json:"anything"`
	DoSomething map[string]interface{ DoSomething() } `json:"do_something"`
	RandomInt   uint64                                `json:"random_int"`
	Grid        [4][4]float32
	A, B        byte
}

type PublicationStatus string
"#;

    #[test]
    fn finds_structs_sorted_by_name() {
        let catalog = discover_source(CMS).unwrap();
        let names: Vec<_> = catalog.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["Another", "Article", "Metadata", "User"]);
        assert!(catalog.get("Another").unwrap().fields.is_empty());
    }

    #[test]
    fn resolves_field_shapes() {
        let catalog = discover_source(CMS).unwrap();
        assert_eq!(field(&catalog, "Article", "ID").ty, SourceType::Basic(BasicKind::Int));
        assert_eq!(field(&catalog, "Article", "ID").tag, r#"json:"id" validate:"required""#);
        assert_eq!(
            field(&catalog, "Article", "Author").ty,
            SourceType::Pointer(Box::new(SourceType::NamedAggregate("User".into())))
        );
        assert_eq!(
            field(&catalog, "Article", "Tags").ty,
            SourceType::Sequence(Box::new(SourceType::Basic(BasicKind::String)))
        );
        assert_eq!(field(&catalog, "Article", "Status").ty, SourceType::NamedScalar("PublicationStatus".into()));
        assert_eq!(field(&catalog, "Article", "Errors").ty, SourceType::NamedScalar("error".into()));
        assert_eq!(field(&catalog, "Article", "Anything").ty, SourceType::Interface { empty: true });
        assert_eq!(
            field(&catalog, "Article", "DoSomething").ty,
            SourceType::Map {
                key: Box::new(SourceType::Basic(BasicKind::String)),
                value: Box::new(SourceType::Interface { empty: false }),
            }
        );
        assert_eq!(field(&catalog, "Article", "RandomInt").ty, SourceType::Basic(BasicKind::Uint64));
        assert_eq!(
            field(&catalog, "Article", "Grid").ty,
            SourceType::Sequence(Box::new(SourceType::Sequence(Box::new(SourceType::Basic(BasicKind::Float32)))))
        );
        assert_eq!(field(&catalog, "Article", "B").ty, SourceType::Basic(BasicKind::Uint8));
        assert_eq!(field(&catalog, "Metadata", "CreatedAt").ty, SourceType::NamedAggregate("Time".into()));
    }

    #[test]
    fn embedded_fields_are_named_after_their_type() {
        let catalog = discover_source(CMS).unwrap();
        let meta = field(&catalog, "User", "Metadata");
        assert!(meta.embedded);
        assert_eq!(meta.ty, SourceType::NamedAggregate("Metadata".into()));
        assert!(!field(&catalog, "User", "ID").embedded);
    }

    #[test]
    fn embedded_pointers_and_qualified_types() {
        let src = "package p\n\nimport \"sync\"\n\ntype Base struct{ ID int }\n\ntype T struct {\n\t*Base\n\tsync.Mutex\n}\n";
        let catalog = discover_source(src).unwrap();
        let base = field(&catalog, "T", "Base");
        assert!(base.embedded);
        assert_eq!(base.ty, SourceType::Pointer(Box::new(SourceType::NamedAggregate("Base".into()))));
        let mutex = field(&catalog, "T", "Mutex");
        assert!(mutex.embedded);
        assert_eq!(mutex.ty, SourceType::NamedAggregate("Mutex".into()));
    }

    #[test]
    fn aliases_and_defined_types() {
        let src = r#"package p

type Base struct{ ID int }
type Alias = Base
type Defined Base
type Names []string
type Ref struct {
	A Alias
	D Defined
	N Names
}
"#;
        let catalog = discover_source(src).unwrap();
        let names: Vec<_> = catalog.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["Alias", "Base", "Defined", "Ref"]);
        assert_eq!(field(&catalog, "Ref", "A").ty, SourceType::NamedAggregate("Base".into()));
        assert_eq!(field(&catalog, "Ref", "D").ty, SourceType::NamedAggregate("Defined".into()));
        assert_eq!(field(&catalog, "Ref", "N").ty, SourceType::NamedScalar("Names".into()));
        assert_eq!(catalog.get("Defined").unwrap().fields[0].name, "ID");
    }

    #[test]
    fn unsupported_shapes_survive_discovery() {
        let src = "package p\n\ntype T struct {\n\tC chan bool\n\tF func() error\n\tS struct{ X int }\n}\n";
        let catalog = discover_source(src).unwrap();
        assert_eq!(field(&catalog, "T", "C").ty, SourceType::Unsupported("chan bool".into()));
        assert!(matches!(field(&catalog, "T", "F").ty, SourceType::Unsupported(_)));
        assert!(matches!(field(&catalog, "T", "S").ty, SourceType::Unsupported(_)));
    }

    #[test]
    fn type_parameters_are_unsupported() {
        let src = "package p\n\ntype Box[T any] struct {\n\tValue T\n}\n";
        let catalog = discover_source(src).unwrap();
        assert_eq!(field(&catalog, "Box", "Value").ty, SourceType::Unsupported("T".into()));
    }

    #[test]
    fn interpreted_tag_literals() {
        let src = "package p\n\ntype T struct {\n\tA int \"json:\\\"a\\\"\"\n}\n";
        let catalog = discover_source(src).unwrap();
        assert_eq!(field(&catalog, "T", "A").tag, r#"json:"a""#);
    }

    #[test]
    fn no_structs() {
        assert!(matches!(discover_source("package testdata"), Err(DiscoverError::NoStructs)));
        assert!(matches!(discover_source("package p\n\ntype S string\n"), Err(DiscoverError::NoStructs)));
    }

    #[test]
    fn syntax_errors() {
        assert!(matches!(discover_source("package p\n\ntype T struct {"), Err(DiscoverError::Parse(_))));
        assert!(matches!(discover_source("type T struct{}\n"), Err(DiscoverError::Parse(_))));
    }

    #[test]
    fn type_check_errors() {
        let undefined = discover_source("package p\n\ntype T struct{ X Missing }\n").unwrap_err();
        assert_eq!(undefined.to_string(), "failed to type check the file, error was: undefined: Missing");

        let no_import = discover_source("package p\n\ntype T struct{ At time.Time }\n").unwrap_err();
        assert!(matches!(no_import, DiscoverError::TypeCheck(_)));

        let twice = discover_source("package p\n\ntype T struct{}\ntype T struct{}\n").unwrap_err();
        assert!(matches!(twice, DiscoverError::TypeCheck(_)));

        let cycle = discover_source("package p\n\ntype A B\ntype B A\ntype T struct{ X A }\n").unwrap_err();
        assert!(matches!(cycle, DiscoverError::TypeCheck(_)));

        let behind_named = discover_source("package p\n\ntype S Missing\n\ntype T struct{ X S }\n").unwrap_err();
        assert_eq!(behind_named.to_string(), "failed to type check the file, error was: undefined: Missing");

        let unused = discover_source("package p\n\ntype L []Missing\n\ntype T struct{ X int }\n").unwrap_err();
        assert!(matches!(unused, DiscoverError::TypeCheck(ref msg) if msg == "undefined: Missing"));
    }

    #[test]
    fn reads_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("structs.go");
        std::fs::write(&path, "package testdata\n\n type TestStruct struct{}").unwrap();
        assert_eq!(discover_file(&path).unwrap().len(), 1);

        let missing = discover_file(dir.path().join("invalid/path.go")).unwrap_err();
        assert!(matches!(missing, DiscoverError::Read { .. }));
    }
}
