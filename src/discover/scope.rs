//! Package-level names of one Go file and type-expression resolution.
//!
//! This stands in for the Go type checker: just enough to tell structs from
//! other named types and to reject undefined names.
use std::collections::HashMap;

use indexmap::IndexMap;
use tree_sitter::Node;

use crate::catalog::{BasicKind, SourceType};
use super::{node_text, DiscoverError};

/// Imported struct types we know to be structs without loading the package.
const KNOWN_STRUCTS: &[(&str, &str)] = &[
    ("time", "Time"),
    ("time", "Location"),
    ("time", "Timer"),
    ("time", "Ticker"),
    ("net/url", "URL"),
    ("net/url", "Userinfo"),
    ("net/http", "Request"),
    ("net/http", "Response"),
    ("net/http", "Client"),
    ("math/big", "Int"),
    ("math/big", "Float"),
    ("math/big", "Rat"),
    ("sync", "Mutex"),
    ("sync", "RWMutex"),
    ("sync", "WaitGroup"),
    ("sync", "Once"),
    ("bytes", "Buffer"),
    ("strings", "Builder"),
    ("regexp", "Regexp"),
    ("os", "File"),
    ("database/sql", "NullString"),
    ("database/sql", "NullInt64"),
    ("database/sql", "NullInt32"),
    ("database/sql", "NullBool"),
    ("database/sql", "NullFloat64"),
    ("database/sql", "NullTime"),
];

pub(super) struct Decl<'a> {
    pub ty: Node<'a>,
    pub params: Vec<String>,
    pub alias: bool,
}

/// Struct body a declared name ends up at, with the type parameters in
/// effect for its fields.
pub(super) struct StructBody<'a> {
    pub node: Node<'a>,
    pub params: Vec<String>,
}

pub(super) struct Scope<'a> {
    source: &'a str,
    imports: HashMap<String, String>,
    dot_import: bool,
    pub decls: IndexMap<String, Decl<'a>>,
}

impl<'a> Scope<'a> {
    pub fn collect(source: &'a str, root: Node<'a>) -> Result<Self, DiscoverError> {
        let mut scope = Scope { source, imports: HashMap::new(), dot_import: false, decls: IndexMap::new() };
        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            match child.kind() {
                "import_declaration" => scope.collect_imports(child),
                "type_declaration" => scope.collect_types(child)?,
                _ => {}
            }
        }
        Ok(scope)
    }

    /// Resolve every declared type once so undefined names fail the file
    /// even when no struct field reaches them.
    pub fn check(&self) -> Result<(), DiscoverError> {
        for (name, decl) in &self.decls {
            if strip_parens(decl.ty).kind() == "struct_type" {
                continue;
            }
            self.resolve(decl.ty, &decl.params)?;
            tracing::trace!(type_name = %name, "declaration checked");
        }
        Ok(())
    }

    fn text(&self, node: Node<'a>) -> &'a str {
        node_text(self.source, node)
    }

    fn collect_imports(&mut self, decl: Node<'a>) {
        let mut specs = Vec::new();
        let mut cursor = decl.walk();
        for child in decl.named_children(&mut cursor) {
            match child.kind() {
                "import_spec" => specs.push(child),
                "import_spec_list" => {
                    let mut inner = child.walk();
                    specs.extend(child.named_children(&mut inner).filter(|n| n.kind() == "import_spec"));
                }
                _ => {}
            }
        }

        for spec in specs {
            let Some(path) = spec.child_by_field_name("path") else { continue };
            let path = self.text(path).trim_matches(|c| c == '"' || c == '`').to_string();
            match spec.child_by_field_name("name") {
                Some(name) if name.kind() == "dot" => self.dot_import = true,
                Some(name) if name.kind() == "blank_identifier" => {}
                Some(name) => {
                    let name = self.text(name).to_string();
                    self.imports.insert(name, path);
                }
                None => {
                    self.imports.insert(default_package_name(&path).to_string(), path);
                }
            }
        }
    }

    fn collect_types(&mut self, decl: Node<'a>) -> Result<(), DiscoverError> {
        let mut cursor = decl.walk();
        for spec in decl.named_children(&mut cursor) {
            let alias = match spec.kind() {
                "type_spec" => false,
                "type_alias" => true,
                _ => continue,
            };
            let (Some(name), Some(ty)) = (spec.child_by_field_name("name"), spec.child_by_field_name("type")) else {
                continue;
            };
            let name = self.text(name).to_string();
            if name == "_" {
                continue;
            }
            let params = spec
                .child_by_field_name("type_parameters")
                .map(|list| self.type_params(list))
                .unwrap_or_default();
            if self.decls.contains_key(&name) {
                return Err(DiscoverError::TypeCheck(format!("{name} redeclared in this block")));
            }
            self.decls.insert(name, Decl { ty, params, alias });
        }
        Ok(())
    }

    fn type_params(&self, list: Node<'a>) -> Vec<String> {
        let mut out = Vec::new();
        let mut cursor = list.walk();
        for param in list.named_children(&mut cursor) {
            let mut inner = param.walk();
            out.extend(param.children_by_field_name("name", &mut inner).map(|n| self.text(n).to_string()));
        }
        out
    }

    /// Follow a declared name to the struct it denotes, if any.
    pub fn struct_body(&self, name: &str) -> Result<Option<StructBody<'a>>, DiscoverError> {
        self.struct_body_in(name, &mut Vec::new())
    }

    fn struct_body_in(&self, name: &str, visiting: &mut Vec<String>) -> Result<Option<StructBody<'a>>, DiscoverError> {
        let Some(decl) = self.decls.get(name) else { return Ok(None) };
        if visiting.iter().any(|n| n == name) {
            return Err(DiscoverError::TypeCheck(format!("invalid recursive type {name}")));
        }
        visiting.push(name.to_string());
        let ty = strip_parens(decl.ty);
        let out = match ty.kind() {
            "struct_type" => Some(StructBody { node: ty, params: decl.params.clone() }),
            "type_identifier" => self.struct_body_in(self.text(ty), visiting)?,
            "generic_type" => match ty.child_by_field_name("type") {
                Some(base) if base.kind() == "type_identifier" => self.struct_body_in(self.text(base), visiting)?,
                _ => None,
            },
            _ => None,
        };
        visiting.pop();
        Ok(out)
    }

    /// Resolve a type expression. `params` are the type parameters in scope.
    pub fn resolve(&self, node: Node<'a>, params: &[String]) -> Result<SourceType, DiscoverError> {
        self.resolve_in(node, params, &mut Vec::new())
    }

    fn resolve_in(&self, node: Node<'a>, params: &[String], aliases: &mut Vec<String>) -> Result<SourceType, DiscoverError> {
        let ty = match node.kind() {
            "type_identifier" => return self.resolve_name(self.text(node), params, aliases),
            "qualified_type" => return self.resolve_qualified(node),
            "generic_type" => match node.child_by_field_name("type") {
                // instantiation refers to the generic type by name
                Some(base) => return self.resolve_in(base, &[], aliases),
                None => SourceType::Unsupported(describe(self.text(node))),
            },
            "parenthesized_type" => match node.named_child(0) {
                Some(inner) => return self.resolve_in(inner, params, aliases),
                None => SourceType::Unsupported(describe(self.text(node))),
            },
            "pointer_type" => SourceType::Pointer(Box::new(self.resolve_child(node, None, params, aliases)?)),
            "slice_type" | "array_type" => {
                SourceType::Sequence(Box::new(self.resolve_child(node, Some("element"), params, aliases)?))
            }
            "map_type" => SourceType::Map {
                key: Box::new(self.resolve_child(node, Some("key"), params, aliases)?),
                value: Box::new(self.resolve_child(node, Some("value"), params, aliases)?),
            },
            "interface_type" => {
                let mut cursor = node.walk();
                let empty = node.named_children(&mut cursor).all(|n| n.kind() == "comment");
                SourceType::Interface { empty }
            }
            _ => SourceType::Unsupported(describe(self.text(node))),
        };
        Ok(ty)
    }

    fn resolve_child(
        &self,
        node: Node<'a>,
        field: Option<&str>,
        params: &[String],
        aliases: &mut Vec<String>,
    ) -> Result<SourceType, DiscoverError> {
        let child = match field {
            Some(field) => node.child_by_field_name(field),
            None => node.named_child(0),
        };
        let child = child.ok_or_else(|| DiscoverError::Parse(format!("incomplete type `{}`", self.text(node))))?;
        self.resolve_in(child, params, aliases)
    }

    fn resolve_name(&self, name: &str, params: &[String], aliases: &mut Vec<String>) -> Result<SourceType, DiscoverError> {
        if params.iter().any(|p| p == name) {
            return Ok(SourceType::Unsupported(name.to_string()));
        }
        if let Some(decl) = self.decls.get(name) {
            if decl.alias {
                if aliases.iter().any(|a| a == name) {
                    return Err(DiscoverError::TypeCheck(format!("invalid recursive type alias {name}")));
                }
                aliases.push(name.to_string());
                let out = self.resolve_in(decl.ty, &decl.params, aliases);
                aliases.pop();
                return out;
            }
            return Ok(if self.struct_body(name)?.is_some() {
                SourceType::NamedAggregate(name.to_string())
            } else {
                SourceType::NamedScalar(name.to_string())
            });
        }
        if let Some(kind) = BasicKind::from_predeclared(name) {
            return Ok(SourceType::Basic(kind));
        }
        match name {
            "any" => Ok(SourceType::Interface { empty: true }),
            "error" => Ok(SourceType::NamedScalar("error".to_string())),
            "comparable" => Err(DiscoverError::TypeCheck(
                "cannot use type comparable outside a type constraint".to_string(),
            )),
            // may come from a dot import; nothing more is known about it
            _ if self.dot_import => Ok(SourceType::NamedScalar(name.to_string())),
            _ => Err(DiscoverError::TypeCheck(format!("undefined: {name}"))),
        }
    }

    fn resolve_qualified(&self, node: Node<'a>) -> Result<SourceType, DiscoverError> {
        let (Some(package), Some(name)) = (node.child_by_field_name("package"), node.child_by_field_name("name")) else {
            return Ok(SourceType::Unsupported(describe(self.text(node))));
        };
        let (package, name) = (self.text(package), self.text(name));
        let path = self
            .imports
            .get(package)
            .ok_or_else(|| DiscoverError::TypeCheck(format!("undefined: {package}")))?;

        if path == "unsafe" && name == "Pointer" {
            return Ok(SourceType::Basic(BasicKind::UnsafePointer));
        }
        if KNOWN_STRUCTS.iter().any(|&(p, n)| p == path && n == name) {
            Ok(SourceType::NamedAggregate(name.to_string()))
        } else {
            tracing::debug!(package = %path, name, "imported type treated as a named scalar");
            Ok(SourceType::NamedScalar(name.to_string()))
        }
    }
}

fn strip_parens(mut node: Node<'_>) -> Node<'_> {
    while node.kind() == "parenthesized_type" {
        match node.named_child(0) {
            Some(inner) => node = inner,
            None => break,
        }
    }
    node
}

/// `chan  bool` → `chan bool`
fn describe(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Package name an import path binds without an explicit name:
/// `github.com/go-playground/validator/v10` → `validator`, `gopkg.in/yaml.v3` → `yaml`.
pub(super) fn default_package_name(path: &str) -> &str {
    let mut segments = path.rsplit('/');
    let mut last = segments.next().unwrap_or(path);
    let is_major = |s: &str| s.len() > 1 && s.starts_with('v') && s[1..].bytes().all(|b| b.is_ascii_digit());
    if is_major(last) {
        last = segments.next().unwrap_or(last);
    }
    if let Some((base, version)) = last.rsplit_once('.') {
        if is_major(version) {
            last = base;
        }
    }
    last
}
