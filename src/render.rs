//! GraphQL SDL rendering of a converted type forest.
//!
//! Layout:
//! ```text
//! scalar BigInt
//!
//! type Article {
//!   id: Int!
//!   tags: [String]
//! }
//!
//! ```
//! Auxiliary types follow the block of the type that introduced them.
use std::collections::HashSet;
use std::str::FromStr;

use indexmap::IndexSet;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::ir::{FieldDefinition, TypeDefinition};
use crate::tags::{StructTags, TagError};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// Conventional tag used by `use_json_tags`.
pub const JSON_TAG: &str = "json";
/// Tag value that drops a field when json tags are in use.
pub const JSON_SKIP: &str = "-";
pub const REQUIRED_MARK: &str = "!";

static GRAPHQL_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[_A-Za-z][_0-9A-Za-z]*$").expect("valid regex"));

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// rename fields after their `json` tag
    pub use_json_tags: bool,
    /// rename fields after this tag; wins over `use_json_tags`
    pub custom_tag: Option<String>,
    /// drop fields whose resolved name equals this; see [`RenderOptions::ignore_value`]
    pub ignore_value: Option<String>,
    /// mark `Type!` when the field's tag at `key` equals `value`
    pub require: Option<RequireTag>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequireTag {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("field `{field}`: {source}")]
    Tag {
        field: String,
        #[source]
        source: TagError,
    },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid format for required-tags, expected key=value (got `{0}`)")]
pub struct RequireTagFormatError(pub String);

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl RenderOptions {
    /// Tag that renames fields, if any.
    pub fn tag_to_use(&self) -> Option<&str> {
        match &self.custom_tag {
            Some(tag) if !tag.is_empty() => Some(tag.as_str()),
            _ if self.use_json_tags => Some(JSON_TAG),
            _ => None,
        }
    }

    /// Explicit value, else `-` with json tags, else empty (never matches a
    /// resolved name).
    pub fn ignore_value(&self) -> &str {
        match &self.ignore_value {
            Some(v) => v,
            None if self.use_json_tags => JSON_SKIP,
            None => "",
        }
    }
}

impl FromStr for RequireTag {
    type Err = RequireTagFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('=') {
            Some((key, value)) if !key.is_empty() && !value.is_empty() => Ok(Self {
                key: key.to_string(),
                value: value.to_string(),
            }),
            _ => Err(RequireTagFormatError(s.to_string())),
        }
    }
}

pub fn render(defs: &[TypeDefinition], opts: &RenderOptions) -> Result<String, RenderError> {
    let mut out = String::new();

    let mut scalars = IndexSet::new();
    collect_scalars(defs, &mut scalars);
    for scalar in &scalars {
        out.push_str(&format!("scalar {scalar}\n"));
    }
    out.push('\n');

    let mut renderer = Renderer {
        tag: opts.tag_to_use(),
        ignore: opts.ignore_value(),
        require: opts.require.as_ref(),
        seen: HashSet::new(),
        out,
    };
    renderer.types(defs)?;
    Ok(renderer.out)
}

/// `[[BigInt]]` → `BigInt`
fn scalar_name(type_name: &str) -> &str {
    type_name.trim_start_matches('[').trim_end_matches(']')
}

fn collect_scalars<'a>(defs: &'a [TypeDefinition], set: &mut IndexSet<&'a str>) {
    for def in defs {
        collect_field_scalars(&def.fields, set);
    }
}

fn collect_field_scalars<'a>(fields: &'a [FieldDefinition], set: &mut IndexSet<&'a str>) {
    for field in fields {
        if field.opaque {
            set.insert(scalar_name(&field.type_name));
        }
        collect_scalars(&field.nested, set);
        collect_field_scalars(&field.embedded_fields, set);
    }
}

/// Auxiliary types of a field, including those of flattened embedded fields.
fn nested_types<'a>(field: &'a FieldDefinition, acc: &mut Vec<&'a TypeDefinition>) {
    acc.extend(field.nested.iter());
    for inner in &field.embedded_fields {
        nested_types(inner, acc);
    }
}

struct Renderer<'a> {
    tag: Option<&'a str>,
    ignore: &'a str,
    require: Option<&'a RequireTag>,
    seen: HashSet<String>,
    out: String,
}

impl<'a> Renderer<'a> {
    fn types<'d>(&mut self, defs: impl IntoIterator<Item = &'d TypeDefinition>) -> Result<(), RenderError> {
        for def in defs {
            if !self.seen.insert(def.name.clone()) {
                tracing::warn!(type_name = %def.name, "type rendered more than once");
            }
            self.out.push_str(&format!("type {} {{\n", def.name));
            for field in &def.fields {
                self.field(field)?;
            }
            self.out.push_str("}\n\n");

            let mut nested = Vec::new();
            for field in &def.fields {
                nested_types(field, &mut nested);
            }
            self.types(nested)?;
        }
        Ok(())
    }

    fn field(&mut self, field: &FieldDefinition) -> Result<(), RenderError> {
        let tags = StructTags::parse(&field.tag).map_err(|source| RenderError::Tag {
            field: field.name.clone(),
            source,
        })?;

        let name = self.output_name(field, &tags);
        if name == self.ignore {
            tracing::debug!(field = %field.name, "ignored by tag");
            return Ok(());
        }

        if field.embedded {
            for inner in &field.embedded_fields {
                self.field(inner)?;
            }
            return Ok(());
        }

        if !GRAPHQL_NAME.is_match(name) {
            tracing::warn!(field = %field.name, output = name, "not a valid GraphQL field name");
        }
        let mark = if self.is_required(&tags) { REQUIRED_MARK } else { "" };
        self.out.push_str(&format!("  {}: {}{}\n", name, field.type_name, mark));
        Ok(())
    }

    fn output_name<'f>(&self, field: &'f FieldDefinition, tags: &'f StructTags) -> &'f str {
        self.tag
            .and_then(|key| tags.get(key))
            .map(|tag| tag.name.as_str())
            .filter(|name| !name.is_empty())
            .unwrap_or(&field.name)
    }

    fn is_required(&self, tags: &StructTags) -> bool {
        self.require
            .and_then(|req| tags.get(&req.key).map(|tag| tag.name == req.value))
            .unwrap_or(false)
    }
}

// ------------------------------- Tests ------------------------------------ //
