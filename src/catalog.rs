//! Source-side data model: the aggregates found by discovery and the shapes
//! their fields can take. Read-only once discovery hands it over.
use std::fmt;
use indexmap::IndexMap;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// Go basic kinds, mirroring `go/types.BasicKind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BasicKind {
    Invalid,
    Bool,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Uintptr,
    Float32,
    Float64,
    Complex64,
    Complex128,
    String,
    UnsafePointer,
    UntypedBool,
    UntypedInt,
    UntypedRune,
    UntypedFloat,
    UntypedComplex,
    UntypedString,
    UntypedNil,
}

/// Shape of a field's declared type.
///
/// Named aggregates are kept by name only; their fields live in the
/// [`Catalog`] and are looked up when an embedding needs them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceType {
    Basic(BasicKind),
    /// slices and fixed-size arrays
    Sequence(Box<SourceType>),
    Pointer(Box<SourceType>),
    Map { key: Box<SourceType>, value: Box<SourceType> },
    /// a named type whose underlying type is a struct
    NamedAggregate(String),
    /// a named type over anything but a struct
    NamedScalar(String),
    Interface { empty: bool },
    /// channels, funcs, anonymous structs, type parameters, ...
    Unsupported(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredField {
    pub name: String,
    pub ty: SourceType,
    /// raw tag, backquotes stripped (`json:"id" validate:"required"`)
    pub tag: String,
    pub embedded: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredType {
    pub name: String,
    pub fields: Vec<DiscoveredField>,
}

/// Every aggregate discovered in one run, keyed by name. Iteration order is
/// the conversion (and rendering) order.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    types: IndexMap<String, DiscoveredType>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl BasicKind {
    pub const ALL: [BasicKind; 26] = [
        BasicKind::Invalid,
        BasicKind::Bool,
        BasicKind::Int,
        BasicKind::Int8,
        BasicKind::Int16,
        BasicKind::Int32,
        BasicKind::Int64,
        BasicKind::Uint,
        BasicKind::Uint8,
        BasicKind::Uint16,
        BasicKind::Uint32,
        BasicKind::Uint64,
        BasicKind::Uintptr,
        BasicKind::Float32,
        BasicKind::Float64,
        BasicKind::Complex64,
        BasicKind::Complex128,
        BasicKind::String,
        BasicKind::UnsafePointer,
        BasicKind::UntypedBool,
        BasicKind::UntypedInt,
        BasicKind::UntypedRune,
        BasicKind::UntypedFloat,
        BasicKind::UntypedComplex,
        BasicKind::UntypedString,
        BasicKind::UntypedNil,
    ];

    /// Name as Go's type checker prints it.
    pub fn name(self) -> &'static str {
        match self {
            BasicKind::Invalid => "invalid type",
            BasicKind::Bool => "bool",
            BasicKind::Int => "int",
            BasicKind::Int8 => "int8",
            BasicKind::Int16 => "int16",
            BasicKind::Int32 => "int32",
            BasicKind::Int64 => "int64",
            BasicKind::Uint => "uint",
            BasicKind::Uint8 => "uint8",
            BasicKind::Uint16 => "uint16",
            BasicKind::Uint32 => "uint32",
            BasicKind::Uint64 => "uint64",
            BasicKind::Uintptr => "uintptr",
            BasicKind::Float32 => "float32",
            BasicKind::Float64 => "float64",
            BasicKind::Complex64 => "complex64",
            BasicKind::Complex128 => "complex128",
            BasicKind::String => "string",
            BasicKind::UnsafePointer => "unsafe.Pointer",
            BasicKind::UntypedBool => "untyped bool",
            BasicKind::UntypedInt => "untyped int",
            BasicKind::UntypedRune => "untyped rune",
            BasicKind::UntypedFloat => "untyped float",
            BasicKind::UntypedComplex => "untyped complex",
            BasicKind::UntypedString => "untyped string",
            BasicKind::UntypedNil => "untyped nil",
        }
    }

    pub fn from_name(name: &str) -> Option<BasicKind> {
        BasicKind::ALL.into_iter().find(|k| k.name() == name)
    }

    /// Predeclared Go identifiers that denote a basic kind.
    pub fn from_predeclared(ident: &str) -> Option<BasicKind> {
        let kind = match ident {
            "bool" => BasicKind::Bool,
            "int" => BasicKind::Int,
            "int8" => BasicKind::Int8,
            "int16" => BasicKind::Int16,
            "int32" | "rune" => BasicKind::Int32,
            "int64" => BasicKind::Int64,
            "uint" => BasicKind::Uint,
            "uint8" | "byte" => BasicKind::Uint8,
            "uint16" => BasicKind::Uint16,
            "uint32" => BasicKind::Uint32,
            "uint64" => BasicKind::Uint64,
            "uintptr" => BasicKind::Uintptr,
            "float32" => BasicKind::Float32,
            "float64" => BasicKind::Float64,
            "complex64" => BasicKind::Complex64,
            "complex128" => BasicKind::Complex128,
            "string" => BasicKind::String,
            _ => return None,
        };
        Some(kind)
    }
}

impl fmt::Display for BasicKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceType::Basic(kind) => write!(f, "{kind}"),
            SourceType::Sequence(elem) => write!(f, "[]{elem}"),
            SourceType::Pointer(elem) => write!(f, "*{elem}"),
            SourceType::Map { key, value } => write!(f, "map[{key}]{value}"),
            SourceType::NamedAggregate(name) | SourceType::NamedScalar(name) => f.write_str(name),
            SourceType::Interface { empty: true } => f.write_str("interface{}"),
            SourceType::Interface { empty: false } => f.write_str("interface{...}"),
            SourceType::Unsupported(desc) => f.write_str(desc),
        }
    }
}

impl DiscoveredField {
    pub fn new(name: impl Into<String>, ty: SourceType) -> Self {
        Self { name: name.into(), ty, tag: String::new(), embedded: false }
    }
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }
    pub fn embedded(mut self) -> Self {
        self.embedded = true;
        self
    }
}

impl DiscoveredType {
    pub fn new(name: impl Into<String>, fields: Vec<DiscoveredField>) -> Self {
        Self { name: name.into(), fields }
    }
}

impl Catalog {
    pub fn new() -> Self { Self::default() }

    /// Insert (or replace) an aggregate, keeping its first position.
    pub fn insert(&mut self, ty: DiscoveredType) {
        self.types.insert(ty.name.clone(), ty);
    }
    pub fn get(&self, name: &str) -> Option<&DiscoveredType> {
        self.types.get(name)
    }
    pub fn iter(&self) -> impl Iterator<Item = &DiscoveredType> {
        self.types.values()
    }
    pub fn len(&self) -> usize { self.types.len() }
    pub fn is_empty(&self) -> bool { self.types.is_empty() }

    pub fn sort_by_name(&mut self) {
        self.types.sort_keys();
    }
}

impl FromIterator<DiscoveredType> for Catalog {
    fn from_iter<I: IntoIterator<Item = DiscoveredType>>(iter: I) -> Self {
        let mut catalog = Catalog::new();
        for ty in iter {
            catalog.insert(ty);
        }
        catalog
    }
}

// ------------------------------- Tests ------------------------------------ //
