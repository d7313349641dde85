//! Abstract code-shapes for types.
//!
//! A [`TypeShape`] is what emitters render. Its `Display` form is also the
//! canonical structural encoding: contracts are deduplicated, sorted and
//! fingerprinted by it. Parameter names never appear in the canonical form.

use std::collections::BTreeSet;
use std::fmt::{self, Write as _};

use serde::Serialize;

use crate::ir::ChanDir;

/// How a signature's trailing parameter spreads its arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Spread {
    #[default]
    None,
    /// `...T`: the packed parameter is a slice of `T`.
    Slice,
    /// `string...`: a string spread as its bytes.
    String,
}

/// A shape for a type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeShape {
    Primitive { name: String },
    /// A named type, qualified by its defining module when it has one.
    Qualified { module: Option<String>, name: String },
    /// A type declared in the generated output.
    Local { name: String },
    Array { len: u64, elem: Box<TypeShape> },
    Slice { elem: Box<TypeShape> },
    Pointer { elem: Box<TypeShape> },
    Map { key: Box<TypeShape>, value: Box<TypeShape> },
    Channel { dir: ChanDir, elem: Box<TypeShape> },
    Struct { fields: Vec<FieldShape> },
    Func { signature: SignatureShape },
    Interface { methods: Vec<MethodShape>, embeddeds: Vec<TypeShape> },
    /// The fixed-width sub-channel identifier carried in place of a callback.
    SubchannelId,
    /// Stand-in for a type already being rendered further up.
    Cycle { of: String },
}

/// A struct field. `name` is `None` for embedded fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldShape {
    pub name: Option<String>,
    pub typ: TypeShape,
}

impl FieldShape {
    pub fn named(name: impl Into<String>, typ: TypeShape) -> Self {
        Self {
            name: Some(name.into()),
            typ,
        }
    }
}

/// A parameter or result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParamShape {
    pub name: Option<String>,
    pub typ: TypeShape,
    #[serde(skip_serializing_if = "is_no_spread")]
    pub spread: Spread,
}

fn is_no_spread(spread: &Spread) -> bool {
    *spread == Spread::None
}

impl ParamShape {
    pub fn new(name: Option<String>, typ: TypeShape) -> Self {
        Self {
            name,
            typ,
            spread: Spread::None,
        }
    }

    pub fn named(name: impl Into<String>, typ: TypeShape) -> Self {
        Self::new(Some(name.into()), typ)
    }

    pub fn unnamed(typ: TypeShape) -> Self {
        Self::new(None, typ)
    }
}

/// A function signature.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SignatureShape {
    pub params: Vec<ParamShape>,
    pub results: Vec<ParamShape>,
}

/// An interface method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodShape {
    pub name: String,
    pub signature: SignatureShape,
}

impl TypeShape {
    pub fn primitive(name: &str) -> Self {
        TypeShape::Primitive {
            name: name.to_string(),
        }
    }

    pub fn local(name: impl Into<String>) -> Self {
        TypeShape::Local { name: name.into() }
    }

    pub fn qualified(module: Option<&str>, name: &str) -> Self {
        TypeShape::Qualified {
            module: module.map(str::to_string),
            name: name.to_string(),
        }
    }

    /// The empty interface.
    pub fn any() -> Self {
        TypeShape::Interface {
            methods: Vec::new(),
            embeddeds: Vec::new(),
        }
    }

    /// Adds every module path referenced by this shape to `modules`.
    pub fn collect_modules(&self, modules: &mut BTreeSet<String>) {
        match self {
            TypeShape::Qualified { module: Some(module), .. } => {
                modules.insert(module.clone());
            }
            TypeShape::Array { elem, .. }
            | TypeShape::Slice { elem }
            | TypeShape::Pointer { elem }
            | TypeShape::Channel { elem, .. } => elem.collect_modules(modules),
            TypeShape::Map { key, value } => {
                key.collect_modules(modules);
                value.collect_modules(modules);
            }
            TypeShape::Struct { fields } => {
                for field in fields {
                    field.typ.collect_modules(modules);
                }
            }
            TypeShape::Func { signature } => signature.collect_modules(modules),
            TypeShape::Interface { methods, embeddeds } => {
                for method in methods {
                    method.signature.collect_modules(modules);
                }
                for embedded in embeddeds {
                    embedded.collect_modules(modules);
                }
            }
            TypeShape::Primitive { .. }
            | TypeShape::Qualified { module: None, .. }
            | TypeShape::Local { .. }
            | TypeShape::SubchannelId
            | TypeShape::Cycle { .. } => {}
        }
    }
}

impl SignatureShape {
    fn collect_modules(&self, modules: &mut BTreeSet<String>) {
        for param in self.params.iter().chain(&self.results) {
            param.typ.collect_modules(modules);
        }
    }
}

impl fmt::Display for TypeShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeShape::Primitive { name } | TypeShape::Local { name } => f.write_str(name),
            TypeShape::Qualified { module, name } => match module {
                Some(module) => write!(f, "{module}.{name}"),
                None => f.write_str(name),
            },
            TypeShape::Array { len, elem } => write!(f, "[{len}]{elem}"),
            TypeShape::Slice { elem } => write!(f, "[]{elem}"),
            TypeShape::Pointer { elem } => write!(f, "*{elem}"),
            TypeShape::Map { key, value } => write!(f, "map[{key}]{value}"),
            TypeShape::Channel { dir, elem } => match dir {
                ChanDir::Both => {
                    // `chan <-chan T` would parse as `chan<- chan T`.
                    if matches!(**elem, TypeShape::Channel { dir: ChanDir::Recv, .. }) {
                        write!(f, "chan ({elem})")
                    } else {
                        write!(f, "chan {elem}")
                    }
                }
                ChanDir::Send => write!(f, "chan<- {elem}"),
                ChanDir::Recv => write!(f, "<-chan {elem}"),
            },
            TypeShape::Struct { fields } => {
                f.write_str("struct{")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str("; ")?;
                    }
                    match &field.name {
                        Some(name) => write!(f, "{name} {}", field.typ)?,
                        None => write!(f, "{}", field.typ)?,
                    }
                }
                f.write_char('}')
            }
            TypeShape::Func { signature } => write!(f, "func{signature}"),
            TypeShape::Interface { methods, embeddeds } => {
                f.write_str("interface{")?;
                let mut first = true;
                for method in methods {
                    if !first {
                        f.write_str("; ")?;
                    }
                    first = false;
                    write!(f, "{}{}", method.name, method.signature)?;
                }
                for embedded in embeddeds {
                    if !first {
                        f.write_str("; ")?;
                    }
                    first = false;
                    write!(f, "{embedded}")?;
                }
                f.write_char('}')
            }
            TypeShape::SubchannelId => f.write_str("uint32"),
            TypeShape::Cycle { of } => write!(f, "\u{25CB}{of}"),
        }
    }
}

impl fmt::Display for SignatureShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char('(')?;
        write_params(f, &self.params)?;
        f.write_char(')')?;

        match self.results.as_slice() {
            [] => Ok(()),
            [single] => write!(f, " {}", single.typ),
            results => {
                f.write_str(" (")?;
                write_params(f, results)?;
                f.write_char(')')
            }
        }
    }
}

fn write_params(f: &mut fmt::Formatter<'_>, params: &[ParamShape]) -> fmt::Result {
    for (i, param) in params.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        match param.spread {
            Spread::None => write!(f, "{}", param.typ)?,
            Spread::Slice => write!(f, "...{}", param.typ)?,
            Spread::String => write!(f, "{}...", param.typ)?,
        }
    }
    Ok(())
}
