//! Resolved type descriptors.
//!
//! Every type lives in a [`TypeUniverse`] arena and refers to its components by
//! [`TypeId`]. Named types are declared first and defined later, which lets a
//! named type mention itself through its own underlying type.

use serde::Serialize;

use crate::diagnostic::CompilerError;

/// Index of a type inside a [`TypeUniverse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(usize);

impl TypeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Built-in scalar types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
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
}

impl Primitive {
    pub const ALL: [Primitive; 18] = [
        Primitive::Bool,
        Primitive::Int,
        Primitive::Int8,
        Primitive::Int16,
        Primitive::Int32,
        Primitive::Int64,
        Primitive::Uint,
        Primitive::Uint8,
        Primitive::Uint16,
        Primitive::Uint32,
        Primitive::Uint64,
        Primitive::Uintptr,
        Primitive::Float32,
        Primitive::Float64,
        Primitive::Complex64,
        Primitive::Complex128,
        Primitive::String,
        Primitive::UnsafePointer,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Primitive::Bool => "bool",
            Primitive::Int => "int",
            Primitive::Int8 => "int8",
            Primitive::Int16 => "int16",
            Primitive::Int32 => "int32",
            Primitive::Int64 => "int64",
            Primitive::Uint => "uint",
            Primitive::Uint8 => "uint8",
            Primitive::Uint16 => "uint16",
            Primitive::Uint32 => "uint32",
            Primitive::Uint64 => "uint64",
            Primitive::Uintptr => "uintptr",
            Primitive::Float32 => "float32",
            Primitive::Float64 => "float64",
            Primitive::Complex64 => "complex64",
            Primitive::Complex128 => "complex128",
            Primitive::String => "string",
            Primitive::UnsafePointer => "unsafe.Pointer",
        }
    }

    /// Looks up a primitive by source name, accepting the `byte`/`rune` aliases.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "byte" => Some(Primitive::Uint8),
            "rune" => Some(Primitive::Int32),
            _ => Self::ALL.iter().copied().find(|p| p.name() == name),
        }
    }
}

/// Channel direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChanDir {
    #[default]
    Both,
    Send,
    Recv,
}

/// A struct field.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub typ: TypeId,
    pub embedded: bool,
}

/// A parameter or result in a signature.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: Option<String>,
    pub typ: TypeId,
}

impl Param {
    pub fn new(typ: TypeId) -> Self {
        Self { name: None, typ }
    }

    pub fn named(name: impl Into<String>, typ: TypeId) -> Self {
        Self {
            name: Some(name.into()),
            typ,
        }
    }
}

/// A function signature. When `variadic` is set the last parameter holds the
/// packed trailing arguments (a slice, or a string for byte-spreading).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Signature {
    pub params: Vec<Param>,
    pub results: Vec<Param>,
    pub variadic: bool,
}

/// A method declared on an interface.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodSig {
    pub name: String,
    pub signature: Signature,
}

impl MethodSig {
    pub fn new(name: impl Into<String>, signature: Signature) -> Self {
        Self {
            name: name.into(),
            signature,
        }
    }
}

/// An interface: its explicitly declared methods plus embedded interfaces.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InterfaceType {
    pub methods: Vec<MethodSig>,
    pub embeddeds: Vec<TypeId>,
}

/// A named type. `underlying` is `None` for opaque external types and for
/// types declared but not yet defined.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedType {
    pub module: Option<String>,
    pub name: String,
    pub underlying: Option<TypeId>,
}

impl NamedType {
    /// `module.Name`, or just `Name` for predeclared types.
    pub fn qualified_name(&self) -> String {
        match &self.module {
            Some(module) => format!("{}.{}", module, self.name),
            None => self.name.clone(),
        }
    }
}

/// One node of the type graph.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDescriptor {
    Primitive(Primitive),
    Array { len: u64, elem: TypeId },
    Slice(TypeId),
    Struct(Vec<Field>),
    Pointer(TypeId),
    Map { key: TypeId, value: TypeId },
    Channel { dir: ChanDir, elem: TypeId },
    Signature(Signature),
    Named(NamedType),
    Interface(InterfaceType),
}

impl TypeDescriptor {
    /// Short kind label, used for cycle placeholders and messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            TypeDescriptor::Primitive(_) => "primitive",
            TypeDescriptor::Array { .. } => "array",
            TypeDescriptor::Slice(_) => "slice",
            TypeDescriptor::Struct(_) => "struct",
            TypeDescriptor::Pointer(_) => "pointer",
            TypeDescriptor::Map { .. } => "map",
            TypeDescriptor::Channel { .. } => "chan",
            TypeDescriptor::Signature(_) => "func",
            TypeDescriptor::Named(_) => "named",
            TypeDescriptor::Interface(_) => "interface",
        }
    }
}

/// Arena owning every type a contract set can mention.
#[derive(Debug, Clone)]
pub struct TypeUniverse {
    types: Vec<TypeDescriptor>,
    error: TypeId,
    any: TypeId,
}

/// Name of the single method of the error-like shape.
pub const ERROR_METHOD: &str = "Error";

impl TypeUniverse {
    /// Creates a universe holding the primitives and the predeclared
    /// `error` and `any` types.
    pub fn new() -> Self {
        let mut types: Vec<TypeDescriptor> = Primitive::ALL
            .iter()
            .map(|p| TypeDescriptor::Primitive(*p))
            .collect();

        let string = TypeId(
            Primitive::ALL
                .iter()
                .position(|p| *p == Primitive::String)
                .unwrap_or_default(),
        );

        let any = TypeId(types.len());
        types.push(TypeDescriptor::Interface(InterfaceType::default()));

        let error_iface = TypeId(types.len());
        types.push(TypeDescriptor::Interface(InterfaceType {
            methods: vec![MethodSig::new(
                ERROR_METHOD,
                Signature {
                    params: Vec::new(),
                    results: vec![Param::new(string)],
                    variadic: false,
                },
            )],
            embeddeds: Vec::new(),
        }));

        let error = TypeId(types.len());
        types.push(TypeDescriptor::Named(NamedType {
            module: None,
            name: "error".to_string(),
            underlying: Some(error_iface),
        }));

        Self { types, error, any }
    }

    /// Adds a type and returns its id.
    pub fn insert(&mut self, desc: TypeDescriptor) -> TypeId {
        let id = TypeId(self.types.len());
        self.types.push(desc);
        id
    }

    pub fn get(&self, id: TypeId) -> &TypeDescriptor {
        &self.types[id.0]
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn primitive(&self, primitive: Primitive) -> TypeId {
        let index = Primitive::ALL
            .iter()
            .position(|p| *p == primitive)
            .unwrap_or_default();
        TypeId(index)
    }

    pub fn string(&self) -> TypeId {
        self.primitive(Primitive::String)
    }

    pub fn int(&self) -> TypeId {
        self.primitive(Primitive::Int)
    }

    /// The predeclared `error` type.
    pub fn error(&self) -> TypeId {
        self.error
    }

    /// The empty interface.
    pub fn any(&self) -> TypeId {
        self.any
    }

    pub fn slice(&mut self, elem: TypeId) -> TypeId {
        self.insert(TypeDescriptor::Slice(elem))
    }

    pub fn array(&mut self, len: u64, elem: TypeId) -> TypeId {
        self.insert(TypeDescriptor::Array { len, elem })
    }

    pub fn pointer(&mut self, elem: TypeId) -> TypeId {
        self.insert(TypeDescriptor::Pointer(elem))
    }

    pub fn map(&mut self, key: TypeId, value: TypeId) -> TypeId {
        self.insert(TypeDescriptor::Map { key, value })
    }

    pub fn channel(&mut self, dir: ChanDir, elem: TypeId) -> TypeId {
        self.insert(TypeDescriptor::Channel { dir, elem })
    }

    pub fn interface(&mut self, methods: Vec<MethodSig>, embeddeds: Vec<TypeId>) -> TypeId {
        self.insert(TypeDescriptor::Interface(InterfaceType { methods, embeddeds }))
    }

    /// Declares a named type without defining it.
    pub fn declare_named(&mut self, module: Option<&str>, name: &str) -> TypeId {
        self.insert(TypeDescriptor::Named(NamedType {
            module: module.map(str::to_string),
            name: name.to_string(),
            underlying: None,
        }))
    }

    /// Sets the underlying type of a declared named type. Ids that do not
    /// refer to a named type are left untouched.
    pub fn define_named(&mut self, id: TypeId, underlying: TypeId) {
        if let TypeDescriptor::Named(named) = &mut self.types[id.0] {
            named.underlying = Some(underlying);
        }
    }

    /// Declares and defines a named type in one step.
    pub fn named(&mut self, module: Option<&str>, name: &str, underlying: TypeId) -> TypeId {
        let id = self.declare_named(module, name);
        self.define_named(id, underlying);
        id
    }

    /// Follows named types down to their structural definition.
    pub fn underlying(&self, id: TypeId) -> Result<TypeId, CompilerError> {
        let mut current = id;
        // A chain longer than the arena can only be a cycle.
        for _ in 0..=self.types.len() {
            match self.get(current) {
                TypeDescriptor::Named(named) => match named.underlying {
                    Some(next) => current = next,
                    None => {
                        return Err(CompilerError::UnresolvedType {
                            name: named.qualified_name(),
                        })
                    }
                },
                _ => return Ok(current),
            }
        }
        Err(CompilerError::UnresolvedType {
            name: self.display_name(id),
        })
    }

    /// The interface definition behind `id`, if it resolves to one.
    pub fn interface_of(&self, id: TypeId) -> Option<&InterfaceType> {
        match self.underlying(id).ok().map(|u| self.get(u)) {
            Some(TypeDescriptor::Interface(iface)) => Some(iface),
            _ => None,
        }
    }

    /// The named-type record behind `id`, if `id` is a named type.
    pub fn named_of(&self, id: TypeId) -> Option<&NamedType> {
        match self.get(id) {
            TypeDescriptor::Named(named) => Some(named),
            _ => None,
        }
    }

    /// A short human name for messages: the qualified name for named types,
    /// the kind label otherwise.
    pub fn display_name(&self, id: TypeId) -> String {
        match self.get(id) {
            TypeDescriptor::Named(named) => named.qualified_name(),
            TypeDescriptor::Primitive(p) => p.name().to_string(),
            other => other.kind_name().to_string(),
        }
    }
}

impl Default for TypeUniverse {
    fn default() -> Self {
        Self::new()
    }
}
