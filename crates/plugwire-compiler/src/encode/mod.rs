//! Structural encoding of resolved types into [`TypeShape`]s.
//!
//! The encoder is total: it never fails and never loops. Named types are
//! rendered by reference, and a type met again on the current path renders
//! as a [`TypeShape::Cycle`] placeholder.

mod shape;

pub use shape::{FieldShape, MethodShape, ParamShape, SignatureShape, Spread, TypeShape};

use crate::ir::{NamedType, Primitive, Signature, TypeDescriptor, TypeId, TypeUniverse};

const VENDOR_SEGMENT: &str = "/vendor/";

/// Drops everything up to and including the last `/vendor/` segment, so a
/// vendored copy of a module is named like the module itself.
pub fn strip_vendor(path: &str) -> &str {
    match path.rfind(VENDOR_SEGMENT) {
        Some(i) => &path[i + VENDOR_SEGMENT.len()..],
        None => path,
    }
}

fn qualified_shape(named: &NamedType) -> TypeShape {
    TypeShape::Qualified {
        module: named.module.as_deref().map(|m| strip_vendor(m).to_string()),
        name: named.name.clone(),
    }
}

/// Encodes types of one universe.
#[derive(Debug, Clone, Copy)]
pub struct Encoder<'u> {
    universe: &'u TypeUniverse,
}

impl<'u> Encoder<'u> {
    pub fn new(universe: &'u TypeUniverse) -> Self {
        Self { universe }
    }

    /// Encodes a type as it is referenced.
    pub fn encode(&self, id: TypeId) -> TypeShape {
        self.encode_with(id, &mut Vec::new())
    }

    /// Encodes the definition behind a named type (or the type itself when it
    /// is not named).
    pub fn encode_underlying(&self, id: TypeId) -> TypeShape {
        let mut visited = Vec::new();
        let mut current = id;
        loop {
            let desc = self.universe.get(current);
            match desc {
                TypeDescriptor::Named(named) => match named.underlying {
                    Some(next) => {
                        if visited.contains(&current) {
                            return TypeShape::Cycle {
                                of: desc.kind_name().to_string(),
                            };
                        }
                        visited.push(current);
                        current = next;
                    }
                    None => return self.encode_with(current, &mut visited),
                },
                _ => return self.encode_with(current, &mut visited),
            }
        }
    }

    /// The canonical structural signature of a type.
    pub fn signature_of(&self, id: TypeId) -> String {
        self.encode(id).to_string()
    }

    /// Encodes a function signature.
    pub fn encode_signature(&self, sig: &Signature) -> SignatureShape {
        self.signature_with(sig, &mut Vec::new())
    }

    fn encode_with(&self, id: TypeId, visited: &mut Vec<TypeId>) -> TypeShape {
        let desc = self.universe.get(id);
        // Named types render by reference and never descend.
        if let TypeDescriptor::Named(named) = desc {
            return qualified_shape(named);
        }
        if visited.contains(&id) {
            return TypeShape::Cycle {
                of: desc.kind_name().to_string(),
            };
        }
        visited.push(id);

        let shape = match desc {
            TypeDescriptor::Primitive(p) => match p {
                Primitive::UnsafePointer => TypeShape::qualified(Some("unsafe"), "Pointer"),
                p => TypeShape::primitive(p.name()),
            },
            TypeDescriptor::Array { len, elem } => TypeShape::Array {
                len: *len,
                elem: Box::new(self.encode_with(*elem, visited)),
            },
            TypeDescriptor::Slice(elem) => TypeShape::Slice {
                elem: Box::new(self.encode_with(*elem, visited)),
            },
            TypeDescriptor::Pointer(elem) => TypeShape::Pointer {
                elem: Box::new(self.encode_with(*elem, visited)),
            },
            TypeDescriptor::Map { key, value } => TypeShape::Map {
                key: Box::new(self.encode_with(*key, visited)),
                value: Box::new(self.encode_with(*value, visited)),
            },
            TypeDescriptor::Channel { dir, elem } => TypeShape::Channel {
                dir: *dir,
                elem: Box::new(self.encode_with(*elem, visited)),
            },
            TypeDescriptor::Struct(fields) => TypeShape::Struct {
                fields: fields
                    .iter()
                    .map(|field| FieldShape {
                        name: (!field.embedded).then(|| field.name.clone()),
                        typ: self.encode_with(field.typ, visited),
                    })
                    .collect(),
            },
            TypeDescriptor::Signature(sig) => TypeShape::Func {
                signature: self.signature_with(sig, visited),
            },
            TypeDescriptor::Interface(iface) => {
                let mut methods: Vec<_> = iface
                    .methods
                    .iter()
                    .map(|m| MethodShape {
                        name: m.name.clone(),
                        signature: self.signature_with(&m.signature, visited),
                    })
                    .collect();
                methods.sort_by(|a, b| a.name.cmp(&b.name));

                // Embedding order does not change the method set.
                let mut embeddeds: Vec<_> = iface
                    .embeddeds
                    .iter()
                    .map(|e| self.encode_with(*e, visited))
                    .collect();
                embeddeds.sort_by_cached_key(|e| e.to_string());

                TypeShape::Interface { methods, embeddeds }
            }
            TypeDescriptor::Named(named) => qualified_shape(named),
        };

        visited.pop();
        shape
    }

    fn signature_with(&self, sig: &Signature, visited: &mut Vec<TypeId>) -> SignatureShape {
        let last = sig.params.len().saturating_sub(1);
        let params = sig
            .params
            .iter()
            .enumerate()
            .map(|(i, param)| {
                if sig.variadic && i == last {
                    self.variadic_param(param.name.clone(), param.typ, visited)
                } else {
                    ParamShape::new(param.name.clone(), self.encode_with(param.typ, visited))
                }
            })
            .collect();

        let results = sig
            .results
            .iter()
            .map(|r| ParamShape::new(r.name.clone(), self.encode_with(r.typ, visited)))
            .collect();

        SignatureShape { params, results }
    }

    /// The trailing parameter of a variadic signature: `...T` for a slice of
    /// `T`, `string...` for a string spread as bytes.
    fn variadic_param(
        &self,
        name: Option<String>,
        typ: TypeId,
        visited: &mut Vec<TypeId>,
    ) -> ParamShape {
        let resolved = self.universe.underlying(typ).map(|u| self.universe.get(u));
        match resolved {
            Ok(TypeDescriptor::Slice(elem)) => ParamShape {
                name,
                typ: self.encode_with(*elem, visited),
                spread: Spread::Slice,
            },
            _ => ParamShape {
                name,
                typ: self.encode_with(typ, visited),
                spread: Spread::String,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{ChanDir, Field, MethodSig, Param};

    #[test]
    fn test_strip_vendor() {
        assert_eq!(strip_vendor("example.com/app/vendor/github.com/x/y"), "github.com/x/y");
        assert_eq!(strip_vendor("github.com/x/y"), "github.com/x/y");
        assert_eq!(strip_vendor("a/vendor/b/vendor/c"), "c");
    }

    #[test]
    fn test_vendored_names_match() {
        let mut universe = TypeUniverse::new();
        let direct = universe.declare_named(Some("github.com/x/y"), "Thing");
        let vendored = universe.declare_named(Some("example.com/app/vendor/github.com/x/y"), "Thing");

        let encoder = Encoder::new(&universe);
        assert_eq!(encoder.encode(direct), encoder.encode(vendored));
        assert_eq!(encoder.signature_of(vendored), "github.com/x/y.Thing");
    }

    #[test]
    fn test_struct_embedding() {
        let mut universe = TypeUniverse::new();
        let base = universe.declare_named(Some("example.com/m"), "Base");
        let int = universe.int();
        let body = universe.insert(TypeDescriptor::Struct(vec![
            Field {
                name: "Base".to_string(),
                typ: base,
                embedded: true,
            },
            Field {
                name: "count".to_string(),
                typ: int,
                embedded: false,
            },
        ]));

        let shape = Encoder::new(&universe).encode(body);
        assert_eq!(shape.to_string(), "struct{example.com/m.Base; count int}");
        let TypeShape::Struct { fields } = shape else {
            panic!("expected struct shape");
        };
        assert_eq!(fields[0].name, None);
        assert_eq!(fields[1].name.as_deref(), Some("count"));
    }

    #[test]
    fn test_variadic_duality() {
        let mut universe = TypeUniverse::new();
        let int = universe.int();
        let string = universe.string();
        let ints = universe.slice(int);
        let bytes = universe.slice(universe.primitive(Primitive::Uint8));

        let sum = Signature {
            params: vec![Param::named("xs", ints)],
            results: vec![Param::new(int)],
            variadic: true,
        };
        let append = Signature {
            params: vec![Param::new(bytes), Param::new(string)],
            results: vec![Param::new(bytes)],
            variadic: true,
        };

        let encoder = Encoder::new(&universe);
        let sum_shape = encoder.encode_signature(&sum);
        assert_eq!(sum_shape.params[0].spread, Spread::Slice);
        assert_eq!(sum_shape.to_string(), "(...int) int");

        let append_shape = encoder.encode_signature(&append);
        assert_eq!(append_shape.params[1].spread, Spread::String);
        assert_eq!(append_shape.to_string(), "([]uint8, string...) []uint8");
    }

    #[test]
    fn test_embedding_order_is_canonical() {
        let mut universe = TypeUniverse::new();
        let empty = universe.interface(Vec::new(), Vec::new());
        let reader = universe.named(Some("example.com/io"), "Reader", empty);
        let writer = universe.named(Some("example.com/io"), "Writer", empty);
        let rw = universe.interface(Vec::new(), vec![reader, writer]);
        let wr = universe.interface(Vec::new(), vec![writer, reader]);

        let encoder = Encoder::new(&universe);
        assert_eq!(encoder.encode(rw), encoder.encode(wr));
        assert_eq!(
            encoder.signature_of(wr),
            "interface{example.com/io.Reader; example.com/io.Writer}"
        );
    }

    #[test]
    fn test_channel_directions() {
        let mut universe = TypeUniverse::new();
        let int = universe.int();
        let recv = universe.channel(ChanDir::Recv, int);
        let both = universe.channel(ChanDir::Both, recv);
        let send = universe.channel(ChanDir::Send, int);

        let encoder = Encoder::new(&universe);
        assert_eq!(encoder.signature_of(both), "chan (<-chan int)");
        assert_eq!(encoder.signature_of(send), "chan<- int");
    }

    #[test]
    fn test_self_referential_named_interface() {
        let mut universe = TypeUniverse::new();
        let node = universe.declare_named(Some("example.com/graph"), "Node");
        let body = universe.interface(
            vec![MethodSig::new(
                "Next",
                Signature {
                    params: vec![Param::new(node)],
                    results: Vec::new(),
                    variadic: false,
                },
            )],
            Vec::new(),
        );
        universe.define_named(node, body);

        let encoder = Encoder::new(&universe);
        assert_eq!(encoder.signature_of(node), "example.com/graph.Node");
        assert_eq!(
            encoder.encode_underlying(node).to_string(),
            "interface{Next(example.com/graph.Node)}"
        );
    }

    #[test]
    fn test_named_cycle_renders_placeholder() {
        let mut universe = TypeUniverse::new();
        let a = universe.declare_named(Some("m"), "A");
        let b = universe.declare_named(Some("m"), "B");
        universe.define_named(a, b);
        universe.define_named(b, a);

        let shape = Encoder::new(&universe).encode_underlying(a);
        assert!(matches!(shape, TypeShape::Cycle { .. }));
    }

    #[test]
    fn test_interface_methods_are_sorted() {
        let mut universe = TypeUniverse::new();
        let iface = universe.interface(
            vec![
                MethodSig::new("Zed", Signature::default()),
                MethodSig::new("Alpha", Signature::default()),
            ],
            Vec::new(),
        );
        assert_eq!(
            Encoder::new(&universe).signature_of(iface),
            "interface{Alpha(); Zed()}"
        );
    }
}
