//! Classification of method slots.
//!
//! Decides how a parameter or result type crosses the wire: as a plain value,
//! as a callback contract (pluggable), or as one of the interface shapes that
//! can only be carried opaquely.

use std::collections::BTreeMap;

use crate::diagnostic::CompilerError;
use crate::ir::{MethodSig, Primitive, TypeDescriptor, TypeId, TypeUniverse, ERROR_METHOD};

/// How a slot type is carried across the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    /// Copied by value.
    Plain,
    /// Copied by value; writes through it stay on the receiving side.
    PointerLike,
    /// The empty interface.
    Any,
    /// The canonical error shape: `interface{ Error() string }`.
    ErrorLike,
    /// A non-empty, non-error interface: wired through a sub-channel.
    Pluggable,
}

/// Full method set of an interface type: explicit methods plus those of
/// embedded interfaces, sorted by name.
pub fn method_set(universe: &TypeUniverse, id: TypeId) -> Result<Vec<&MethodSig>, CompilerError> {
    let mut methods = BTreeMap::new();
    collect_methods(universe, id, &mut Vec::new(), &mut methods)?;
    Ok(methods.into_values().collect())
}

fn collect_methods<'u>(
    universe: &'u TypeUniverse,
    id: TypeId,
    stack: &mut Vec<TypeId>,
    methods: &mut BTreeMap<&'u str, &'u MethodSig>,
) -> Result<(), CompilerError> {
    if stack.contains(&id) {
        return Err(CompilerError::EmbeddingCycle {
            type_name: universe.display_name(id),
        });
    }

    let underlying = universe.underlying(id)?;
    let TypeDescriptor::Interface(iface) = universe.get(underlying) else {
        return Err(CompilerError::NotAnInterface {
            type_name: universe.display_name(id),
        });
    };

    stack.push(id);
    for method in &iface.methods {
        methods.entry(method.name.as_str()).or_insert(method);
    }
    for embedded in &iface.embeddeds {
        collect_methods(universe, *embedded, stack, methods)?;
    }
    stack.pop();

    Ok(())
}

/// Whether `id` resolves to an interface type.
pub fn is_interface(universe: &TypeUniverse, id: TypeId) -> bool {
    universe.interface_of(id).is_some()
}

/// Whether the method set is the single niladic `Error() string` method.
fn is_error_method_set(universe: &TypeUniverse, methods: &[&MethodSig]) -> bool {
    let [method] = methods else {
        return false;
    };
    let sig = &method.signature;
    method.name == ERROR_METHOD
        && sig.params.is_empty()
        && !sig.variadic
        && sig.results.len() == 1
        && universe.get(sig.results[0].typ) == &TypeDescriptor::Primitive(Primitive::String)
}

/// Classifies a slot type.
pub fn classify(universe: &TypeUniverse, id: TypeId) -> Result<SlotKind, CompilerError> {
    if !is_interface(universe, id) {
        let kind = match universe.underlying(id).map(|u| universe.get(u)) {
            Ok(
                TypeDescriptor::Pointer(_)
                | TypeDescriptor::Map { .. }
                | TypeDescriptor::Channel { .. },
            ) => SlotKind::PointerLike,
            // Opaque external types are carried as values.
            _ => SlotKind::Plain,
        };
        return Ok(kind);
    }

    let methods = method_set(universe, id)?;
    Ok(if methods.is_empty() {
        SlotKind::Any
    } else if is_error_method_set(universe, &methods) {
        SlotKind::ErrorLike
    } else {
        SlotKind::Pluggable
    })
}

/// Whether `id` is a pluggable contract type.
pub fn is_pluggable(universe: &TypeUniverse, id: TypeId) -> bool {
    matches!(classify(universe, id), Ok(SlotKind::Pluggable))
}

/// Whether `id` has the error-like shape.
pub fn is_error_like(universe: &TypeUniverse, id: TypeId) -> bool {
    matches!(classify(universe, id), Ok(SlotKind::ErrorLike))
}
