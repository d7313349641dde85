//! Resolve parsed contract files into a [`TypeUniverse`].
//!
//! Resolution runs in two passes. The first declares every named type of
//! every file; the second defines them. Forward references and
//! self-references therefore resolve to the same declaration.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use super::ast::{
    ChanDirExpr, CompositeType, ContractFile, FieldExpr, MethodExpr, ParamExpr, TypeExpr,
};
use crate::diagnostic::CompilerError;
use crate::frontend::ContractSet;
use crate::ir::{
    ChanDir, Field, MethodSig, Param, Primitive, Signature, TypeDescriptor, TypeId, TypeUniverse,
};

/// Resolves a set of files that all declare the same module.
pub fn to_ir(files: &[(PathBuf, ContractFile)]) -> Result<ContractSet, CompilerError> {
    let Some((_, first)) = files.first() else {
        return Err(CompilerError::InvalidContractFile {
            path: PathBuf::new(),
            message: "no contract files to load".to_string(),
        });
    };
    let module = first.module.clone();
    for (_, file) in files {
        if file.module != module {
            return Err(CompilerError::MixedModules {
                first: module,
                second: file.module.clone(),
            });
        }
    }

    let mut resolver = Resolver::new(module);

    // Pass 1: declare.
    for (path, file) in files {
        for name in file.types.keys() {
            resolver.declare_local(path, name)?;
        }
        for qualified in file.externals.keys() {
            resolver.declare_external(path, qualified)?;
        }
    }

    // Pass 2: define.
    for (_, file) in files {
        for (name, expr) in &file.types {
            let id = resolver.locals[name.as_str()];
            let underlying = resolver.resolve(expr)?;
            resolver.universe.define_named(id, underlying);
        }
        for (qualified, expr) in &file.externals {
            let id = resolver.externals[qualified.as_str()];
            let underlying = resolver.resolve(expr)?;
            resolver.universe.define_named(id, underlying);
        }
    }

    Ok(resolver.finish())
}

/// Splits `path/to/module.Name` at the last dot. The name part never
/// contains a slash, so `github.com/x/y` is a bare path, not a type.
fn split_qualified(name: &str) -> Option<(&str, &str)> {
    let (module, local) = name.rsplit_once('.')?;
    (!module.is_empty() && !local.is_empty() && !local.contains('/')).then_some((module, local))
}

struct Resolver {
    module: String,
    universe: TypeUniverse,
    locals: HashMap<String, TypeId>,
    /// Qualified external names, described or opaque.
    externals: HashMap<String, TypeId>,
}

impl Resolver {
    fn new(module: String) -> Self {
        Self {
            module,
            universe: TypeUniverse::new(),
            locals: HashMap::new(),
            externals: HashMap::new(),
        }
    }

    fn declare_local(&mut self, path: &Path, name: &str) -> Result<(), CompilerError> {
        if self.locals.contains_key(name) {
            return Err(CompilerError::InvalidContractFile {
                path: path.to_path_buf(),
                message: format!("type '{name}' is declared more than once"),
            });
        }
        let id = self.universe.declare_named(Some(&self.module), name);
        self.locals.insert(name.to_string(), id);
        Ok(())
    }

    fn declare_external(&mut self, path: &Path, qualified: &str) -> Result<(), CompilerError> {
        let invalid = |message: String| CompilerError::InvalidContractFile {
            path: path.to_path_buf(),
            message,
        };
        let (module, name) = split_qualified(qualified)
            .ok_or_else(|| invalid(format!("external '{qualified}' is not a qualified name")))?;
        if module == self.module {
            return Err(invalid(format!(
                "external '{qualified}' belongs to the loaded module; declare it under 'types'"
            )));
        }
        if self.externals.contains_key(qualified) {
            return Err(invalid(format!("external '{qualified}' is described more than once")));
        }
        let id = self.universe.declare_named(Some(module), name);
        self.externals.insert(qualified.to_string(), id);
        Ok(())
    }

    fn resolve_name(&mut self, name: &str) -> Result<TypeId, CompilerError> {
        if let Some(primitive) = Primitive::from_name(name) {
            return Ok(self.universe.primitive(primitive));
        }
        match name {
            "error" => return Ok(self.universe.error()),
            "any" => return Ok(self.universe.any()),
            _ => {}
        }
        if let Some(id) = self.locals.get(name) {
            return Ok(*id);
        }

        let unresolved = || CompilerError::UnresolvedType {
            name: name.to_string(),
        };
        let (module, local) = split_qualified(name).ok_or_else(unresolved)?;
        if module == self.module {
            return self.locals.get(local).copied().ok_or_else(unresolved);
        }
        if let Some(id) = self.externals.get(name) {
            return Ok(*id);
        }

        // Undescribed externals stay opaque.
        let id = self.universe.declare_named(Some(module), local);
        self.externals.insert(name.to_string(), id);
        Ok(id)
    }

    fn resolve(&mut self, expr: &TypeExpr) -> Result<TypeId, CompilerError> {
        let composite = match expr {
            TypeExpr::Name(name) => return self.resolve_name(name),
            TypeExpr::Composite(composite) => composite,
        };

        let desc = match composite {
            CompositeType::Slice { elem } => TypeDescriptor::Slice(self.resolve(elem)?),
            CompositeType::Array { len, elem } => TypeDescriptor::Array {
                len: *len,
                elem: self.resolve(elem)?,
            },
            CompositeType::Pointer { elem } => TypeDescriptor::Pointer(self.resolve(elem)?),
            CompositeType::Map { key, value } => TypeDescriptor::Map {
                key: self.resolve(key)?,
                value: self.resolve(value)?,
            },
            CompositeType::Chan { dir, elem } => TypeDescriptor::Channel {
                dir: match dir {
                    ChanDirExpr::Both => ChanDir::Both,
                    ChanDirExpr::Send => ChanDir::Send,
                    ChanDirExpr::Recv => ChanDir::Recv,
                },
                elem: self.resolve(elem)?,
            },
            CompositeType::Struct { fields } => TypeDescriptor::Struct(
                fields
                    .iter()
                    .map(|field| self.resolve_field(field))
                    .collect::<Result<_, _>>()?,
            ),
            CompositeType::Func {
                params,
                results,
                variadic,
            } => TypeDescriptor::Signature(self.resolve_signature(params, results, *variadic)?),
            CompositeType::Interface { methods, embeds } => {
                let methods = methods
                    .iter()
                    .map(|method| self.resolve_method(method))
                    .collect::<Result<_, _>>()?;
                let embeddeds = embeds
                    .iter()
                    .map(|embedded| self.resolve(embedded))
                    .collect::<Result<_, _>>()?;
                return Ok(self.universe.interface(methods, embeddeds));
            }
        };

        Ok(self.universe.insert(desc))
    }

    fn resolve_field(&mut self, field: &FieldExpr) -> Result<Field, CompilerError> {
        let typ = self.resolve(&field.typ)?;
        let name = match (&field.name, field.embedded) {
            (Some(name), _) => name.clone(),
            (None, true) => embedded_name(&self.universe, typ),
            (None, false) => {
                return Err(CompilerError::UnresolvedType {
                    name: "unnamed struct field".to_string(),
                })
            }
        };
        Ok(Field {
            name,
            typ,
            embedded: field.embedded,
        })
    }

    fn resolve_method(&mut self, method: &MethodExpr) -> Result<MethodSig, CompilerError> {
        let signature = self.resolve_signature(&method.params, &method.results, method.variadic)?;
        Ok(MethodSig::new(method.name.clone(), signature))
    }

    fn resolve_signature(
        &mut self,
        params: &[ParamExpr],
        results: &[ParamExpr],
        variadic: bool,
    ) -> Result<Signature, CompilerError> {
        Ok(Signature {
            params: self.resolve_params(params)?,
            results: self.resolve_params(results)?,
            variadic,
        })
    }

    fn resolve_params(&mut self, params: &[ParamExpr]) -> Result<Vec<Param>, CompilerError> {
        params
            .iter()
            .map(|param| {
                Ok(Param {
                    name: param.name.clone(),
                    typ: self.resolve(&param.typ)?,
                })
            })
            .collect()
    }

    fn finish(self) -> ContractSet {
        let mut declared: BTreeMap<String, TypeId> = self.externals.into_iter().collect();
        declared.extend(self.locals);
        ContractSet {
            module: self.module,
            universe: self.universe,
            declared,
        }
    }
}

/// The implicit name of an embedded field: the type name, minus any pointer.
fn embedded_name(universe: &TypeUniverse, id: TypeId) -> String {
    match universe.get(id) {
        TypeDescriptor::Pointer(elem) => embedded_name(universe, *elem),
        TypeDescriptor::Named(named) => named.name.clone(),
        _ => universe.display_name(id),
    }
}
