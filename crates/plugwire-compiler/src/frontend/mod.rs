//! Contract loaders.
//!
//! A loader reads contract declarations in some source format and resolves
//! them into a [`ContractSet`]: a [`TypeUniverse`] plus the names it declares.
//! Everything after loading works on the universe alone.

pub mod json;

use std::collections::BTreeMap;
use std::path::Path;

use crate::diagnostic::CompilerError;
use crate::ir::{TypeId, TypeUniverse};

/// Trait for contract loaders.
pub trait ContractLoader {
    /// Returns the format name (e.g., "json").
    fn format(&self) -> &str;

    /// Returns file extensions this loader handles.
    fn extensions(&self) -> &[&str];

    /// Loads a contract file, or every contract file under a directory.
    fn load(&mut self, path: &Path) -> Result<ContractSet, CompilerError>;
}

/// Resolved contracts of one module.
#[derive(Debug, Clone)]
pub struct ContractSet {
    pub module: String,
    pub universe: TypeUniverse,
    /// Local types by name, external types by qualified name.
    pub declared: BTreeMap<String, TypeId>,
}

impl ContractSet {
    /// Looks up a declared type by local or qualified name.
    pub fn lookup(&self, name: &str) -> Option<TypeId> {
        if let Some(id) = self.declared.get(name) {
            return Some(*id);
        }
        let local = name.strip_prefix(self.module.as_str())?.strip_prefix('.')?;
        self.declared.get(local).copied()
    }

    /// Resolves root contract names, in order.
    pub fn lookup_roots(&self, names: &[String]) -> Result<Vec<TypeId>, CompilerError> {
        names
            .iter()
            .map(|name| {
                self.lookup(name).ok_or_else(|| CompilerError::RootNotFound {
                    module: self.module.clone(),
                    name: name.clone(),
                })
            })
            .collect()
    }
}

/// Creates a loader for the given format.
pub fn create_loader(format: &str) -> Result<Box<dyn ContractLoader>, CompilerError> {
    match format {
        "json" => Ok(Box::new(json::JsonFrontend::new())),
        _ => Err(CompilerError::UnsupportedFormat {
            kind: "contract",
            format: format.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set() -> ContractSet {
        let mut universe = TypeUniverse::new();
        let thinger = universe.declare_named(Some("example.com/thinger"), "Thinger");
        let stringer = universe.declare_named(Some("fmt"), "Stringer");
        ContractSet {
            module: "example.com/thinger".to_string(),
            universe,
            declared: BTreeMap::from([
                ("Thinger".to_string(), thinger),
                ("fmt.Stringer".to_string(), stringer),
            ]),
        }
    }

    #[test]
    fn test_lookup_local_and_qualified() {
        let set = set();
        let local = set.lookup("Thinger").unwrap();
        assert_eq!(set.lookup("example.com/thinger.Thinger"), Some(local));
        assert!(set.lookup("fmt.Stringer").is_some());
        assert_eq!(set.lookup("other.Thinger"), None);
    }

    #[test]
    fn test_missing_root() {
        let err = set()
            .lookup_roots(&["Thinger".to_string(), "Missing".to_string()])
            .unwrap_err();
        assert_eq!(err.to_string(), "example.com/thinger.Missing not found");
    }

    #[test]
    fn test_unknown_format() {
        assert!(matches!(
            create_loader("yaml"),
            Err(CompilerError::UnsupportedFormat { .. })
        ));
    }
}
