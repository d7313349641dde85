//! Analyzed contracts.
//!
//! A [`ContractGraph`] is the output of the analyzer: every interface reachable
//! from the roots, deduplicated by structural signature and sorted by it.
//! Callback parameters point at their nested contract by [`ContractId`].

use super::types::TypeId;

/// Position of a contract inside its [`ContractGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContractId(pub(crate) usize);

impl ContractId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A parameter or result of a contract method.
#[derive(Debug, Clone, PartialEq)]
pub struct Var {
    pub name: Option<String>,
    pub typ: TypeId,
    /// Set when the value is a callback contract that crosses the wire as a
    /// sub-channel id.
    pub contract: Option<ContractId>,
}

/// A method of a contract.
#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    pub name: String,
    pub params: Vec<Var>,
    pub results: Vec<Var>,
    pub variadic: bool,
}

impl Method {
    /// Whether any parameter needs sub-channel wiring.
    pub fn has_callbacks(&self) -> bool {
        self.params.iter().any(|p| p.contract.is_some())
    }

    /// The packed trailing parameter of a variadic method.
    pub fn variadic_param(&self) -> Option<&Var> {
        if self.variadic {
            self.params.last()
        } else {
            None
        }
    }
}

/// An interface contract.
#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceContract {
    pub id: ContractId,
    pub typ: TypeId,
    /// Canonical string form of the shape; the dedup and sort key.
    pub signature: String,
    /// Source name for named interfaces, `None` for interface literals.
    pub name: Option<String>,
    pub methods: Vec<Method>,
}

impl InterfaceContract {
    pub fn is_anonymous(&self) -> bool {
        self.name.is_none()
    }

    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods.iter().find(|m| m.name == name)
    }
}

/// Sorted, deduplicated set of contracts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContractGraph {
    contracts: Vec<InterfaceContract>,
}

impl ContractGraph {
    /// Builds a graph from contracts whose ids already equal their positions.
    pub(crate) fn from_sorted(contracts: Vec<InterfaceContract>) -> Self {
        debug_assert!(contracts.iter().enumerate().all(|(i, c)| c.id.0 == i));
        Self { contracts }
    }

    pub fn get(&self, id: ContractId) -> &InterfaceContract {
        &self.contracts[id.0]
    }

    pub fn iter(&self) -> impl Iterator<Item = &InterfaceContract> {
        self.contracts.iter()
    }

    pub fn contracts(&self) -> &[InterfaceContract] {
        &self.contracts
    }

    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }

    /// Finds a contract by structural signature.
    pub fn find(&self, signature: &str) -> Option<&InterfaceContract> {
        self.contracts
            .binary_search_by(|c| c.signature.as_str().cmp(signature))
            .ok()
            .map(|i| &self.contracts[i])
    }

    /// Finds a named contract by its source name.
    pub fn find_named(&self, name: &str) -> Option<&InterfaceContract> {
        self.contracts.iter().find(|c| c.name.as_deref() == Some(name))
    }
}

impl<'a> IntoIterator for &'a ContractGraph {
    type Item = &'a InterfaceContract;
    type IntoIter = std::slice::Iter<'a, InterfaceContract>;

    fn into_iter(self) -> Self::IntoIter {
        self.contracts.iter()
    }
}
