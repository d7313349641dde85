//! Contract-graph analysis.
//!
//! Walks every interface reachable from a set of roots through callback
//! parameters, validates each method against the wire protocol's limits and
//! returns the contracts deduplicated by structural signature.
//!
//! Rejected outright:
//! - a variadic method whose packed element is a pluggable contract;
//! - a method returning a pluggable contract.
//!
//! Allowed with a warning:
//! - empty-interface parameters and results;
//! - error-like slots when raw error pass-through is enabled;
//! - pointer, map and channel parameters.

pub mod classify;

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::diagnostic::{CompilerError, Slot, Warning, WarningKind};
use crate::encode::Encoder;
use crate::ir::{
    ContractGraph, ContractId, InterfaceContract, Method, Param, TypeDescriptor, TypeId,
    TypeUniverse, Var,
};
use classify::{classify, is_interface, method_set, SlotKind};

/// Result of a successful analysis.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub contracts: ContractGraph,
    pub warnings: Vec<Warning>,
}

/// Reusable analyzer over one type universe.
///
/// Each [`analyze_all`](Self::analyze_all) call starts from an empty memo, so
/// repeated calls with the same roots return equal graphs.
pub struct InterfaceGraphAnalyzer<'u> {
    universe: &'u TypeUniverse,
    encoder: Encoder<'u>,
    allow_raw_errors: bool,

    /// Structural signature -> discovery index.
    done: HashMap<String, usize>,
    /// Discovery-ordered contracts; `None` while a contract's methods are
    /// still being analyzed.
    discovered: Vec<Option<InterfaceContract>>,
    warnings: Vec<Warning>,
}

impl<'u> InterfaceGraphAnalyzer<'u> {
    pub fn new(universe: &'u TypeUniverse, allow_raw_errors: bool) -> Self {
        Self {
            universe,
            encoder: Encoder::new(universe),
            allow_raw_errors,
            done: HashMap::new(),
            discovered: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Analyzes the closure of `roots` and returns it sorted by signature.
    ///
    /// Fails on the first fatal condition, with no partial graph.
    pub fn analyze_all(&mut self, roots: &[TypeId]) -> Result<Analysis, CompilerError> {
        let result = self.run(roots);
        self.reset();
        result
    }

    fn run(&mut self, roots: &[TypeId]) -> Result<Analysis, CompilerError> {
        for root in roots {
            if !is_interface(self.universe, *root) {
                return Err(CompilerError::NotAnInterface {
                    type_name: self.universe.display_name(*root),
                });
            }
            self.analyze(*root)?;
        }

        let discovered = std::mem::take(&mut self.discovered);
        let contracts = sort_contracts(discovered);
        debug!(count = contracts.len(), "contract graph analyzed");

        Ok(Analysis {
            contracts,
            warnings: std::mem::take(&mut self.warnings),
        })
    }

    fn reset(&mut self) {
        self.done.clear();
        self.discovered.clear();
        self.warnings.clear();
    }

    /// Analyzes one interface, returning its discovery index.
    fn analyze(&mut self, typ: TypeId) -> Result<usize, CompilerError> {
        let signature = self.encoder.signature_of(typ);
        if let Some(&index) = self.done.get(&signature) {
            return Ok(index);
        }

        // Claim the slot before descending so self-references resolve here.
        let index = self.discovered.len();
        self.discovered.push(None);
        self.done.insert(signature.clone(), index);
        debug!(contract = %signature, index, "analyzing contract");

        let universe = self.universe;
        let mut methods = Vec::new();
        for sig in method_set(universe, typ)? {
            methods.push(self.analyze_method(&signature, &sig.name, &sig.signature)?);
        }

        self.discovered[index] = Some(InterfaceContract {
            id: ContractId(index),
            typ,
            name: universe.named_of(typ).map(|n| n.name.clone()),
            signature,
            methods,
        });
        Ok(index)
    }

    fn analyze_method(
        &mut self,
        contract: &str,
        name: &str,
        sig: &crate::ir::Signature,
    ) -> Result<Method, CompilerError> {
        if sig.variadic {
            self.check_variadic(contract, name, sig.params.last())?;
        }

        let mut params = Vec::with_capacity(sig.params.len());
        for (i, param) in sig.params.iter().enumerate() {
            let mut var = Var {
                name: param.name.clone(),
                typ: param.typ,
                contract: None,
            };
            match classify(self.universe, param.typ)? {
                SlotKind::Pluggable => {
                    var.contract = Some(ContractId(self.analyze(param.typ)?));
                }
                SlotKind::Any => self.warn(WarningKind::AnySlot, contract, name, Slot::Param(i)),
                SlotKind::ErrorLike if self.allow_raw_errors => {
                    self.warn(WarningKind::RawErrorSlot, contract, name, Slot::Param(i))
                }
                SlotKind::PointerLike => {
                    self.warn(WarningKind::PointerLikeParam, contract, name, Slot::Param(i))
                }
                SlotKind::ErrorLike | SlotKind::Plain => {}
            }
            params.push(var);
        }

        let mut results = Vec::with_capacity(sig.results.len());
        for (i, result) in sig.results.iter().enumerate() {
            match classify(self.universe, result.typ)? {
                SlotKind::Pluggable => {
                    return Err(CompilerError::PluggableResult {
                        contract: contract.to_string(),
                        method: name.to_string(),
                    })
                }
                SlotKind::Any => self.warn(WarningKind::AnySlot, contract, name, Slot::Result(i)),
                SlotKind::ErrorLike if self.allow_raw_errors => {
                    self.warn(WarningKind::RawErrorSlot, contract, name, Slot::Result(i))
                }
                _ => {}
            }
            results.push(Var {
                name: result.name.clone(),
                typ: result.typ,
                contract: None,
            });
        }

        Ok(Method {
            name: name.to_string(),
            params,
            results,
            variadic: sig.variadic,
        })
    }

    /// The packed trailing parameter must be a slice (or a string spread as
    /// bytes) and must not carry callbacks.
    fn check_variadic(
        &self,
        contract: &str,
        method: &str,
        last: Option<&Param>,
    ) -> Result<(), CompilerError> {
        let malformed = || CompilerError::MalformedVariadic {
            contract: contract.to_string(),
            method: method.to_string(),
        };

        let last = last.ok_or_else(malformed)?;
        let underlying = self.universe.underlying(last.typ).map_err(|_| malformed())?;
        match self.universe.get(underlying) {
            TypeDescriptor::Slice(elem) => {
                if classify(self.universe, *elem)? == SlotKind::Pluggable {
                    return Err(CompilerError::VariadicCallback {
                        contract: contract.to_string(),
                        method: method.to_string(),
                    });
                }
                Ok(())
            }
            TypeDescriptor::Primitive(crate::ir::Primitive::String) => Ok(()),
            _ => Err(malformed()),
        }
    }

    fn warn(&mut self, kind: WarningKind, contract: &str, method: &str, slot: Slot) {
        let warning = Warning {
            kind,
            contract: contract.to_string(),
            method: method.to_string(),
            slot,
        };
        warn!("{}", warning);
        self.warnings.push(warning);
    }
}

/// Orders discovered contracts by signature and rewrites back-references to
/// the sorted positions.
fn sort_contracts(discovered: Vec<Option<InterfaceContract>>) -> ContractGraph {
    let mut contracts: Vec<InterfaceContract> = discovered.into_iter().flatten().collect();
    contracts.sort_by(|a, b| a.signature.cmp(&b.signature));

    let mut remap = vec![0; contracts.len()];
    for (position, contract) in contracts.iter().enumerate() {
        remap[contract.id.0] = position;
    }

    let contracts = contracts
        .into_iter()
        .enumerate()
        .map(|(position, contract)| InterfaceContract {
            id: ContractId(position),
            methods: contract
                .methods
                .into_iter()
                .map(|method| Method {
                    params: method
                        .params
                        .into_iter()
                        .map(|var| Var {
                            contract: var.contract.map(|id| ContractId(remap[id.0])),
                            ..var
                        })
                        .collect(),
                    ..method
                })
                .collect(),
            ..contract
        })
        .collect();

    ContractGraph::from_sorted(contracts)
}
