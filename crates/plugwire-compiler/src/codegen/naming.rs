//! Generated identifiers.
//!
//! Contract names are assigned once per generation run, in graph order. Every
//! top-level identifier is then claimed in a [`NameTable`] so two contracts
//! that would produce the same declaration fail the run instead of emitting
//! conflicting code.

use std::collections::HashMap;

use tracing::debug;

use crate::diagnostic::CompilerError;
use crate::ir::{ContractGraph, ContractId, InterfaceContract};

const ANONYMOUS_PREFIX: &str = "AnonymousInterface";

/// Local identifier of the i-th parameter.
pub fn param_local(i: usize) -> String {
    format!("p{i}")
}

/// Record field holding the i-th parameter.
pub fn param_field(i: usize) -> String {
    format!("P{i}")
}

/// Record field holding the sub-channel id of the i-th parameter.
pub fn param_id_field(i: usize) -> String {
    format!("P{i}ID")
}

/// Local holding the allocated sub-channel id of the i-th parameter.
pub fn param_id_local(i: usize) -> String {
    format!("p{i}id")
}

/// Local holding the nested proxy's transport handle on the server side.
pub fn param_rpc_local(i: usize) -> String {
    format!("p{i}rpc")
}

pub fn result_local(i: usize) -> String {
    format!("r{i}")
}

pub fn result_field(i: usize) -> String {
    format!("R{i}")
}

/// Names of every contract in one graph.
#[derive(Debug, Clone, Default)]
pub struct ContractNames {
    names: Vec<String>,
    next_anonymous: usize,
}

impl ContractNames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns a name to every contract: its source name when it has one,
    /// otherwise the next `AnonymousInterfaceN`.
    pub fn assign(&mut self, graph: &ContractGraph) {
        self.names.clear();
        self.next_anonymous = 0;

        for contract in graph {
            let name = match &contract.name {
                Some(name) => name.clone(),
                None => {
                    let name = format!("{ANONYMOUS_PREFIX}{}", self.next_anonymous);
                    self.next_anonymous += 1;
                    debug!(contract = %contract.signature, %name, "named anonymous contract");
                    name
                }
            };
            self.names.push(name);
        }
    }

    pub fn interface(&self, id: ContractId) -> &str {
        &self.names[id.index()]
    }

    pub fn plugin(&self, id: ContractId) -> String {
        format!("{}Plugin", self.interface(id))
    }

    pub fn client(&self, id: ContractId) -> String {
        format!("{}RPCClient", self.interface(id))
    }

    pub fn server(&self, id: ContractId) -> String {
        format!("{}RPCServer", self.interface(id))
    }

    pub fn params_record(&self, id: ContractId, method: &str) -> String {
        format!("{}_{method}Params", self.interface(id))
    }

    pub fn results_record(&self, id: ContractId, method: &str) -> String {
        format!("{}_{method}Results", self.interface(id))
    }

    /// The remote method name: `Contract.Method`.
    pub fn remote_method(&self, id: ContractId, method: &str) -> String {
        format!("{}.{method}", self.interface(id))
    }

    /// Every top-level identifier generated for `contract`.
    pub fn declared_by(&self, contract: &InterfaceContract) -> Vec<String> {
        let id = contract.id;
        let mut names = Vec::new();
        if contract.is_anonymous() {
            names.push(self.interface(id).to_string());
        }
        names.push(self.plugin(id));
        names.push(format!("New{}", self.plugin(id)));
        names.push(self.client(id));
        names.push(format!("New{}", self.client(id)));
        names.push(self.server(id));
        names.push(format!("New{}", self.server(id)));
        for method in &contract.methods {
            if !method.params.is_empty() {
                names.push(self.params_record(id, &method.name));
            }
            if !method.results.is_empty() {
                names.push(self.results_record(id, &method.name));
            }
        }
        names
    }
}

/// Names every contract in `graph` and fails on the first generated
/// identifier two contracts would both declare.
pub fn check_collisions(graph: &ContractGraph) -> Result<ContractNames, CompilerError> {
    let mut names = ContractNames::new();
    names.assign(graph);
    NameTable::new().claim_graph(graph, &names)?;
    Ok(names)
}

/// Claimed top-level identifiers and who claimed them.
#[derive(Debug, Default)]
pub struct NameTable {
    owners: HashMap<String, String>,
}

impl NameTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn claim(&mut self, name: &str, owner: &str) -> Result<(), CompilerError> {
        match self.owners.get(name) {
            Some(first) if first != owner => Err(CompilerError::NameCollision {
                name: name.to_string(),
                first: first.clone(),
                second: owner.to_string(),
            }),
            Some(_) => Ok(()),
            None => {
                self.owners.insert(name.to_string(), owner.to_string());
                Ok(())
            }
        }
    }

    /// Claims every identifier of every contract in `graph`.
    pub fn claim_graph(
        &mut self,
        graph: &ContractGraph,
        names: &ContractNames,
    ) -> Result<(), CompilerError> {
        for contract in graph {
            for name in names.declared_by(contract) {
                self.claim(&name, &contract.signature)?;
            }
        }
        Ok(())
    }
}
