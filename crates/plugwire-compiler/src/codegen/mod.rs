//! Stub generation from an analyzed contract graph.
//!
//! For each contract the generator declares:
//! - the contract itself, when it is an anonymous interface;
//! - a Plugin adapter with server and client factories;
//! - an RPC client proxy and an RPC server dispatcher;
//! - per-method Params/Results wire records.
//!
//! After the last contract it appends the handshake configuration carrying
//! the graph fingerprint, and the error-carrier registration when any slot
//! needed it.

pub mod decl;
pub mod handshake;
pub mod naming;
pub mod runtime;

mod client;
mod plugin;
mod records;
mod server;

use tracing::{debug, info};

use crate::analyze::classify::is_error_like;
use crate::config::GeneratorOptions;
use crate::diagnostic::CompilerError;
use crate::encode::{Encoder, ParamShape, Spread, TypeShape};
use crate::ir::{ContractGraph, ContractId, InterfaceContract, Method, TypeDescriptor, TypeUniverse, Var};
use decl::{Declaration, TypeDecl};
use handshake::{handshake_declaration, registration_declaration, HandshakeFingerprinter};
use naming::ContractNames;

pub use decl::{Expr, FailurePolicy, FieldInit, FunctionDecl, Receiver, Stmt, VariableDecl};
pub use handshake::{Fingerprint, MAGIC_COOKIE_KEY, PROTOCOL_VERSION};

/// Output of one generation run.
#[derive(Debug, Clone)]
pub struct GeneratedStubs {
    pub declarations: Vec<Declaration>,
    pub fingerprint: Fingerprint,
}

/// Generates stub declarations for contract graphs of one universe.
pub struct StubGenerator<'u> {
    universe: &'u TypeUniverse,
    options: GeneratorOptions,
    names: ContractNames,
}

impl<'u> StubGenerator<'u> {
    pub fn new(universe: &'u TypeUniverse, options: GeneratorOptions) -> Self {
        Self {
            universe,
            options,
            names: ContractNames::new(),
        }
    }

    /// Generates every declaration for `graph`, in graph order.
    pub fn generate(&mut self, graph: &ContractGraph) -> Result<GeneratedStubs, CompilerError> {
        self.names = naming::check_collisions(graph)?;

        let cx = Context {
            universe: self.universe,
            encoder: Encoder::new(self.universe),
            graph,
            names: &self.names,
            options: &self.options,
        };

        let mut declarations = Vec::new();
        let mut fingerprinter = HandshakeFingerprinter::new(cx.encoder);
        let mut wraps_errors = false;

        for contract in graph {
            info!(
                contract = cx.names.interface(contract.id),
                methods = contract.methods.len(),
                "generating plugin"
            );

            if contract.is_anonymous() {
                declarations.push(anonymous_declaration(&cx, contract));
            }
            declarations.extend(plugin::generate_plugin(&cx, contract));
            declarations.extend(client::generate_client_type(&cx, contract));
            declarations.extend(server::generate_server_type(&cx, contract));

            for method in &contract.methods {
                declarations.extend(records::generate_records(&cx, contract, method));
                declarations.push(client::generate_client_method(&cx, contract, method));
                declarations.push(server::generate_server_method(&cx, contract, method));
                wraps_errors |= method
                    .params
                    .iter()
                    .chain(&method.results)
                    .any(|var| cx.wraps_error(var));
            }

            fingerprinter.add(contract);
        }

        let fingerprint = fingerprinter.finish();
        debug!(%fingerprint, "computed handshake fingerprint");
        declarations.push(handshake_declaration(fingerprint));
        if wraps_errors {
            declarations.push(registration_declaration());
        }

        Ok(GeneratedStubs {
            declarations,
            fingerprint,
        })
    }
}

fn anonymous_declaration(cx: &Context<'_>, contract: &InterfaceContract) -> Declaration {
    let name = cx.names.interface(contract.id);
    Declaration::Type(TypeDecl {
        name: name.to_string(),
        doc: vec![format!(
            "{name} names an untyped interface. It should not be used directly."
        )],
        shape: cx.encoder.encode_underlying(contract.typ),
    })
}

/// Shared state of one generation run.
pub(crate) struct Context<'a> {
    pub universe: &'a TypeUniverse,
    pub encoder: Encoder<'a>,
    pub graph: &'a ContractGraph,
    pub names: &'a ContractNames,
    pub options: &'a GeneratorOptions,
}

impl Context<'_> {
    /// How a contract is referenced from generated code. Anonymous contracts
    /// go by their declared name.
    pub fn contract_type(&self, id: ContractId) -> TypeShape {
        let contract = self.graph.get(id);
        if contract.is_anonymous() {
            TypeShape::local(self.names.interface(id))
        } else {
            self.encoder.encode(contract.typ)
        }
    }

    pub fn var_type(&self, var: &Var) -> TypeShape {
        match var.contract {
            Some(id) => self.contract_type(id),
            None => self.encoder.encode(var.typ),
        }
    }

    /// Whether `var` crosses the wire inside the error carrier.
    pub fn wraps_error(&self, var: &Var) -> bool {
        !self.options.allow_raw_error_passthrough && is_error_like(self.universe, var.typ)
    }

    pub fn failure_policy(&self) -> decl::FailurePolicy {
        if self.options.treat_transport_failure_as_fatal {
            decl::FailurePolicy::Abort
        } else {
            decl::FailurePolicy::Log
        }
    }

    /// The i-th parameter as it appears in the contract's own method
    /// signature. A variadic tail is spread.
    pub fn method_param(&self, method: &Method, i: usize, name: String) -> ParamShape {
        let var = &method.params[i];
        if let Some(tail) = method.variadic_param().filter(|_| i + 1 == method.params.len()) {
            let underlying = self.universe.underlying(tail.typ).map(|u| self.universe.get(u));
            return match underlying {
                Ok(TypeDescriptor::Slice(elem)) => ParamShape {
                    name: Some(name),
                    typ: self.encoder.encode(*elem),
                    spread: Spread::Slice,
                },
                _ => ParamShape {
                    name: Some(name),
                    typ: self.var_type(tail),
                    spread: Spread::String,
                },
            };
        }
        ParamShape::named(name, self.var_type(var))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::InterfaceGraphAnalyzer;
    use crate::ir::{MethodSig, Param, Signature, TypeId};

    fn generate(universe: &TypeUniverse, roots: &[TypeId], options: GeneratorOptions) -> GeneratedStubs {
        let graph = InterfaceGraphAnalyzer::new(universe, options.allow_raw_error_passthrough)
            .analyze_all(roots)
            .unwrap()
            .contracts;
        StubGenerator::new(universe, options).generate(&graph).unwrap()
    }

    fn names(stubs: &GeneratedStubs) -> Vec<String> {
        stubs.declarations.iter().map(Declaration::name).collect()
    }

    fn checker(universe: &mut TypeUniverse) -> TypeId {
        let error = universe.error();
        let string = universe.string();
        let body = universe.interface(
            vec![MethodSig::new(
                "Check",
                Signature {
                    params: vec![Param::new(string)],
                    results: vec![Param::new(error)],
                    variadic: false,
                },
            )],
            Vec::new(),
        );
        universe.named(Some("example.com/check"), "Checker", body)
    }

    #[test]
    fn test_declaration_order() {
        let mut universe = TypeUniverse::new();
        let root = checker(&mut universe);
        let stubs = generate(&universe, &[root], GeneratorOptions::default());

        assert_eq!(
            names(&stubs),
            vec![
                "CheckerPlugin",
                "NewCheckerPlugin",
                "_",
                "CheckerPlugin.Server",
                "CheckerPlugin.Client",
                "CheckerRPCClient",
                "NewCheckerRPCClient",
                "_",
                "CheckerRPCServer",
                "NewCheckerRPCServer",
                "Checker_CheckParams",
                "Checker_CheckResults",
                "CheckerRPCClient.Check",
                "CheckerRPCServer.Check",
                "PluginHandshake",
                "init",
            ]
        );
    }

    #[test]
    fn test_raw_errors_skip_registration() {
        let mut universe = TypeUniverse::new();
        let root = checker(&mut universe);
        let options = GeneratorOptions {
            allow_raw_error_passthrough: true,
            ..GeneratorOptions::default()
        };
        let stubs = generate(&universe, &[root], options);
        assert_eq!(names(&stubs).last().map(String::as_str), Some("PluginHandshake"));
    }

    #[test]
    fn test_anonymous_contract_is_declared_once() {
        let mut universe = TypeUniverse::new();
        let string = universe.string();
        let callback = universe.interface(
            vec![MethodSig::new(
                "Done",
                Signature {
                    params: vec![Param::new(string)],
                    ..Signature::default()
                },
            )],
            Vec::new(),
        );
        let method = |name: &str| {
            MethodSig::new(
                name,
                Signature {
                    params: vec![Param::new(callback)],
                    ..Signature::default()
                },
            )
        };
        let body = universe.interface(vec![method("First"), method("Second")], Vec::new());
        let root = universe.named(Some("example.com/jobs"), "Jobs", body);

        let stubs = generate(&universe, &[root], GeneratorOptions::default());
        let anonymous: Vec<_> = stubs
            .declarations
            .iter()
            .filter(|d| d.name() == "AnonymousInterface0")
            .collect();
        assert_eq!(anonymous.len(), 1);
        assert!(anonymous[0].doc()[0].contains("should not be used directly"));
    }

    #[test]
    fn test_generation_is_reproducible() {
        let mut universe = TypeUniverse::new();
        let root = checker(&mut universe);
        let first = generate(&universe, &[root], GeneratorOptions::default());
        let second = generate(&universe, &[root], GeneratorOptions::default());
        assert_eq!(first.fingerprint, second.fingerprint);
        assert_eq!(first.declarations, second.declarations);
    }
}
