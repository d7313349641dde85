//! Compiler error types.
#![allow(unused_assignments)]

use std::path::PathBuf;
use miette::Diagnostic;
use thiserror::Error;

/// Errors that can occur while loading, analyzing, generating or emitting.
///
/// Analysis errors are fatal: the run stops and no declarations are produced.
#[allow(unused_assignments)]
#[derive(Error, Diagnostic, Debug)]
pub enum CompilerError {
    // =========================================================================
    // IO Errors
    // =========================================================================
    #[error("Failed to access '{}': {message}", path.display())]
    #[diagnostic(code(plugwire::io::access_failed))]
    IoError {
        path: PathBuf,
        message: String,
    },

    // =========================================================================
    // Load Errors
    // =========================================================================
    #[error("Invalid contract file '{}': {message}", path.display())]
    #[diagnostic(
        code(plugwire::load::invalid_contract_file),
        help("Contract files are JSON documents with a 'module' string and a 'types' table")
    )]
    InvalidContractFile {
        path: PathBuf,
        message: String,
    },

    #[error("Contract files declare different modules: '{first}' and '{second}'")]
    #[diagnostic(
        code(plugwire::load::mixed_modules),
        help("All contract files loaded together must belong to one module")
    )]
    MixedModules {
        first: String,
        second: String,
    },

    #[error("{module}.{name} not found")]
    #[diagnostic(
        code(plugwire::load::root_not_found),
        help("Root contracts must be declared in the loaded module or under 'externals'")
    )]
    RootNotFound {
        module: String,
        name: String,
    },

    #[error("Unresolved type: {name}")]
    #[diagnostic(code(plugwire::load::unresolved_type))]
    UnresolvedType {
        name: String,
    },

    #[error("Unsupported {kind} format: {format}")]
    #[diagnostic(code(plugwire::load::unsupported_format))]
    UnsupportedFormat {
        kind: &'static str,
        format: String,
    },

    // =========================================================================
    // Analysis Errors
    // =========================================================================
    #[error("Type '{type_name}' is not an interface")]
    #[diagnostic(
        code(plugwire::analysis::not_an_interface),
        help("Only interface types can be generated as plugin contracts")
    )]
    NotAnInterface {
        type_name: String,
    },

    #[error("Interface '{type_name}' embeds itself")]
    #[diagnostic(code(plugwire::analysis::embedding_cycle))]
    EmbeddingCycle {
        type_name: String,
    },

    #[error("Variadic interface arguments in {contract}.{method} are unsupported")]
    #[diagnostic(
        code(plugwire::analysis::variadic_callback),
        help("A call payload carries one sub-channel id per callback; pass a slice-typed contract or a fixed number of callbacks instead")
    )]
    VariadicCallback {
        contract: String,
        method: String,
    },

    #[error("Non-empty or error interface return in {contract}.{method} is unsupported")]
    #[diagnostic(
        code(plugwire::analysis::pluggable_result),
        help("A contract cannot return a live callback; accept the callback as a parameter instead")
    )]
    PluggableResult {
        contract: String,
        method: String,
    },

    #[error("Variadic method {contract}.{method} must end with a slice or string parameter")]
    #[diagnostic(code(plugwire::analysis::malformed_variadic))]
    MalformedVariadic {
        contract: String,
        method: String,
    },

    // =========================================================================
    // Code Generation Errors
    // =========================================================================
    #[error("Generated name '{name}' is claimed by both {first} and {second}")]
    #[diagnostic(
        code(plugwire::codegen::name_collision),
        help("Two contracts share a type name; rename one or generate them separately")
    )]
    NameCollision {
        name: String,
        first: String,
        second: String,
    },

    // =========================================================================
    // Emit Errors
    // =========================================================================
    #[error("Failed to emit declarations: {message}")]
    #[diagnostic(code(plugwire::emit::emit_failed))]
    EmitFailed {
        message: String,
    },
}

impl CompilerError {
    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::IoError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Whether this error comes from the contract-graph validation rules
    /// rather than from loading or output.
    pub fn is_analysis_error(&self) -> bool {
        matches!(
            self,
            Self::NotAnInterface { .. }
                | Self::EmbeddingCycle { .. }
                | Self::VariadicCallback { .. }
                | Self::PluggableResult { .. }
                | Self::MalformedVariadic { .. }
        )
    }
}
