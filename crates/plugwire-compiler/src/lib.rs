//! # plugwire compiler
//!
//! This crate turns interface contracts into the declarations of an
//! out-of-process plugin: a client proxy that forwards every call over RPC, a
//! server dispatcher that invokes the real implementation, and the wiring
//! that lets callback arguments cross the process boundary in both
//! directions.
//!
//! ## Architecture
//!
//! ```text
//! Contract files (JSON)
//!        │
//!        ▼
//! ┌──────────────┐
//! │   Frontend   │  Load and resolve contract types
//! │ (→ universe) │
//! └──────┬───────┘
//!        │
//!        ▼
//! ┌──────────────┐
//! │   Analyze    │  Reachable contracts, deduplicated
//! │  (→ graph)   │  and validated
//! └──────┬───────┘
//!        │
//!        ▼
//! ┌──────────────┐
//! │   Codegen    │  Plugin, client, server, records,
//! │  (→ decls)   │  handshake fingerprint
//! └──────┬───────┘
//!        │
//!        ▼
//! ┌──────────────┐
//! │     Emit     │  Outline or JSON text
//! └──────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use plugwire_compiler::{Compiler, CompilerConfig};
//!
//! let config = CompilerConfig {
//!     contracts_path: "contracts/thinger.json".into(),
//!     roots: vec!["Thinger".to_string()],
//!     ..CompilerConfig::default()
//! };
//!
//! let result = Compiler::new(config).compile()?;
//! println!("{}", result.fingerprint);
//! ```

pub mod analyze;
pub mod codegen;
pub mod config;
pub mod diagnostic;
pub mod emit;
pub mod encode;
pub mod frontend;
pub mod ir;

use tracing::debug;

pub use analyze::{Analysis, InterfaceGraphAnalyzer};
pub use codegen::{Fingerprint, GeneratedStubs, StubGenerator};
pub use config::{CompilerConfig, GeneratorOptions};
pub use diagnostic::{CompilerError, Warning};

use frontend::ContractSet;
use ir::{TypeId, TypeUniverse};

/// Analysis and generated stubs for one root set.
#[derive(Debug, Clone)]
pub struct Generation {
    pub analysis: Analysis,
    pub stubs: GeneratedStubs,
}

/// Analyzes `roots` and generates their stubs.
///
/// Nothing is generated when analysis fails.
pub fn generate(
    universe: &TypeUniverse,
    roots: &[TypeId],
    options: GeneratorOptions,
) -> Result<Generation, CompilerError> {
    let analysis =
        InterfaceGraphAnalyzer::new(universe, options.allow_raw_error_passthrough).analyze_all(roots)?;
    debug!(
        contracts = analysis.contracts.len(),
        warnings = analysis.warnings.len(),
        "analysis complete"
    );
    let stubs = StubGenerator::new(universe, options).generate(&analysis.contracts)?;
    Ok(Generation { analysis, stubs })
}

/// The main compiler struct that orchestrates the compilation pipeline.
pub struct Compiler {
    config: CompilerConfig,
}

/// Summary of a compile run.
#[derive(Debug, Clone)]
pub struct CompileResult {
    /// Number of contracts generated.
    pub contracts: usize,
    /// Number of declarations emitted.
    pub declarations: usize,
    pub fingerprint: Fingerprint,
    pub warnings: Vec<Warning>,
    /// The rendered output. Also written to the configured output file, if
    /// any.
    pub output: String,
}

impl Compiler {
    /// Creates a new compiler with the given configuration.
    pub fn new(config: CompilerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Compiles the configured contracts.
    ///
    /// This runs the full pipeline:
    /// 1. Load contract files into a type universe
    /// 2. Resolve the root contract names
    /// 3. Analyze the contract graph
    /// 4. Generate declarations and the handshake fingerprint
    /// 5. Emit and write output
    pub fn compile(&self) -> Result<CompileResult, CompilerError> {
        // Emitter first, so an unknown name fails before any work.
        let emitter = emit::create_emitter(&self.config.emit)?;

        let set = self.load()?;
        let roots = set.lookup_roots(&self.config.roots)?;
        let generation = generate(&set.universe, &roots, self.config.options)?;

        debug!(emitter = emitter.name(), "emitting declarations");
        let output = emitter.emit(&self.config.header_comment, &generation.stubs.declarations)?;
        self.write_output(&output)?;

        Ok(CompileResult {
            contracts: generation.analysis.contracts.len(),
            declarations: generation.stubs.declarations.len(),
            fingerprint: generation.stubs.fingerprint,
            warnings: generation.analysis.warnings,
            output,
        })
    }

    /// Validates the configured contracts without generating code.
    pub fn check(&self) -> Result<Analysis, CompilerError> {
        let set = self.load()?;
        let roots = set.lookup_roots(&self.config.roots)?;
        let analysis = InterfaceGraphAnalyzer::new(
            &set.universe,
            self.config.options.allow_raw_error_passthrough,
        )
        .analyze_all(&roots)?;
        codegen::naming::check_collisions(&analysis.contracts)?;
        Ok(analysis)
    }

    /// Computes the handshake fingerprint of the configured contracts.
    pub fn fingerprint(&self) -> Result<Fingerprint, CompilerError> {
        let set = self.load()?;
        let roots = set.lookup_roots(&self.config.roots)?;
        Ok(generate(&set.universe, &roots, self.config.options)?.stubs.fingerprint)
    }

    fn load(&self) -> Result<ContractSet, CompilerError> {
        let mut loader = frontend::create_loader(&self.config.format)?;
        debug!(
            format = loader.format(),
            path = %self.config.contracts_path.display(),
            "loading contracts"
        );
        loader.load(&self.config.contracts_path)
    }

    /// Writes output to the configured file. Stdout output is left to the
    /// caller.
    fn write_output(&self, output: &str) -> Result<(), CompilerError> {
        if self.config.writes_to_stdout() {
            return Ok(());
        }
        let Some(path) = &self.config.out_path else {
            return Ok(());
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| CompilerError::io(parent, e.to_string()))?;
        }
        std::fs::write(path, output).map_err(|e| CompilerError::io(path, e.to_string()))?;
        debug!(path = %path.display(), "wrote output");
        Ok(())
    }
}
