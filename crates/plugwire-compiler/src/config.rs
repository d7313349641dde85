//! Compiler configuration.

use std::path::PathBuf;

/// Options consumed by the stub generator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GeneratorOptions {
    /// Pass error-like values through as-is instead of wrapping them in the
    /// message-only carrier.
    pub allow_raw_error_passthrough: bool,

    /// Generated clients terminate the process on transport failure instead
    /// of logging and returning zero values.
    pub treat_transport_failure_as_fatal: bool,
}

/// Configuration for the plugwire compiler.
#[derive(Debug, Clone)]
pub struct CompilerConfig {
    /// Contract file, or directory of contract files.
    pub contracts_path: PathBuf,

    /// Names of the root contracts to generate.
    pub roots: Vec<String>,

    /// Output file. `None` or `-` writes to stdout.
    pub out_path: Option<PathBuf>,

    /// Contract file format (default: "json").
    pub format: String,

    /// Output emitter (default: "outline").
    pub emit: String,

    pub options: GeneratorOptions,

    /// Banner placed at the top of the generated output.
    pub header_comment: String,
}

impl CompilerConfig {
    /// Whether output goes to stdout.
    pub fn writes_to_stdout(&self) -> bool {
        match &self.out_path {
            None => true,
            Some(path) => path.as_os_str() == "-",
        }
    }
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            contracts_path: PathBuf::from("contracts"),
            roots: Vec::new(),
            out_path: None,
            format: "json".to_string(),
            emit: "outline".to_string(),
            options: GeneratorOptions::default(),
            header_comment: "Code generated by plugwire; DO NOT EDIT.".to_string(),
        }
    }
}
