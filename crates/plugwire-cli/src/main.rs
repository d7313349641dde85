//! plugwire CLI.
//!
//! Generates out-of-process plugin stubs from interface contracts.

use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use plugwire_compiler::{Compiler, CompilerConfig, GeneratorOptions};

mod ui;

#[derive(Parser)]
#[command(name = "plugwire")]
#[command(about = "plugwire - generates RPC plugin stubs from interface contracts")]
#[command(version)]
struct Cli {
    /// Log filter (e.g. `debug`, `plugwire_compiler=trace`)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

/// Where the contracts live and which of them to generate.
#[derive(Args)]
struct ContractArgs {
    /// Contract file or directory of contract files
    path: PathBuf,

    /// Root contract names, comma separated
    #[arg(short = 't', long = "type", value_delimiter = ',', required = true)]
    types: Vec<String>,

    /// Contract file format
    #[arg(short, long, default_value = "json")]
    format: String,

    /// Pass error values through unwrapped
    #[arg(long)]
    allow_raw_errors: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate plugin stubs
    Generate {
        #[command(flatten)]
        contracts: ContractArgs,

        /// Output file (stdout when omitted or `-`)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output rendering (`outline` or `json`)
        #[arg(short, long, default_value = "outline")]
        emit: String,

        /// Abort the process when a remote call fails instead of logging
        #[arg(long)]
        strict_transport: bool,

        /// Header comment for the generated output
        #[arg(long)]
        header: Option<String>,
    },

    /// Validate contracts without generating code
    Check {
        #[command(flatten)]
        contracts: ContractArgs,
    },

    /// Print the handshake fingerprint of a contract set
    Fingerprint {
        #[command(flatten)]
        contracts: ContractArgs,
    },
}

impl ContractArgs {
    fn into_config(self) -> CompilerConfig {
        CompilerConfig {
            contracts_path: self.path,
            roots: self.types,
            format: self.format,
            options: GeneratorOptions {
                allow_raw_error_passthrough: self.allow_raw_errors,
                ..GeneratorOptions::default()
            },
            ..CompilerConfig::default()
        }
    }
}

fn main() -> miette::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match cli.command {
        Commands::Generate {
            contracts,
            output,
            emit,
            strict_transport,
            header,
        } => {
            let mut config = contracts.into_config();
            config.out_path = output;
            config.emit = emit;
            config.options.treat_transport_failure_as_fatal = strict_transport;
            if let Some(header) = header {
                config.header_comment = header;
            }
            generate(config)
        }
        Commands::Check { contracts } => check(contracts.into_config()),
        Commands::Fingerprint { contracts } => {
            let compiler = Compiler::new(contracts.into_config());
            let fingerprint = compiler.fingerprint().inspect_err(|_| ui::error_header())?;
            println!("{}", fingerprint);
            Ok(())
        }
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn generate(config: CompilerConfig) -> miette::Result<()> {
    let start = Instant::now();
    let to_stdout = config.writes_to_stdout();
    let out_path = config.out_path.clone();

    let compiler = Compiler::new(config);
    let result = compiler.compile().inspect_err(|_| ui::error_header())?;

    if to_stdout {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(result.output.as_bytes()).into_diagnostic()?;
        stdout.flush().into_diagnostic()?;
    }

    ui::success(&ui::summary(&[
        ui::count(result.contracts, "contract"),
        ui::count(result.declarations, "declaration"),
        ui::count(result.warnings.len(), "warning"),
    ]));
    ui::fingerprint(&result.fingerprint);
    if let (false, Some(path)) = (to_stdout, out_path) {
        ui::info(&format!("wrote {}", path.display()));
    }
    ui::timing("Done", start.elapsed().as_millis());

    Ok(())
}

fn check(config: CompilerConfig) -> miette::Result<()> {
    let compiler = Compiler::new(config);
    let analysis = compiler.check().inspect_err(|_| ui::error_header())?;

    for contract in &analysis.contracts {
        let label = contract.name.as_deref().unwrap_or("(anonymous)");
        ui::contract_line(label, contract.methods.len());
    }
    ui::success(&ui::summary(&[
        ui::count(analysis.contracts.len(), "contract"),
        ui::count(analysis.warnings.len(), "warning"),
    ]));

    Ok(())
}
