//! Debug script to see what the analyzer produces for a contract file.
//!
//! Usage: `dump_contracts <contracts.json|dir> <Root>...`

use std::path::PathBuf;

use plugwire_compiler::frontend::create_loader;
use plugwire_compiler::InterfaceGraphAnalyzer;

fn main() -> miette::Result<()> {
    let mut args = std::env::args().skip(1);
    let Some(path) = args.next().map(PathBuf::from) else {
        eprintln!("usage: dump_contracts <contracts> <Root>...");
        std::process::exit(2);
    };
    let roots: Vec<String> = args.collect();

    let set = create_loader("json")?.load(&path)?;
    println!("Module: {}", set.module);
    println!("Declared:");
    for name in set.declared.keys() {
        println!("  {}", name);
    }

    let roots = set.lookup_roots(&roots)?;
    let analysis = InterfaceGraphAnalyzer::new(&set.universe, false).analyze_all(&roots)?;

    println!("\nContracts:");
    for contract in &analysis.contracts {
        println!("  [{}] {}", contract.id.index(), contract.signature);
        for method in &contract.methods {
            let nested: Vec<String> = method
                .params
                .iter()
                .enumerate()
                .filter_map(|(i, p)| p.contract.map(|id| format!("p{} -> [{}]", i, id.index())))
                .collect();
            println!(
                "    {} (params: {}, results: {}, variadic: {}) {}",
                method.name,
                method.params.len(),
                method.results.len(),
                method.variadic,
                nested.join(", ")
            );
        }
    }

    if !analysis.warnings.is_empty() {
        println!("\nWarnings:");
        for warning in &analysis.warnings {
            println!("  {}", warning);
        }
    }

    Ok(())
}
