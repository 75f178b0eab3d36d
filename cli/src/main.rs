//! chainactions CLI — classify raw transaction bundles from the terminal.
//!
//! Usage:
//! ```bash
//! # Classify a saved provider bundle
//! chainactions classify --chain base --file tx.json
//!
//! # Classify from stdin, output as JSON
//! cat tx.json | chainactions classify --chain solana --json
//! ```

use std::env;
use std::io::Read;
use std::process;
use std::sync::Arc;

use chainactions_core::{Chain, Normalizer};
use chainactions_evm::EvmActionClassifier;
use chainactions_solana::SolanaActionClassifier;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    match args[1].as_str() {
        "classify" => cmd_classify(&args[2..]),
        "help" | "--help" | "-h" => {
            print_usage();
        }
        "version" | "--version" | "-V" => {
            println!("chainactions {}", env!("CARGO_PKG_VERSION"));
        }
        other => {
            eprintln!("Unknown command: {other}");
            print_usage();
            process::exit(1);
        }
    }
}

fn print_usage() {
    println!("chainactions {}", env!("CARGO_PKG_VERSION"));
    println!("Classify raw blockchain transactions into actions\n");
    println!("USAGE:");
    println!("    chainactions <COMMAND>\n");
    println!("COMMANDS:");
    println!("    classify  Classify a raw transaction bundle");
    println!("    version   Print version");
    println!("    help      Print this help\n");
    println!("CLASSIFY FLAGS:");
    println!("    --chain <TAG>     Chain tag (base | solana)  [required]");
    println!("    --file <PATH>     Bundle JSON file (default: stdin)");
    println!("    --json            Output as JSON");
}

fn cmd_classify(args: &[String]) {
    let mut chain_tag: Option<&str> = None;
    let mut file: Option<&str> = None;
    let mut as_json = false;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--chain" => {
                i += 1;
                chain_tag = args.get(i).map(|s| s.as_str());
            }
            "--file" => {
                i += 1;
                file = args.get(i).map(|s| s.as_str());
            }
            "--json" => as_json = true,
            flag => {
                eprintln!("Unknown flag: {flag}");
                process::exit(1);
            }
        }
        i += 1;
    }

    let chain_tag = match chain_tag {
        Some(tag) => tag,
        None => {
            eprintln!("Error: --chain is required");
            process::exit(1);
        }
    };
    if Chain::from_tag(chain_tag).is_none() {
        eprintln!("Error: unsupported chain '{chain_tag}' (expected base or solana)");
        process::exit(1);
    }

    let input = match read_input(file) {
        Ok(input) => input,
        Err(e) => {
            eprintln!("Error reading input: {e}");
            process::exit(1);
        }
    };
    let raw: serde_json::Value = match serde_json::from_str(&input) {
        Ok(raw) => raw,
        Err(e) => {
            eprintln!("Error: invalid bundle JSON: {e}");
            process::exit(1);
        }
    };

    let mut normalizer = Normalizer::new();
    normalizer.register(Arc::new(EvmActionClassifier::new()));
    normalizer.register(Arc::new(SolanaActionClassifier::new()));

    let actions = normalizer.normalize(&raw, chain_tag);

    if as_json {
        match serde_json::to_string_pretty(&actions) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("JSON serialization error: {e}");
                process::exit(1);
            }
        }
    } else {
        for (index, action) in actions.iter().enumerate() {
            let marker = if action.primary { "*" } else { " " };
            println!("{marker} {}. {action}", index + 1);
        }
    }
}

fn read_input(file: Option<&str>) -> std::io::Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path),
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}
