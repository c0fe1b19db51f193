//! symload - Symbol Resolution Probe
//!
//! Reads an autoload manifest and reports, for each symbol, which lookup
//! strategy and unit path the resolver would use. Nothing is loaded.

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::Parser;
use symload::autoload::MANIFEST_FILE;
use symload::{FsLoader, Manifest};
use tracing::Level;

#[derive(Parser, Debug)]
#[command(name = "symload", version, about = "Show where symbols would be loaded from")]
struct Cli {
    /// Manifest file [default: ./symload.toml]
    #[arg(short, long)]
    manifest: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Symbols to locate (e.g. 'App\Models\User')
    #[arg(required = true)]
    symbols: Vec<String>,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let manifest_path = cli
        .manifest
        .unwrap_or_else(|| PathBuf::from(MANIFEST_FILE));
    let manifest = match Manifest::load(&manifest_path) {
        Ok(manifest) => manifest,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(2);
        }
    };

    let autoloader = manifest.build(Arc::new(FsLoader::read_only()));

    let mut missing = 0;
    for symbol in &cli.symbols {
        match autoloader.locate(symbol) {
            Some(located) => println!("{}\t{}", symbol, located),
            None => {
                println!("{}\tnot found", symbol);
                missing += 1;
            }
        }
    }

    if missing > 0 {
        process::exit(1);
    }
}
