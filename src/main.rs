//! fwchain - render packet-filter rules and their fingerprints
//!
//! # Usage
//!
//! ```bash
//! fwchain render chains.json                   # -A commands for every rule
//! fwchain render chains.json --verb insert     # -I commands
//! fwchain render chains.json --verb replace -p -w
//! fwchain hashes chains.json                   # <chain> <position> <fingerprint>
//! fwchain --verbose hashes chains.json         # also log every hash step
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use fwchain::config;
use fwchain::core::chain::TracingObserver;
use fwchain::validators;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fwchain")]
#[command(about = "Render packet-filter rules and per-rule fingerprints", long_about = None)]
struct Cli {
    /// Log every hash step (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print one command per rule for every chain in the file
    Render {
        /// Chain definition file (JSON)
        file: PathBuf,
        /// Command verb to render
        #[arg(long, value_enum, default_value_t = Verb::Append)]
        verb: Verb,
        /// Fragment placed right after the chain name (and rule number); `HASH` is reserved
        #[arg(short, long, default_value = "", allow_hyphen_values = true)]
        prefix: String,
    },
    /// Print the fingerprint of every rule
    Hashes {
        /// Chain definition file (JSON)
        file: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Verb {
    Append,
    Insert,
    Replace,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match handle_cli(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn handle_cli(command: Commands) -> fwchain::Result<()> {
    match command {
        Commands::Render { file, verb, prefix } => {
            validators::validate_prefix(&prefix)
                .map_err(|message| fwchain::Error::validation("prefix", message))?;
            let chains = config::load_chain_file(&file)?;
            for chain in &chains.chains {
                let lines = match verb {
                    Verb::Append => chain.render_append_all(&prefix),
                    Verb::Insert => chain.render_insert_all(&prefix),
                    Verb::Replace => chain.render_replace_all(&prefix),
                };
                for line in lines {
                    println!("{line}");
                }
            }
        }
        Commands::Hashes { file } => {
            let chains = config::load_chain_file(&file)?;
            for chain in &chains.chains {
                let hashes = chain.rule_hashes_observed(&TracingObserver);
                for (idx, hash) in hashes.iter().enumerate() {
                    println!("{} {} {hash}", chain.name, idx + 1);
                }
            }
        }
    }
    Ok(())
}
