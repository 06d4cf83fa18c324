//! Easel CLI - file-level front end for the canvas document engine.
//!
//! File I/O lives here, not in the engine: the engine consumes and produces
//! bytes and values, and this binary wires it to paths on disk.

use anyhow::{Context, Result};
use clap::Parser;
use easel_core::{Engine, EngineConfig, MergeOptions, Resolution};
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "easel")]
#[command(about = "Easel - canvas document engine tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Validate a document and print any violations
    Validate {
        /// Document file path
        file: PathBuf,
    },
    /// Print the SHA-256 hash of a document's canonical form
    Hash {
        /// Document file path
        file: PathBuf,
    },
    /// Report version compatibility, or migrate to the current version
    Migrate {
        /// Document file path
        file: PathBuf,
        /// Write the migrated document back to the file
        #[arg(long)]
        write: bool,
    },
    /// Three-way merge two edited documents against their ancestor
    Merge {
        /// Common ancestor document
        base: PathBuf,
        /// Locally edited document
        local: PathBuf,
        /// Remotely edited document
        remote: PathBuf,
        /// Tie-break side for divergent edits
        #[arg(long, value_parser = ["local", "remote"])]
        prefer: Option<String>,
        /// Output path for the merged document (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print node and depth statistics for a document
    Stats {
        /// Document file path
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    let engine = Engine::new(EngineConfig::default());

    match cli.command {
        Commands::Validate { file } => {
            let bytes = read(&file)?;
            match engine.parse(&bytes) {
                Ok(_) => println!("{}: OK", file.display()),
                Err(err) => {
                    let wire = err.to_wire();
                    println!("{}", serde_json::to_string_pretty(&wire)?);
                    std::process::exit(1);
                }
            }
        }
        Commands::Hash { file } => {
            let bytes = read(&file)?;
            let doc = engine.parse(&bytes)?;
            println!("{}", engine.hash_hex(&doc)?);
        }
        Commands::Migrate { file, write } => {
            let bytes = read(&file)?;
            let raw: serde_json::Value =
                serde_json::from_slice(&bytes).context("file is not JSON")?;
            let report = engine.check_compatibility(&raw);
            if report.is_current {
                println!("{}: already at the current version", file.display());
                return Ok(());
            }
            let doc = engine.migrate(&raw)?;
            let out = engine.serialize(&doc)?;
            if write {
                fs::write(&file, &out)
                    .with_context(|| format!("writing {}", file.display()))?;
                println!(
                    "{}: migrated via {}",
                    file.display(),
                    report.path.join(" -> ")
                );
            } else {
                print!("{}", String::from_utf8_lossy(&out));
            }
        }
        Commands::Merge {
            base,
            local,
            remote,
            prefer,
            output,
        } => {
            let base_doc = engine.parse(&read(&base)?)?;
            let local_doc = engine.parse(&read(&local)?)?;
            let remote_doc = engine.parse(&read(&remote)?)?;

            let options = MergeOptions {
                resolution: match prefer.as_deref() {
                    Some("remote") => Resolution::PreferRemote,
                    Some("local") => Resolution::PreferLocal,
                    _ => Resolution::ReportOnly,
                },
                ..MergeOptions::default()
            };
            let outcome = engine.merge(&base_doc, &local_doc, &remote_doc, Some(options))?;

            let merged = engine.serialize(&outcome.merged)?;
            match output {
                Some(path) => {
                    fs::write(&path, &merged)
                        .with_context(|| format!("writing {}", path.display()))?;
                    println!("merged document written to {}", path.display());
                }
                None => print!("{}", String::from_utf8_lossy(&merged)),
            }
            if outcome.conflicts.is_empty() {
                eprintln!("0 conflicts");
            } else {
                eprintln!(
                    "{} conflict(s):\n{}",
                    outcome.conflicts.len(),
                    serde_json::to_string_pretty(&outcome.conflicts)?
                );
                std::process::exit(2);
            }
        }
        Commands::Stats { file } => {
            let bytes = read(&file)?;
            let doc = engine.parse(&bytes)?;
            let stats = engine.stats(&doc);
            println!("{}", serde_json::to_string_pretty(&stats)?);
            for warning in engine.budget_warnings(&doc) {
                eprintln!("warning: {warning}");
            }
        }
    }

    Ok(())
}

fn read(path: &PathBuf) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("reading {}", path.display()))
}
