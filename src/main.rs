//! bestiary command line
//!
//! Usage:
//!   bestiary fetch                 # SRD API -> JSON document
//!   bestiary emit                  # JSON document -> one module per band
//!   bestiary split --max-lines 250 # JSON document -> size-bounded modules
//!
//! Every subcommand accepts `--config <file.toml>`; without it the built-in
//! defaults are used.

use bestiary::{Config, Document, EmitReport, Fetcher, Result, emit_chunked, emit_single};
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "bestiary", version)]
#[command(about = "Fetch SRD monsters and emit TypeScript data modules")]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch monsters from the SRD API and save the JSON document
    Fetch,
    /// Write one TypeScript module per challenge rating band
    Emit,
    /// Write size-bounded TypeScript modules per challenge rating band
    Split {
        /// Estimated line limit per generated module
        #[arg(long)]
        max_lines: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "bestiary failed");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

async fn run(args: Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    match args.command {
        Command::Fetch => {
            let fetcher = Fetcher::new(config.fetch.clone())?;
            let (document, report) = fetcher.run().await?;
            document.save(&config.document_path)?;
            info!(
                path = %config.document_path.display(),
                total = document.total(),
                listed = report.listed,
                "saved document"
            );
        }
        Command::Emit => {
            let document = Document::load(&config.document_path)?;
            summarize(&emit_single(&document, &config.emit)?);
        }
        Command::Split { max_lines } => {
            if let Some(max_lines) = max_lines {
                config.emit.max_lines = max_lines;
                config.validate()?;
            }
            let document = Document::load(&config.document_path)?;
            summarize(&emit_chunked(&document, &config.emit)?);
        }
    }

    Ok(())
}

fn summarize(report: &EmitReport) {
    info!(
        files = report.files.len(),
        records = report.records(),
        removed = report.removed.len(),
        "done"
    );
}
