//! Tabula CLI - run edit scripts against an in-memory sheet

mod script;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tabula::Sheet;
use tracing_subscriber::EnvFilter;

use crate::script::PrintMode;

#[derive(Parser)]
#[command(name = "tabula")]
#[command(author, version, about = "In-memory spreadsheet engine")]
struct Cli {
    /// Log filter, e.g. `debug` or `tabula=trace` (default: RUST_LOG, then `warn`)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an edit script against an empty sheet and print the final grid
    Run {
        /// Script file, one command per line
        script: PathBuf,

        /// Print raw cell texts instead of computed values
        #[arg(long)]
        texts: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref())?;

    match cli.command {
        Commands::Run { script, texts } => {
            let mode = if texts {
                PrintMode::Texts
            } else {
                PrintMode::Values
            };
            run(&script, mode)
        }
    }
}

fn init_logging(level: Option<&str>) -> Result<()> {
    let filter = match level {
        Some(level) => EnvFilter::try_new(level)
            .with_context(|| format!("Invalid log level '{}'", level))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
    Ok(())
}

fn run(path: &Path, mode: PrintMode) -> Result<()> {
    tracing::info!(script = %path.display(), "running script");

    let input = script::open_script(path)?;
    let mut sheet = Sheet::new();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let stderr = io::stderr();
    let mut errors = stderr.lock();

    script::run_script(&mut sheet, input, &mut out, &mut errors)
        .with_context(|| format!("Failed to run '{}'", path.display()))?;

    script::print_sheet(&sheet, mode, &mut out)?;
    out.flush()?;

    let stats = sheet.stats();
    tracing::info!(
        cells = sheet.cell_count(),
        evaluations = stats.evaluations,
        invalidations = stats.invalidations,
        "done"
    );
    Ok(())
}
