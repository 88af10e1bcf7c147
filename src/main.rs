#![forbid(unsafe_code)]

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use packgen::{pack, ModelTrailerPolicy, PackOptions};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: packgen <output> <input...>";

#[derive(Debug, Parser)]
#[command(name = "packgen", version, about = "Pack converted assets into a resource pack")]
struct Cli {
    /// Output pack file.
    output: PathBuf,

    /// Input files, packed in the order given.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Model trailer handling: `strip` records extents, `generic` packs models verbatim.
    #[arg(long, value_name = "MODE")]
    model_trailers: Option<ModelTrailerPolicy>,

    /// TOML file with build options; flags take precedence.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// More logging on stderr (repeatable).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => {
            eprintln!("{e}");
            eprintln!("{USAGE}");
            std::process::exit(1);
        }
    };

    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let mut options = match &cli.config {
        Some(path) => PackOptions::from_toml_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => PackOptions::default(),
    };
    if let Some(policy) = cli.model_trailers {
        options = options.with_model_trailers(policy);
    }

    pack(&cli.output, &cli.inputs, &options)
        .with_context(|| format!("failed to build {}", cli.output.display()))?;

    Ok(())
}
