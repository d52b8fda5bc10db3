//! Processor CLI: turn an EPUB into a servable book directory.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use reader3::processor;

/// Process an EPUB into a chapter-paginated book directory
#[derive(Parser, Debug)]
#[command(name = "process", version, about)]
struct Cli {
    /// Path to the input EPUB file
    input: PathBuf,

    /// Parent directory for the output. Defaults to the EPUB's own
    /// directory.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reader3=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let output_dir = processor::process(&cli.input, cli.output.as_deref())?;

    println!("{}", output_dir.display());
    Ok(())
}
