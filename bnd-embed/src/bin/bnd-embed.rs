//! CLI entry point for bnd-embed.

use std::path::PathBuf;

use anyhow::Result;
use bnd_embed::Target;
use clap::Parser;

/// bnd-embed: generate C and Java bindings from managed declarations.
#[derive(Parser, Debug)]
#[command(name = "bnd-embed", version, about)]
struct Cli {
    /// Path to the bnd-embed.toml configuration file.
    #[arg(default_value = "bnd-embed.toml")]
    config: PathBuf,

    /// Output directory (overrides config).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Restrict generation to these targets (repeatable).
    #[arg(short, long, value_enum)]
    target: Vec<Target>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("bnd_embed=info")),
        )
        .init();

    let cli = Cli::parse();
    bnd_embed::run(&cli.config, cli.output.as_deref(), &cli.target)?;
    Ok(())
}
