use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use folio::commands;

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Photo-portfolio catalog service", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// Config file (default: ./folio.toml if present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Override [server].port
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Validate a config file and print warnings
    Check {
        /// Config file (default: ./folio.toml if present)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config, port } => commands::serve::execute(config.as_deref(), port).await,
        Commands::Check { config } => commands::check::execute(config.as_deref()),
    }
}
