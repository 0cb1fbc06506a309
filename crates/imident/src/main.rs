//! imident CLI - ImageMagick reports and failures as JSON.
//!
//! # Usage
//!
//! ```bash
//! # Describe an image (runs `identify -verbose`)
//! imident identify photo.jpg
//!
//! # Parse an already captured report or diagnostic
//! identify -verbose photo.gif | imident parse --format jsonl
//! imident classify stderr.txt
//!
//! # Transform an image (runs `convert`)
//! imident convert photo.jpg thumb.png --resize 200x200 --format png
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// imident - ImageMagick reports and failures as JSON.
#[derive(Parser, Debug)]
#[command(name = "imident")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse captured `identify -verbose` output into JSON
    Parse(cli::parse::ParseArgs),

    /// Classify captured ImageMagick stderr into a typed error
    Classify(cli::classify::ClassifyArgs),

    /// Run `identify -verbose` on an image and print the parsed report
    Identify(cli::identify::IdentifyArgs),

    /// Run `convert` on an image
    Convert(cli::convert::ConvertArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so use eprintln for config warnings.
    let config = match imident_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `imident config path`."
            );
            imident_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("imident v{}", imident_core::VERSION);

    match cli.command {
        Commands::Parse(args) => cli::parse::execute(args, &config).await,
        Commands::Classify(args) => cli::classify::execute(args, &config).await,
        Commands::Identify(args) => cli::identify::execute(args, &config).await,
        Commands::Convert(args) => cli::convert::execute(args, &config).await,
        Commands::Config(args) => cli::config::execute(args).await,
    }
}
