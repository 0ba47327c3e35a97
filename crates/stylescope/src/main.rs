//! Stylescope CLI - zero-shot fashion style classification.
//!
//! Classifies an image against a vocabulary of style labels with a local CLIP
//! model and prints either the dominant style or the full distribution.
//!
//! # Usage
//!
//! ```bash
//! # Dominant style of one image
//! stylescope classify look.jpg
//!
//! # Full distribution over custom labels
//! stylescope classify look.jpg --mode distribution --label "goth style" --label "emo style"
//!
//! # Exercise downstream consumers without a model
//! stylescope classify look.jpg --mock --mode distribution
//!
//! # Manage models
//! stylescope models download
//! ```

use clap::{Parser, Subcommand};
use stylescope_core::error::ConfigError;
use stylescope_core::Config;

mod cli;
mod logging;

/// Stylescope - zero-shot fashion style classification.
#[derive(Parser, Debug)]
#[command(name = "stylescope")]
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
    /// Classify an image against the style vocabulary
    Classify(cli::classify::ClassifyArgs),

    /// Download sample images
    Fetch(cli::fetch::FetchArgs),

    /// Summarize style trends from classified records
    Trends(cli::trends::TrendsArgs),

    /// Manage the CLIP model (download, list, path)
    Models(cli::models::ModelsArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let lenient = matches!(cli.command, Commands::Config(_));
    let config = config_or_default(Config::load(), lenient)?;
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Stylescope v{}", stylescope_core::VERSION);

    match cli.command {
        Commands::Classify(args) => cli::classify::execute(args, config).await,
        Commands::Fetch(args) => cli::fetch::execute(args, config).await,
        Commands::Trends(args) => cli::trends::execute(args, &config),
        Commands::Models(args) => cli::models::execute(args, &config).await,
        Commands::Config(args) => cli::config::execute(args, &config),
    }
}

/// Resolve the loaded configuration.
///
/// A broken config file is fatal, except for the `config` subcommands
/// (`lenient`), which fall back to the defaults so the file can be located
/// and regenerated.
fn config_or_default(loaded: Result<Config, ConfigError>, lenient: bool) -> anyhow::Result<Config> {
    match loaded {
        Ok(config) => Ok(config),
        Err(e) if lenient => {
            // Logging isn't initialized yet.
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `stylescope config path`."
            );
            Ok(Config::default())
        }
        Err(e) => Err(anyhow::Error::new(e).context(format!(
            "Invalid config file {}",
            Config::default_path().display()
        ))),
    }
}
