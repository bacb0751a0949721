//! Slipscan CLI - pull the payment date and amount out of a slip photo.
//!
//! The image is validated, shrunk to the model's input bound and sent to a
//! multimodal model on AWS Bedrock. The answer is printed as the model wrote it.
//!
//! # Usage
//!
//! ```bash
//! # Extract from a slip
//! slipscan extract slip.jpg
//!
//! # Same, as JSON with image details
//! slipscan extract slip.jpg --format json --output result.json
//!
//! # Check an upload without calling the model
//! slipscan check slip.jpg
//!
//! # Guided mode
//! slipscan
//! ```

use std::io::IsTerminal;

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Slipscan - payment details from receipt and payment-slip images.
#[derive(Parser, Debug)]
#[command(name = "slipscan")]
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
    command: Option<Commands>,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Extract the payment date and amount from an image
    Extract(cli::extract::ExtractArgs),

    /// Validate and resize an image without calling the model
    Normalize(cli::normalize::NormalizeArgs),

    /// Report whether an image would be accepted
    Check(cli::check::CheckArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so config warnings go through eprintln.
    let config = match slipscan_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `slipscan config path`."
            );
            slipscan_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Slipscan v{}", slipscan_core::VERSION);

    match cli.command {
        Some(Commands::Extract(args)) => cli::extract::execute(args, config).await,
        Some(Commands::Normalize(args)) => cli::normalize::execute(args, config).await,
        Some(Commands::Check(args)) => cli::check::execute(args, config).await,
        Some(Commands::Config(args)) => cli::config::execute(args).await,
        None if std::io::stdin().is_terminal() && std::io::stderr().is_terminal() => {
            cli::interactive::run(&config).await
        }
        None => {
            use clap::CommandFactory;
            Cli::command().print_help()?;
            Ok(())
        }
    }
}
