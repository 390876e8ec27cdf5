//! cortical - Cortical.io API client
//!
//! Entry point for the cortical command-line tool.

use clap::Parser;
use cortical::cli::{Cli, Commands, ConfigCommands};
use cortical::config::{Config, LogFormat, LoggingConfig};
use cortical::error::exit_code;
use cortical::{CorticalClient, CorticalError, Params};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::from(e.exit_code() as u8);
        }
    };

    // Initialize logging based on config and CLI flags
    if let Err(e) = init_logging(&cli, &config.logging) {
        eprintln!("Failed to initialize logging: {}", e);
        return ExitCode::from(exit_code::GENERAL_ERROR as u8);
    }

    // Execute the command
    match run(&cli, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

/// Initialize the tracing subscriber. Logs go to stderr.
fn init_logging(
    cli: &Cli,
    logging: &LoggingConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let level = cli.log_level().unwrap_or(logging.level.as_str());
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);

    match logging.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
    }
}

/// Main application logic.
fn run(cli: &Cli, config: &Config) -> cortical::Result<()> {
    let client = CorticalClient::with_config(config.client_config(cli.client_options()))?;

    tracing::debug!(config = ?client.config(), "Client configured");

    let runtime = tokio::runtime::Runtime::new().map_err(|e| {
        CorticalError::config_with_source("Failed to create async runtime", e)
    })?;

    runtime.block_on(async {
        match &cli.command {
            Commands::Retinas(args) => {
                let retinas = client.get_retinas(args.name.as_deref()).await?;
                print_json(&retinas)
            }
            Commands::Fingerprint(args) => {
                let fingerprint = client.get_fingerprint(&args.text, Params::new()).await?;
                print_json(&fingerprint)
            }
            Commands::Fingerprints(args) => {
                let fingerprints = client
                    .get_fingerprints(args.texts.as_slice(), Params::new())
                    .await?;
                print_json(&fingerprints)
            }
            Commands::Image(args) => {
                let image = client.get_image(&args.term, Params::new()).await?;
                tokio::fs::write(&args.output, &image).await?;

                tracing::info!(
                    term = %args.term,
                    output = %args.output.display(),
                    bytes = image.len(),
                    "Image written"
                );
                Ok(())
            }
            Commands::Config(subcmd) => cmd_config(cli, config, subcmd),
        }
    })
}

/// Handle the `config` subcommand.
fn cmd_config(cli: &Cli, config: &Config, subcmd: &ConfigCommands) -> cortical::Result<()> {
    match subcmd {
        ConfigCommands::Validate => {
            println!("✓ Configuration is valid");
            tracing::debug!(?config.logging, "Validated configuration");
            Ok(())
        }
        ConfigCommands::Show => {
            let mut shown = config.clone();
            shown.client = shown.client.merge(cli.client_options());
            if shown.client.key.is_some() {
                shown.client.key = Some("<redacted>".to_string());
            }

            let yaml = serde_yaml::to_string(&shown).map_err(|e| {
                CorticalError::config_with_source("Failed to serialize configuration", e)
            })?;
            println!("{}", yaml);
            Ok(())
        }
    }
}

/// Print a value as pretty JSON on stdout.
fn print_json<T: serde::Serialize>(value: &T) -> cortical::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Load configuration with error handling.
fn load_config(cli: &Cli) -> cortical::Result<Config> {
    Config::load(cli.config.as_deref())
}
