//! Command-line interface definition for cortical.
//!
//! This module defines the CLI structure using clap derive macros,
//! including all subcommands and their arguments.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{ClientOptions, ENV_CONFIG_PATH};

/// cortical - Cortical.io API client
///
/// Computes semantic fingerprints, lists retinas and renders fingerprint
/// images through the Cortical.io REST API.
#[derive(Debug, Parser)]
#[command(name = "cortical")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, env = ENV_CONFIG_PATH)]
    pub config: Option<PathBuf>,

    /// Increase verbosity (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// API key
    #[arg(long, global = true)]
    pub key: Option<String>,

    /// Base URL of the API
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Retina name
    #[arg(long, global = true)]
    pub retina: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Returns the log level forced by verbose/quiet flags, if any.
    pub fn log_level(&self) -> Option<&'static str> {
        if self.quiet {
            return Some("error");
        }

        match self.verbose {
            0 => None,
            1 => Some("debug"),
            _ => Some("trace"),
        }
    }

    /// Client options given on the command line.
    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            key: self.key.clone(),
            url: self.url.clone(),
            retina: self.retina.clone(),
            ..Default::default()
        }
    }
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List retinas, or describe one
    Retinas(RetinasArgs),

    /// Get the fingerprint of a text
    Fingerprint(FingerprintArgs),

    /// Get the fingerprints of several texts in one request
    Fingerprints(FingerprintsArgs),

    /// Render the fingerprint of a term as a PNG image
    Image(ImageArgs),

    /// Configuration file operations
    #[command(subcommand)]
    Config(ConfigCommands),
}

/// Arguments for the `retinas` subcommand.
#[derive(Debug, Args)]
pub struct RetinasArgs {
    /// Only describe this retina
    #[arg(short, long)]
    pub name: Option<String>,
}

/// Arguments for the `fingerprint` subcommand.
#[derive(Debug, Args)]
pub struct FingerprintArgs {
    /// Input text
    pub text: String,
}

/// Arguments for the `fingerprints` subcommand.
#[derive(Debug, Args)]
pub struct FingerprintsArgs {
    /// Input texts
    #[arg(required = true)]
    pub texts: Vec<String>,
}

/// Arguments for the `image` subcommand.
#[derive(Debug, Args)]
pub struct ImageArgs {
    /// Term to render
    pub term: String,

    /// Output file
    #[arg(short, long, default_value = "fingerprint.png")]
    pub output: PathBuf,
}

/// Configuration subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Validate the configuration file
    Validate,

    /// Show the effective configuration
    Show,
}
