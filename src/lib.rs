//! cortical - Async client for the Cortical.io REST API
//!
//! This crate wraps the Cortical.io semantic fingerprinting API: text
//! fingerprints, bulk fingerprints, retina listing and image rendering.
//!
//! # Overview
//!
//! A [`CorticalClient`] holds an immutable [`ClientConfig`] and exposes a
//! few domain operations on top of generic `get`/`post` calls. Every call is
//! a single request/response cycle; nothing is cached or retried.
//!
//! ```no_run
//! use cortical::{ClientOptions, CorticalClient, Params};
//!
//! # async fn run() -> cortical::Result<()> {
//! let client = CorticalClient::new(ClientOptions::default().key("my-api-key"))?;
//! let fingerprint = client.get_fingerprint("jaguar", Params::new()).await?;
//! println!("{} active bits", fingerprint.len());
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface definitions
//! - [`client`] - API client, transport and models
//! - [`config`] - Client configuration and configuration file loading
//! - [`error`] - Error types and error handling

pub mod cli;
pub mod client;
pub mod config;
pub mod error;

// Re-exports for convenience
pub use cli::Cli;
pub use client::{ApiResponse, CorticalClient, Fingerprint, Params, RetinaDescriptor};
pub use config::{ClientConfig, ClientOptions, Config};
pub use error::{CorticalError, ErrorKind, Result};
