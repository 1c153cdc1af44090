//! Command-line adapter for dectool.
//!
//! `bootstrap` is the composition root: it resolves the data directory,
//! loads settings, builds the file-backed stores and the tool manager.
//! Handlers are thin wrappers that parse CLI input, call into the
//! services and format output for the terminal.
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

#[cfg(test)]
use tempfile as _;

// Used by the binary only
use anyhow as _;
use dotenvy as _;
use tokio as _;
use tracing_subscriber as _;

pub mod bootstrap;
pub mod commands;
pub mod credentials;
pub mod error;
pub mod handlers;
pub mod parser;
pub mod presentation;

pub use bootstrap::{CliConfig, CliContext, bootstrap};
pub use commands::{Commands, ResultsCommand, ServersCommand, ToolsCommand};
pub use credentials::EnvCredentialService;
pub use error::CliError;
pub use parser::Cli;
