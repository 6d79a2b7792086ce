//! Command-line front end for streaming-backend provisioning.
//!
//! `main` parses [`Cli`], builds a [`CliContext`] through [`bootstrap`],
//! and dispatches to [`handlers`].

#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

// Used only by the binary target
use dotenvy as _;
use tracing_subscriber as _;

#[cfg(test)]
use tempfile as _;

pub mod bootstrap;
pub mod commands;
pub mod error;
pub mod handlers;
pub mod parser;
pub mod presentation;
pub mod signals;

pub use bootstrap::{CliContext, CliOverrides, bootstrap};
pub use commands::{Commands, ServerCommand, ServiceCommand};
pub use error::CliError;
pub use parser::Cli;

/// Run one parsed command against a composed context.
pub async fn dispatch(ctx: &CliContext, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Launch { no_stremio_server } => {
            handlers::launch::execute(ctx, no_stremio_server).await
        }
        Commands::Ensure => handlers::ensure::execute(ctx).await,
        Commands::Server { command } => handlers::server::execute(ctx, command).await,
        Commands::Service { command } => handlers::service::execute(ctx, command).await,
        Commands::Paths { json } => handlers::paths::execute(ctx, json),
    }
}
