//! Command handlers.
//!
//! Each handler takes the composed [`CliContext`](crate::CliContext),
//! delegates to the runtime, and formats the result for the terminal.
//! Failures the user must see come back as [`CliError`](crate::CliError)
//! so `main` can pick the exit code.

pub mod ensure;
pub mod launch;
pub mod paths;
pub mod server;
pub mod service;
