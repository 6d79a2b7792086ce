//! CLI-specific error types and their exit codes.

use streamhost_core::{ConfigError, PlatformError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be assembled.
    #[error("Configuration error: {0}")]
    Config(String),

    /// This build runs on a platform outside the support matrix.
    #[error("Unsupported platform: {0}")]
    Platform(String),

    /// A provisioning step failed and the user has already been told.
    #[error("{0}")]
    Provision(String),
}

impl CliError {
    /// Map error to an exit code (sysexits.h where one fits).
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Provision(_) => 1,
            Self::Platform(_) => 69, // EX_UNAVAILABLE
            Self::Config(_) => 78,   // EX_CONFIG
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<PlatformError> for CliError {
    fn from(err: PlatformError) -> Self {
        Self::Platform(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::Provision("x".into()).exit_code(), 1);
        assert_eq!(CliError::Config("x".into()).exit_code(), 78);
        assert_eq!(
            CliError::from(PlatformError::UnsupportedOs("aix".into())).exit_code(),
            69
        );
    }
}
