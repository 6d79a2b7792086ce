//! Root CLI parser and global options.

use std::path::PathBuf;

use clap::Parser;
use streamhost_core::config::{INSTALL_TIMEOUT_ENV, NODE_BIN_ENV, SERVICE_DIR_ENV};
use streamhost_core::paths::DATA_DIR_ENV;

use crate::commands::Commands;

/// Provision and supervise the streaming backend.
#[derive(Debug, Parser)]
#[command(name = "streamhost")]
#[command(about = "Provision and supervise the streaming backend")]
#[command(version)]
pub struct Cli {
    /// Override the user-data directory
    #[arg(long = "data-dir", env = DATA_DIR_ENV, global = true)]
    pub data_dir: Option<PathBuf>,

    /// JavaScript runtime used to run server.js
    #[arg(long = "node-bin", env = NODE_BIN_ENV, global = true)]
    pub node_bin: Option<String>,

    /// Directory holding a portable service executable
    #[arg(long = "service-dir", env = SERVICE_DIR_ENV, global = true)]
    pub service_dir: Option<PathBuf>,

    /// Seconds to wait for a service installer to finish
    #[arg(long = "install-timeout", env = INSTALL_TIMEOUT_ENV, global = true)]
    pub install_timeout: Option<u64>,

    /// Never prompt; dialogs are logged and treated as closed
    #[arg(long = "non-interactive", global = true)]
    pub non_interactive: bool,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{ServerCommand, ServiceCommand};
    use clap::CommandFactory;

    #[test]
    fn test_cli_parser_builds() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_args() {
        let cli = Cli::parse_from([
            "streamhost",
            "--verbose",
            "--data-dir",
            "/tmp/stremio",
            "--install-timeout",
            "30",
            "paths",
        ]);
        assert!(cli.verbose);
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/stremio")));
        assert_eq!(cli.install_timeout, Some(30));
        assert!(matches!(cli.command, Some(Commands::Paths { json: false })));
    }

    #[test]
    fn test_launch_flag() {
        let cli = Cli::parse_from(["streamhost", "launch", "--no-stremio-server"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Launch {
                no_stremio_server: true
            })
        ));
    }

    #[test]
    fn test_nested_subcommands() {
        let cli = Cli::parse_from(["streamhost", "service", "terminate"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Service {
                command: ServiceCommand::Terminate
            })
        ));

        let cli = Cli::parse_from(["streamhost", "server", "open-dir"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Server {
                command: ServerCommand::OpenDir
            })
        ));
    }

    #[test]
    fn test_timeout_rejects_text() {
        assert!(Cli::try_parse_from(["streamhost", "--install-timeout", "soon", "paths"]).is_err());
    }
}
