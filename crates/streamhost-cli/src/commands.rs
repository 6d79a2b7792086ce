//! Subcommands.

use clap::Subcommand;

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Bring up a streaming backend and keep it running until interrupted
    Launch {
        /// Skip streaming-backend provisioning entirely
        #[arg(long = "no-stremio-server")]
        no_stremio_server: bool,
    },

    /// Make sure server.js, ffmpeg and ffprobe are in place
    Ensure,

    /// Work with the local streaming server
    Server {
        #[command(subcommand)]
        command: ServerCommand,
    },

    /// Work with the external streaming service
    Service {
        #[command(subcommand)]
        command: ServiceCommand,
    },

    /// Show the resolved data directory and file locations
    Paths {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum ServerCommand {
    /// Provision files, then run server.js in the foreground
    Start,
    /// Show the provisioning state of the streaming-server directory
    Status,
    /// Open the streaming-server directory in the file manager
    OpenDir,
}

#[derive(Debug, Subcommand)]
pub enum ServiceCommand {
    /// Report whether the service is installed and running
    Status {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Download and install the latest release
    Install,
    /// Start an installed service
    Start,
    /// Stop a running service
    Terminate,
    /// Print the latest release tag if it is newer than the installed one
    CheckUpdate,
}
