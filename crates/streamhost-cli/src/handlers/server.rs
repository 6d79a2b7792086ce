//! `server`: run or inspect the local streaming server.

use anyhow::Result;
use streamhost_core::{ProvisioningState, ProvisioningStatus};
use streamhost_runtime::{StreamingServer, SupervisorError};

use crate::bootstrap::CliContext;
use crate::commands::ServerCommand;
use crate::error::CliError;

pub async fn execute(ctx: &CliContext, command: ServerCommand) -> Result<()> {
    match command {
        ServerCommand::Start => start(ctx).await,
        ServerCommand::Status => {
            status(ctx).await;
            Ok(())
        }
        ServerCommand::OpenDir => {
            StreamingServer::new(&ctx.provision)
                .open_streaming_server_dir()
                .map_err(|e| CliError::Provision(e.to_string()))?;
            Ok(())
        }
    }
}

async fn status(ctx: &CliContext) {
    let server = StreamingServer::new(&ctx.provision);
    let label = match server.state().await {
        ProvisioningState::DirMissing => "directory missing",
        ProvisioningState::MissingServerScript => "server.js missing",
        ProvisioningState::MissingBinaries => "ffmpeg/ffprobe missing",
        ProvisioningState::Ready => "ready",
    };
    println!("{}: {label}", server.streaming_server_dir().display());
}

async fn start(ctx: &CliContext) -> Result<()> {
    let server = StreamingServer::new(&ctx.provision);
    let binaries = match server.ensure_streaming_server_files().await {
        ProvisioningStatus::Ready { binaries } => Some(binaries),
        ProvisioningStatus::MissingServerJs => {
            return Err(CliError::Provision(format!(
                "server.js is missing; download it from {}",
                server.server_js_url()
            ))
            .into());
        }
        // Start anyway; the server logs its own complaint about missing binaries
        ProvisioningStatus::MissingFfmpeg => None,
    };

    let mut process = server
        .start_with(binaries.as_ref())
        .map_err(|e: SupervisorError| CliError::Provision(e.to_string()))?;
    println!(
        "🚀 Streaming server running (pid {}), log: {}",
        process.pid(),
        process.log_path().display()
    );

    super::launch::supervise(&mut process, &ctx.shutdown).await;
    Ok(())
}
