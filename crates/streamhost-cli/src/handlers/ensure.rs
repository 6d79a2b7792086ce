//! `ensure`: provision the streaming-server directory without launching.

use anyhow::Result;
use streamhost_core::ProvisioningStatus;
use streamhost_runtime::StreamingServer;

use crate::bootstrap::CliContext;
use crate::error::CliError;

pub async fn execute(ctx: &CliContext) -> Result<()> {
    let server = StreamingServer::new(&ctx.provision);
    match server.ensure_streaming_server_files().await {
        ProvisioningStatus::Ready { binaries } => {
            println!("✅ Streaming server files ready");
            println!("   ffmpeg:  {}", binaries.ffmpeg.display());
            println!("   ffprobe: {}", binaries.ffprobe.display());
            Ok(())
        }
        ProvisioningStatus::MissingServerJs => Err(CliError::Provision(format!(
            "server.js is missing from {}. Download it from {} and place it there.",
            server.streaming_server_dir().display(),
            server.server_js_url()
        ))
        .into()),
        ProvisioningStatus::MissingFfmpeg => Err(CliError::Provision(
            "ffmpeg/ffprobe could not be found or downloaded".to_string(),
        )
        .into()),
    }
}
