//! `launch`: bring up one streaming backend and hold it until Ctrl-C.

use anyhow::Result;
use streamhost_core::ports::HostLifecycle;
use streamhost_runtime::{BackendOutcome, LaunchOptions, Provisioner, SupervisedProcess};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::bootstrap::CliContext;
use crate::error::CliError;

/// Wait for the server to exit or for `interrupted`, whichever is first.
pub async fn supervise(process: &mut SupervisedProcess, interrupted: &CancellationToken) {
    let exited = tokio::select! {
        status = process.wait() => Some(status),
        () = interrupted.cancelled() => None,
    };

    match exited {
        Some(Ok(status)) => println!("Streaming server exited ({status})"),
        Some(Err(e)) => warn!(error = %e, "Lost track of the streaming server"),
        None => match process.shutdown().await {
            Ok(status) => println!("Streaming server stopped ({status})"),
            Err(e) => warn!(error = %e, "Streaming server did not stop cleanly"),
        },
    }
}

pub async fn execute(ctx: &CliContext, no_stremio_server: bool) -> Result<()> {
    let interrupted = &ctx.shutdown;
    let outcome = Provisioner::new(&ctx.provision)
        .with_cancellation(interrupted.clone())
        .provision(LaunchOptions { no_stremio_server })
        .await;
    info!(outcome = outcome.as_str(), "Provisioning finished");

    let result = match outcome {
        BackendOutcome::LocalServer(mut process) => {
            println!(
                "🚀 Streaming server running (pid {}), log: {}",
                process.pid(),
                process.log_path().display()
            );
            println!("Press Ctrl-C to stop.");
            supervise(&mut process, interrupted).await;
            Ok(())
        }
        BackendOutcome::Service { pid } => {
            match pid {
                Some(pid) => println!("✅ Stremio Service started (pid {pid})"),
                None => println!("✅ Stremio Service started"),
            }
            Ok(())
        }
        BackendOutcome::ReusedService => {
            println!("✅ Stremio Service already running");
            Ok(())
        }
        BackendOutcome::Disabled => {
            println!("Streaming backend disabled");
            Ok(())
        }
        BackendOutcome::Declined => Err(CliError::Provision(
            "no streaming backend chosen".to_string(),
        )),
        BackendOutcome::Unavailable => Err(CliError::Provision(
            "no streaming backend could be started".to_string(),
        )),
        BackendOutcome::Aborted => Err(CliError::Provision(
            "streaming server setup abandoned".to_string(),
        )),
    };

    ctx.host.run_exit_hooks();
    result.map_err(Into::into)
}
