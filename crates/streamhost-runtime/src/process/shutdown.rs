//! Graceful shutdown of a `tokio::process::Child`.

use std::io;
use std::process::ExitStatus;
use std::time::Duration;

use tokio::process::Child;
use tokio::time::timeout;
use tracing::{debug, warn};

use super::signal::interrupt_pid;

/// Stop a child with SIGINT, escalating to a kill after `grace`.
///
/// 1. Send SIGINT (Windows: terminate) and wait up to `grace`
/// 2. If still running, kill it
/// 3. Wait for the child to be reaped
pub async fn shutdown_child(child: &mut Child, grace: Duration) -> io::Result<ExitStatus> {
    let Some(pid) = child.id() else {
        // Already reaped
        return child.wait().await;
    };

    match interrupt_pid(pid) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => return child.wait().await,
        Err(e) => {
            warn!(pid, error = %e, "Interrupt failed; killing");
            child.kill().await?;
            return child.wait().await;
        }
    }

    if let Ok(result) = timeout(grace, child.wait()).await {
        debug!(pid, "Child exited after interrupt");
        return result;
    }

    warn!(pid, grace_secs = grace.as_secs(), "Child ignored interrupt; killing");
    child.kill().await?;
    child.wait().await
}
