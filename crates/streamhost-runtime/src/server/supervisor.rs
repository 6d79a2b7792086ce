//! Launching and supervising the local streaming server.

use std::io;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use streamhost_core::constants::SERVER_SHUTDOWN_GRACE_SECS;
use streamhost_core::ports::ServerLogSinkPort;
use streamhost_core::{BinaryKind, ResolvedBinaries};
use thiserror::Error;
use tokio::process::{Child, Command};
use tracing::{debug, error, info, warn};

use super::log_file::ServerLogFile;
use crate::context::ProvisionContext;
use crate::process::{interrupt_pid, shutdown_child, spawn_stream_reader};

#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("server script not found: {0}")]
    ServerScriptMissing(PathBuf),

    #[error("JavaScript runtime `{binary}` not found: {reason}")]
    RuntimeNotFound { binary: String, reason: String },

    #[error("failed to open server log {path}: {source}")]
    Log {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to spawn streaming server: {0}")]
    Spawn(#[source] io::Error),
}

/// Starts `server.js` under the JavaScript runtime.
#[derive(Debug, Clone, Copy)]
pub struct ServerProcessSupervisor<'a> {
    ctx: &'a ProvisionContext,
}

impl<'a> ServerProcessSupervisor<'a> {
    pub const fn new(ctx: &'a ProvisionContext) -> Self {
        Self { ctx }
    }

    /// Spawn the server.
    ///
    /// A missing `server.js` is fatal: the host is asked to exit with status 1
    /// and nothing is spawned. Missing binaries only produce a warning; the
    /// server starts without `FFMPEG_BIN`/`FFPROBE_BIN` for the absent ones.
    pub fn start(
        &self,
        binaries: Option<&ResolvedBinaries>,
    ) -> Result<SupervisedProcess, SupervisorError> {
        let paths = &self.ctx.paths;
        let script = paths.server_js_path();

        if !script.is_file() {
            error!(path = %script.display(), "Server script not found");
            self.ctx.host.exit(1);
            return Err(SupervisorError::ServerScriptMissing(script));
        }

        let env = binary_env(self.ctx, binaries);
        let node = which::which(&self.ctx.config.node_binary).map_err(|e| {
            SupervisorError::RuntimeNotFound {
                binary: self.ctx.config.node_binary.clone(),
                reason: e.to_string(),
            }
        })?;

        let log_path = paths.log_file_path();
        let log = Arc::new(
            ServerLogFile::open(&log_path).map_err(|source| SupervisorError::Log {
                path: log_path.clone(),
                source,
            })?,
        );

        let mut cmd = Command::new(&node);
        cmd.arg(&script)
            .current_dir(paths.streaming_server_dir())
            .envs(env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(SupervisorError::Spawn)?;
        let Some(pid) = child.id() else {
            return Err(SupervisorError::Spawn(io::Error::other(
                "child exited before reporting a PID",
            )));
        };
        info!(pid, runtime = %node.display(), script = %script.display(), "Streaming server started");

        let sink: Arc<dyn ServerLogSinkPort> = log.clone();
        if let Some(stdout) = child.stdout.take() {
            spawn_stream_reader(stdout, pid, "stdout", Arc::clone(&sink));
        }
        if let Some(stderr) = child.stderr.take() {
            spawn_stream_reader(stderr, pid, "stderr", sink);
        }

        let stopped = Arc::new(AtomicBool::new(false));
        {
            let stopped = Arc::clone(&stopped);
            let log = Arc::clone(&log);
            self.ctx.host.on_exit(Box::new(move || {
                if !stopped.swap(true, Ordering::SeqCst) {
                    signal_quietly(pid);
                }
                log.close();
            }));
        }

        Ok(SupervisedProcess {
            pid,
            child,
            log,
            stopped,
            grace: Duration::from_secs(SERVER_SHUTDOWN_GRACE_SECS),
        })
    }
}

/// `FFMPEG_BIN`/`FFPROBE_BIN` for the child, warning about absent binaries.
///
/// Absent binaries still point at their conventional location so the
/// server's own error names a concrete path.
fn binary_env(
    ctx: &ProvisionContext,
    binaries: Option<&ResolvedBinaries>,
) -> Vec<(&'static str, PathBuf)> {
    BinaryKind::ALL
        .into_iter()
        .map(|kind| {
            let path = binaries.map_or_else(|| ctx.paths.binary_path(kind), |b| b.get(kind).clone());
            if !path.is_file() {
                warn!(binary = %kind, path = %path.display(), "Binary not found");
            }
            (kind.env_var(), path)
        })
        .collect()
}

fn signal_quietly(pid: u32) {
    match interrupt_pid(pid) {
        Ok(()) => debug!(pid, "Interrupted streaming server"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!(pid, error = %e, "Failed to interrupt streaming server"),
    }
}

/// A running streaming server.
///
/// Dropping the handle leaves the server running. It stops through
/// [`SupervisedProcess::shutdown`] or the exit hook registered at start.
#[derive(Debug)]
pub struct SupervisedProcess {
    pid: u32,
    child: Child,
    log: Arc<ServerLogFile>,
    stopped: Arc<AtomicBool>,
    grace: Duration,
}

impl SupervisedProcess {
    pub const fn pid(&self) -> u32 {
        self.pid
    }

    pub fn log_path(&self) -> PathBuf {
        self.log.path().to_path_buf()
    }

    /// Wait for the server to exit on its own.
    pub async fn wait(&mut self) -> io::Result<ExitStatus> {
        let status = self.child.wait().await;
        self.stopped.store(true, Ordering::SeqCst);
        self.log.flush();
        status
    }

    /// Interrupt, wait out the grace period, kill if needed, reap.
    pub async fn shutdown(&mut self) -> io::Result<ExitStatus> {
        self.stopped.store(true, Ordering::SeqCst);
        info!(pid = self.pid, "Stopping streaming server");
        let status = shutdown_child(&mut self.child, self.grace).await;
        self.log.flush();
        status
    }
}

impl Drop for SupervisedProcess {
    fn drop(&mut self) {
        // The server keeps running; the exit hook still stops it
        self.log.flush();
    }
}
