//! The external streaming service: detection, launch, termination, install.

mod installer;
mod platform;
mod release;

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use streamhost_core::InstalledServiceRecord;
use streamhost_core::ports::CommandError;
use tracing::{error, info, warn};

pub use installer::{InstallError, ServiceInstaller};
pub use platform::{LinuxService, MacService, ServicePlatform, WindowsService, service_platform};
pub use release::{GitHubAsset, GitHubRelease, read_install_record, write_install_record};

use crate::context::ProvisionContext;
use crate::process::terminate_pid;

/// `terminate()` result: the service was signalled.
pub const TERMINATE_SIGNALLED: i32 = 0;
/// `terminate()` result: no service process was found.
pub const TERMINATE_NOT_FOUND: i32 = 1;
/// `terminate()` result: signalling the process failed.
pub const TERMINATE_FAILED: i32 = 2;

/// Resolves where the service lives and whether it is installed or running.
#[derive(Clone)]
pub struct ServiceLocator<'a> {
    ctx: &'a ProvisionContext,
    strategy: Option<Arc<dyn ServicePlatform>>,
}

impl std::fmt::Debug for ServiceLocator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceLocator")
            .field("os", &self.strategy.as_ref().map(|s| s.os()))
            .finish_non_exhaustive()
    }
}

impl<'a> ServiceLocator<'a> {
    /// Locator using the strategy for the context's platform.
    pub fn new(ctx: &'a ProvisionContext) -> Self {
        Self::with_platform(ctx, Some(service_platform(ctx.platform.os)))
    }

    /// Locator with an explicit strategy; `None` means the OS is unsupported.
    pub fn with_platform(
        ctx: &'a ProvisionContext,
        strategy: Option<Arc<dyn ServicePlatform>>,
    ) -> Self {
        Self { ctx, strategy }
    }

    pub(crate) const fn context(&self) -> &'a ProvisionContext {
        self.ctx
    }

    pub(crate) fn strategy(&self) -> Option<&Arc<dyn ServicePlatform>> {
        if self.strategy.is_none() {
            error!("Unsupported operating system for the streaming service");
        }
        self.strategy.as_ref()
    }

    /// Portable copy first (working directory, then the configured portable
    /// dir), then the OS install locations, then the package manager.
    pub async fn find_executable(&self) -> Option<PathBuf> {
        let strategy = self.strategy()?;
        let file_name = strategy.executable_file_name();

        let portable = std::env::current_dir()
            .ok()
            .into_iter()
            .chain(self.ctx.config.portable_service_dir.clone())
            .map(|dir| dir.join(&file_name))
            .find(|candidate| candidate.is_file());
        if let Some(path) = portable {
            info!(path = %path.display(), "Service executable found in portable location");
            return Some(path);
        }

        if let Some(path) = strategy
            .conventional_locations()
            .into_iter()
            .find(|candidate| candidate.is_file())
        {
            info!(path = %path.display(), os = %strategy.os(), "Service executable found");
            return Some(path);
        }

        if let Some(path) = strategy.locate_packaged(self.ctx.commands.as_ref()).await {
            info!(path = %path.display(), "Service executable found in package install");
            return Some(path);
        }

        warn!("Service executable not found");
        None
    }

    pub async fn is_service_installed(&self) -> bool {
        match self.strategy() {
            Some(strategy) => strategy.is_installed(self.ctx.commands.as_ref()).await,
            None => false,
        }
    }

    pub async fn is_process_running(&self) -> bool {
        match self.strategy() {
            Some(strategy) => strategy.is_running(self.ctx.commands.as_ref()).await,
            None => false,
        }
    }

    /// Snapshot of installed/running state and executable path.
    pub async fn record(&self) -> InstalledServiceRecord {
        InstalledServiceRecord {
            installed: self.is_service_installed().await,
            running: self.is_process_running().await,
            executable_path: self.find_executable().await,
        }
    }

    /// Launch the service detached from this process.
    pub fn start(&self, executable: &std::path::Path) -> Result<Option<u32>, CommandError> {
        let Some(strategy) = self.strategy() else {
            return Err(CommandError::Launch {
                program: executable.display().to_string(),
                reason: "unsupported operating system".to_string(),
            });
        };
        let command = strategy.launch_command(executable);
        info!(command = %command, "Starting streaming service");
        let pid = self.ctx.commands.spawn_detached(&command)?;
        info!(pid = ?pid, "Streaming service started");
        Ok(pid)
    }

    /// Send SIGTERM (Windows: terminate) to the running service.
    ///
    /// Returns [`TERMINATE_SIGNALLED`], [`TERMINATE_NOT_FOUND`] or [`TERMINATE_FAILED`].
    pub async fn terminate(&self) -> i32 {
        info!("Terminating streaming service");
        let Some(strategy) = self.strategy() else {
            return TERMINATE_NOT_FOUND;
        };
        let Some(pid) = strategy.find_pid(self.ctx.commands.as_ref()).await else {
            error!("Failed to find streaming service PID");
            return TERMINATE_NOT_FOUND;
        };

        match terminate_pid(pid) {
            Ok(()) => {
                info!(pid, "Streaming service terminated");
                TERMINATE_SIGNALLED
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                error!(pid, "Streaming service exited before it could be signalled");
                TERMINATE_NOT_FOUND
            }
            Err(e) => {
                error!(pid, error = %e, "Failed to terminate streaming service");
                TERMINATE_FAILED
            }
        }
    }
}
