//! The local streaming server: files on disk, provisioning, and launch.

mod log_file;
mod supervisor;

use std::fs;
use std::path::PathBuf;

use streamhost_core::ports::CommandError;
use streamhost_core::{ProvisioningState, ProvisioningStatus, ResolvedBinaries};
use tracing::{debug, info, warn};

pub use log_file::ServerLogFile;
pub use supervisor::{ServerProcessSupervisor, SupervisedProcess, SupervisorError};

use crate::binaries::{ArchiveInstaller, BinaryResolver};
use crate::context::ProvisionContext;
use crate::system::open_detached;

/// Operations on the `streamingserver/` directory and its contents.
#[derive(Debug, Clone, Copy)]
pub struct StreamingServer<'a> {
    ctx: &'a ProvisionContext,
}

impl<'a> StreamingServer<'a> {
    pub const fn new(ctx: &'a ProvisionContext) -> Self {
        Self { ctx }
    }

    pub fn streaming_server_dir(&self) -> PathBuf {
        self.ctx.paths.streaming_server_dir()
    }

    pub fn streaming_server_dir_exists(&self) -> bool {
        self.streaming_server_dir().is_dir()
    }

    pub fn server_js_exists(&self) -> bool {
        self.ctx.paths.server_js_path().is_file()
    }

    /// Where the user can download `server.js` by hand.
    pub fn server_js_url(&self) -> &str {
        &self.ctx.config.server_js_url
    }

    /// Reveal the streaming-server directory in the file manager, creating it first.
    pub fn open_streaming_server_dir(&self) -> Result<(), CommandError> {
        let dir = self.streaming_server_dir();
        if let Err(e) = fs::create_dir_all(&dir) {
            warn!(path = %dir.display(), error = %e, "Could not create streaming server directory");
        }
        open_detached(
            self.ctx.commands.as_ref(),
            self.ctx.platform.os,
            &dir.to_string_lossy(),
        )
    }

    /// Where provisioning currently stands, from existence checks only.
    pub async fn state(&self) -> ProvisioningState {
        if !self.streaming_server_dir_exists() {
            ProvisioningState::DirMissing
        } else if !self.server_js_exists() {
            ProvisioningState::MissingServerScript
        } else if BinaryResolver::new(self.ctx)
            .resolve_all(self.ctx.platform)
            .await
            .is_none()
        {
            ProvisioningState::MissingBinaries
        } else {
            ProvisioningState::Ready
        }
    }

    /// Bring the directory as far towards `Ready` as possible without the user.
    ///
    /// Creates the directory when missing. `server.js` is never fetched
    /// automatically. Missing binaries come from the system first and are
    /// downloaded otherwise. Once ready, a repeat call performs existence
    /// checks only.
    pub async fn ensure_streaming_server_files(&self) -> ProvisioningStatus {
        let platform = self.ctx.platform;
        let dir = self.streaming_server_dir();

        if !dir.is_dir() {
            warn!(
                path = %dir.display(),
                "Streaming server directory not found, creating it. It needs server.js, ffmpeg and ffprobe"
            );
            if let Err(e) = fs::create_dir_all(&dir) {
                warn!(path = %dir.display(), error = %e, "Failed to create streaming server directory");
            }
        }

        if !self.server_js_exists() {
            info!(path = %self.ctx.paths.server_js_path().display(), "server.js is missing");
            return ProvisioningStatus::MissingServerJs;
        }

        let resolver = BinaryResolver::new(self.ctx);
        if let Some(binaries) = resolver.resolve_all(platform).await {
            debug!("Streaming server files ready");
            return ProvisioningStatus::Ready { binaries };
        }

        let missing = resolver.missing(platform).await;
        info!(?missing, %platform, "Downloading missing binaries");
        if !ArchiveInstaller::new(self.ctx)
            .install_binaries(&missing, platform)
            .await
        {
            return ProvisioningStatus::MissingFfmpeg;
        }

        match resolver.resolve_all(platform).await {
            Some(binaries) => ProvisioningStatus::Ready { binaries },
            None => {
                warn!("Binaries still missing after download");
                ProvisioningStatus::MissingFfmpeg
            }
        }
    }

    /// Launch with whatever binaries currently resolve.
    pub async fn start(&self) -> Result<SupervisedProcess, SupervisorError> {
        let binaries = BinaryResolver::new(self.ctx)
            .resolve_all(self.ctx.platform)
            .await;
        self.start_with(binaries.as_ref())
    }

    /// Launch with already-resolved binaries.
    pub fn start_with(
        &self,
        binaries: Option<&ResolvedBinaries>,
    ) -> Result<SupervisedProcess, SupervisorError> {
        ServerProcessSupervisor::new(self.ctx).start(binaries)
    }
}
