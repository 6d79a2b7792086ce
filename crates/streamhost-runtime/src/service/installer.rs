//! Download, silent install and completion polling for the external service.

use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use streamhost_core::ports::{CommandError, DownloadError};
use streamhost_core::{ServiceInstallRecord, is_newer_version};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::ServiceLocator;
use super::release::{GitHubRelease, read_install_record, write_install_record};
use crate::context::ProvisionContext;

#[derive(Debug, Error)]
pub enum InstallError {
    #[error("unsupported operating system")]
    Unsupported,

    #[error(transparent)]
    Download(#[from] DownloadError),

    #[error("invalid release metadata: {0}")]
    Release(String),

    #[error("release {tag} has no {extension} asset")]
    NoAsset { tag: String, extension: &'static str },

    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("service is installed but its executable was not found")]
    MissingExecutable,

    #[error("service not detected within {0:?}")]
    Timeout(Duration),

    #[error("installation cancelled")]
    Cancelled,

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Installs the external service and waits for it to come up.
#[derive(Debug, Clone)]
pub struct ServiceInstaller<'a> {
    locator: ServiceLocator<'a>,
}

impl<'a> ServiceInstaller<'a> {
    pub fn new(ctx: &'a ProvisionContext) -> Self {
        Self::with_locator(ServiceLocator::new(ctx))
    }

    pub const fn with_locator(locator: ServiceLocator<'a>) -> Self {
        Self { locator }
    }

    const fn ctx(&self) -> &'a ProvisionContext {
        self.locator.context()
    }

    /// Fetch the latest release metadata.
    pub async fn latest_release(&self) -> Result<GitHubRelease, InstallError> {
        let url = &self.ctx().config.service_release_api;
        let body = self.ctx().fetcher.fetch_text(url).await?;
        serde_json::from_str(&body).map_err(|e| InstallError::Release(e.to_string()))
    }

    /// Install (or confirm) the latest service.
    ///
    /// Returns `false` on any failure, including timeout and cancellation.
    pub async fn download_and_install(&self, cancel: &CancellationToken) -> bool {
        match self.try_download_and_install(cancel).await {
            Ok(()) => true,
            Err(InstallError::Timeout(timeout)) => {
                warn!(timeout_secs = timeout.as_secs(), "Installation timed out or the service was not detected");
                false
            }
            Err(e) => {
                error!(error = %e, "Streaming service installation failed");
                false
            }
        }
    }

    async fn try_download_and_install(&self, cancel: &CancellationToken) -> Result<(), InstallError> {
        let ctx = self.ctx();
        let strategy = Arc::clone(self.locator.strategy().ok_or(InstallError::Unsupported)?);

        let release = self.latest_release().await?;
        info!(version = %release.tag_name, "Latest streaming service release");

        if self.is_up_to_date(&release.tag_name).await {
            info!(version = %release.tag_name, "Streaming service already up to date");
            return self.ensure_running().await;
        }

        let extension = strategy.installer_extension();
        let asset = release
            .asset_with_extension(extension)
            .ok_or_else(|| InstallError::NoAsset {
                tag: release.tag_name.clone(),
                extension,
            })?;

        let installer = ctx.config.temp_dir.join(&asset.name);
        info!(version = %release.tag_name, path = %installer.display(), "Downloading streaming service");
        ctx.fetcher
            .download(&asset.browser_download_url, &installer)
            .await?;

        info!("Download complete. Installing");
        if let Err(e) = strategy.install(ctx.commands.as_ref(), &installer).await {
            remove_installer(&installer);
            return Err(e.into());
        }

        info!("Waiting for streaming service installation to finish");
        self.wait_for_install_completion(
            ctx.config.install_timeout(),
            ctx.config.install_poll_interval(),
            cancel,
        )
        .await?;

        info!("Streaming service detected as installed or running");
        remove_installer(&installer);
        let record = ServiceInstallRecord::new(&release.tag_name, ctx.platform.to_string());
        if let Err(e) = write_install_record(&ctx.paths.service_record_path(), &record) {
            warn!(error = %e, "Could not save service install record");
        }
        Ok(())
    }

    /// Poll until the service is running or installed, or `timeout` passes.
    ///
    /// Each tick checks "running" before "installed"; an installed but idle
    /// service is started. Sleeps go through the context clock.
    pub async fn wait_for_install_completion(
        &self,
        timeout: Duration,
        interval: Duration,
        cancel: &CancellationToken,
    ) -> Result<(), InstallError> {
        let clock = &self.ctx().clock;
        let started = clock.now();

        while clock.now().duration_since(started) < timeout {
            if self.locator.is_process_running().await {
                return Ok(());
            }

            if self.locator.is_service_installed().await {
                self.start_found().await;
                return Ok(());
            }

            debug!(interval_secs = interval.as_secs(), "Service not detected yet");
            tokio::select! {
                () = cancel.cancelled() => {
                    info!("Service installation wait cancelled");
                    return Err(InstallError::Cancelled);
                }
                () = clock.sleep(interval) => {}
            }
        }

        Err(InstallError::Timeout(timeout))
    }

    /// Newer release tag than the recorded install, if any.
    pub async fn check_for_update(&self) -> Option<String> {
        let installed = read_install_record(&self.ctx().paths.service_record_path())?;
        match self.latest_release().await {
            Ok(release) if is_newer_version(&release.tag_name, &installed.version) => {
                info!(installed = %installed.version, latest = %release.tag_name, "Streaming service update available");
                Some(release.tag_name)
            }
            Ok(_) => None,
            Err(e) => {
                warn!(error = %e, "Could not check for streaming service updates");
                None
            }
        }
    }

    async fn is_up_to_date(&self, latest: &str) -> bool {
        let Some(record) = read_install_record(&self.ctx().paths.service_record_path()) else {
            return false;
        };
        !is_newer_version(latest, &record.version) && self.locator.is_service_installed().await
    }

    async fn ensure_running(&self) -> Result<(), InstallError> {
        if !self.locator.is_process_running().await {
            let executable = self
                .locator
                .find_executable()
                .await
                .ok_or(InstallError::MissingExecutable)?;
            self.locator.start(&executable)?;
        }
        Ok(())
    }

    async fn start_found(&self) {
        match self.locator.find_executable().await {
            Some(executable) => {
                if let Err(e) = self.locator.start(&executable) {
                    error!(error = %e, "Failed to start installed streaming service");
                }
            }
            None => warn!("Service reported installed but no executable was found"),
        }
    }
}

fn remove_installer(path: &Path) {
    if let Err(e) = std::fs::remove_file(path)
        && e.kind() != io::ErrorKind::NotFound
    {
        warn!(path = %path.display(), error = %e, "Could not remove service installer");
    }
}
