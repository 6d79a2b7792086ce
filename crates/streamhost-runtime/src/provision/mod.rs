//! Picks and brings up exactly one streaming backend.
//!
//! Either the local `server.js` under supervision, or the external service.
//! The local path falls back to the service when binaries cannot be
//! provisioned or the server cannot be spawned.

mod preference;

use streamhost_core::ports::{Alert, AlertKind};
use streamhost_core::{BackendPreference, ProvisioningStatus, ResolvedBinaries};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

pub use preference::{persist_preference, read_preference};

use crate::context::ProvisionContext;
use crate::server::{StreamingServer, SupervisedProcess, SupervisorError};
use crate::service::{ServiceInstaller, ServiceLocator};
use crate::system::open_detached;

/// Caller switches for a launch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LaunchOptions {
    /// Skip streaming-backend provisioning entirely.
    pub no_stremio_server: bool,
}

/// What [`Provisioner::provision`] ended up doing.
#[derive(Debug)]
pub enum BackendOutcome {
    /// Provisioning was switched off by the caller.
    Disabled,
    /// The service was already running and is reused as-is.
    ReusedService,
    /// The local server is running under supervision.
    LocalServer(SupervisedProcess),
    /// The service was started or installed.
    Service { pid: Option<u32> },
    /// Neither backend could be brought up; the user has been told.
    Unavailable,
    /// The user closed the backend chooser without picking one.
    Declined,
    /// The user abandoned recovery; the host has been asked to exit.
    Aborted,
}

impl BackendOutcome {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::ReusedService => "reused_service",
            Self::LocalServer(_) => "local_server",
            Self::Service { .. } => "service",
            Self::Unavailable => "unavailable",
            Self::Declined => "declined",
            Self::Aborted => "aborted",
        }
    }
}

// Recovery dialog buttons
const OPEN_FOLDER: usize = 0;
const OPEN_DOWNLOAD_PAGE: usize = 1;
const CONFIRM: usize = 2;

// Backend chooser buttons
const CHOOSE_SERVICE: usize = 0;
const CHOOSE_SERVER_JS: usize = 1;

#[derive(Debug)]
pub struct Provisioner<'a> {
    ctx: &'a ProvisionContext,
    cancel: CancellationToken,
}

impl<'a> Provisioner<'a> {
    pub fn new(ctx: &'a ProvisionContext) -> Self {
        Self {
            ctx,
            cancel: CancellationToken::new(),
        }
    }

    /// Use `cancel` to abort a pending service installation wait.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub async fn provision(&self, options: LaunchOptions) -> BackendOutcome {
        if options.no_stremio_server {
            info!("Launching without built-in streaming server");
            return BackendOutcome::Disabled;
        }

        let locator = ServiceLocator::new(self.ctx);
        if locator.is_process_running().await {
            info!("Streaming service already running; reusing it");
            return BackendOutcome::ReusedService;
        }

        let preference = if self.ctx.platform.os.offers_backend_choice() {
            match self.backend_preference() {
                Some(preference) => preference,
                None => return BackendOutcome::Declined,
            }
        } else {
            BackendPreference::ServerJs
        };

        match preference {
            BackendPreference::StremioService => self.use_service(&locator).await,
            BackendPreference::ServerJs => self.use_local_server(&locator).await,
        }
    }

    /// Saved preference, or ask once and save the answer.
    fn backend_preference(&self) -> Option<BackendPreference> {
        if let Some(saved) = read_preference(&self.ctx.paths) {
            info!(flag = saved.flag_file(), "Using saved streaming backend");
            return Some(saved);
        }

        let alert = Alert::new(
            AlertKind::Info,
            "Streaming backend",
            "Choose how streaming is provided. Stremio Service runs as a separate \
             background application; server.js runs inside this app and needs \
             ffmpeg and ffprobe.",
        )
        .with_buttons(["Stremio Service", "server.js"]);

        let preference = match self.ctx.alerts.show_alert(&alert) {
            Some(CHOOSE_SERVICE) => BackendPreference::StremioService,
            Some(CHOOSE_SERVER_JS) => BackendPreference::ServerJs,
            _ => {
                warn!("Streaming backend chooser closed without a choice");
                return None;
            }
        };

        if let Err(e) = persist_preference(&self.ctx.paths, preference) {
            warn!(error = %e, "Could not save streaming backend preference");
        }
        Some(preference)
    }

    async fn use_local_server(&self, locator: &ServiceLocator<'_>) -> BackendOutcome {
        let server = StreamingServer::new(self.ctx);

        match server.ensure_streaming_server_files().await {
            ProvisioningStatus::Ready { binaries } => self.launch_local(&server, &binaries, locator).await,
            ProvisioningStatus::MissingFfmpeg => {
                warn!("ffmpeg/ffprobe unavailable; falling back to the streaming service");
                self.use_service(locator).await
            }
            ProvisioningStatus::MissingServerJs => {
                if !self.recover_server_js(&server) {
                    return BackendOutcome::Aborted;
                }
                match server.ensure_streaming_server_files().await {
                    ProvisioningStatus::Ready { binaries } => {
                        self.launch_local(&server, &binaries, locator).await
                    }
                    status => {
                        warn!(%status, "Streaming server still not ready after recovery");
                        self.ctx.alerts.show_alert(&Alert::new(
                            AlertKind::Warning,
                            "Streaming server unavailable",
                            "server.js was found, but ffmpeg and ffprobe could not be \
                             provisioned. Stremio Service will be used instead.",
                        ));
                        self.use_service(locator).await
                    }
                }
            }
        }
    }

    async fn launch_local(
        &self,
        server: &StreamingServer<'_>,
        binaries: &ResolvedBinaries,
        locator: &ServiceLocator<'_>,
    ) -> BackendOutcome {
        match server.start_with(Some(binaries)) {
            Ok(process) => BackendOutcome::LocalServer(process),
            Err(SupervisorError::ServerScriptMissing(_)) => BackendOutcome::Aborted,
            Err(e) => {
                error!(error = %e, "Could not start the streaming server");
                self.ctx.alerts.show_alert(&Alert::new(
                    AlertKind::Warning,
                    "Streaming server failed to start",
                    format!("{e}. Stremio Service will be used instead."),
                ));
                self.use_service(locator).await
            }
        }
    }

    /// Ask the user to supply `server.js` until they confirm it is there.
    ///
    /// Closing the dialog exits the host with status 1 and returns `false`.
    fn recover_server_js(&self, server: &StreamingServer<'_>) -> bool {
        let os = self.ctx.platform.os;
        let message = format!(
            "server.js was not found in {}.\n\nDownload it from {} and place it in that \
             folder, then confirm.",
            server.streaming_server_dir().display(),
            server.server_js_url(),
        );
        let alert = Alert::new(AlertKind::Warning, "Streaming server files missing", message)
            .with_buttons(["Open folder", "Open download page", "Done"]);

        loop {
            match self.ctx.alerts.show_alert(&alert) {
                Some(OPEN_FOLDER) => {
                    if let Err(e) = server.open_streaming_server_dir() {
                        warn!(error = %e, "Could not open streaming server folder");
                    }
                }
                Some(OPEN_DOWNLOAD_PAGE) => {
                    if let Err(e) =
                        open_detached(self.ctx.commands.as_ref(), os, server.server_js_url())
                    {
                        warn!(error = %e, "Could not open download page");
                    }
                }
                Some(CONFIRM) => {
                    if server.server_js_exists() {
                        info!("server.js supplied by the user");
                        return true;
                    }
                    warn!("server.js still missing after confirmation");
                }
                _ => {
                    error!("Streaming server setup abandoned");
                    self.ctx.host.exit(1);
                    return false;
                }
            }
        }
    }

    async fn use_service(&self, locator: &ServiceLocator<'_>) -> BackendOutcome {
        if let Some(executable) = locator.find_executable().await {
            return match locator.start(&executable) {
                Ok(pid) => BackendOutcome::Service { pid },
                Err(e) => {
                    error!(error = %e, "Failed to start the streaming service");
                    self.report_unavailable(&format!("Stremio Service could not be started: {e}"));
                    BackendOutcome::Unavailable
                }
            };
        }

        info!("Streaming service not installed; installing");
        if ServiceInstaller::with_locator(locator.clone())
            .download_and_install(&self.cancel)
            .await
        {
            BackendOutcome::Service { pid: None }
        } else {
            self.report_unavailable(
                "Stremio Service could not be installed automatically. Streaming will not \
                 be available until it is installed.",
            );
            BackendOutcome::Unavailable
        }
    }

    fn report_unavailable(&self, message: &str) {
        self.ctx.alerts.show_alert(&Alert::new(
            AlertKind::Error,
            "Streaming unavailable",
            message,
        ));
    }
}
