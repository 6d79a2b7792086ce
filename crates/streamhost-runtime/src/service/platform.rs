//! Per-OS knowledge about the external service.
//!
//! One [`ServicePlatform`] is selected for the host OS when a
//! [`ServiceLocator`](super::ServiceLocator) is built; nothing else in the
//! service module branches on the operating system.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use streamhost_core::constants::{
    FLATHUB_REMOTE_URL, FLATPAK_RUNTIME, SERVICE_BINARY, SERVICE_DISPLAY_NAME, SERVICE_FLATPAK_ID,
    SERVICE_MAC_BUNDLE, SERVICE_MAC_VOLUME,
};
use streamhost_core::platform::Os;
use streamhost_core::ports::{CommandError, CommandOutput, CommandRunner, ExternalCommand};
use tracing::{debug, info, warn};

use crate::system::parse;

/// OS-specific checks, install routine and launch command for the service.
#[async_trait]
pub trait ServicePlatform: Send + Sync {
    fn os(&self) -> Os;

    /// Release asset extension for this OS (`.exe`, `.dmg`, `.flatpak`).
    fn installer_extension(&self) -> &'static str;

    fn executable_file_name(&self) -> String {
        format!("{SERVICE_BINARY}{}", self.os().exe_suffix())
    }

    /// Fixed install locations, checked in order.
    fn conventional_locations(&self) -> Vec<PathBuf>;

    /// Package-manager install location, when the OS has one.
    async fn locate_packaged(&self, _commands: &dyn CommandRunner) -> Option<PathBuf> {
        None
    }

    async fn is_installed(&self, commands: &dyn CommandRunner) -> bool;

    async fn is_running(&self, commands: &dyn CommandRunner) -> bool;

    async fn find_pid(&self, commands: &dyn CommandRunner) -> Option<u32>;

    /// Run the silent installer for `installer`.
    async fn install(
        &self,
        commands: &dyn CommandRunner,
        installer: &Path,
    ) -> Result<(), CommandError>;

    /// Command that launches the service from `executable`.
    fn launch_command(&self, executable: &Path) -> ExternalCommand {
        ExternalCommand::new(executable.to_string_lossy())
    }
}

/// Strategy for `os`.
pub fn service_platform(os: Os) -> Arc<dyn ServicePlatform> {
    match os {
        Os::Win32 => Arc::new(WindowsService),
        Os::Darwin => Arc::new(MacService::default()),
        Os::Linux => Arc::new(LinuxService),
    }
}

/// `pgrep <flag> stremio-service`, first PID.
async fn pgrep(commands: &dyn CommandRunner, flag: &str) -> Option<u32> {
    let command = ExternalCommand::new("pgrep").args([flag, SERVICE_BINARY]);
    match commands.output(&command).await {
        Ok(out) if out.success() => parse::pgrep_pids(&out.stdout).into_iter().next(),
        Ok(_) => None,
        Err(e) => {
            debug!(error = %e, "pgrep unavailable");
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Windows
// ---------------------------------------------------------------------------

const UNINSTALL_REGISTRY_QUERY: &str = r"
$paths = @(
    'HKLM:\SOFTWARE\Microsoft\Windows\CurrentVersion\Uninstall\*',
    'HKLM:\SOFTWARE\WOW6432Node\Microsoft\Windows\CurrentVersion\Uninstall\*',
    'HKCU:\SOFTWARE\Microsoft\Windows\CurrentVersion\Uninstall\*'
)
foreach ($p in $paths) {
    $items = Get-ItemProperty -Path $p -ErrorAction SilentlyContinue |
    Where-Object { $_.DisplayName -like '*__NAME__*' }
    if ($items) { Write-Output 'FOUND'; break }
}
";

#[derive(Debug, Default, Clone, Copy)]
pub struct WindowsService;

impl WindowsService {
    fn image_name(self) -> String {
        self.executable_file_name()
    }

    async fn tasklist_pids(self, commands: &dyn CommandRunner) -> Vec<u32> {
        let image = self.image_name();
        let filter = format!("IMAGENAME eq {image}");
        let command = ExternalCommand::new("tasklist").args(["/FI", filter.as_str()]);
        match commands.output(&command).await {
            Ok(out) => parse::tasklist_pids(&out.stdout, &image),
            Err(e) => {
                warn!(error = %e, "tasklist failed");
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl ServicePlatform for WindowsService {
    fn os(&self) -> Os {
        Os::Win32
    }

    fn installer_extension(&self) -> &'static str {
        ".exe"
    }

    fn conventional_locations(&self) -> Vec<PathBuf> {
        let local_app_data = std::env::var_os("LOCALAPPDATA")
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|home| home.join("AppData").join("Local")));
        local_app_data
            .map(|base| {
                base.join("Programs")
                    .join("StremioService")
                    .join(self.executable_file_name())
            })
            .into_iter()
            .collect()
    }

    async fn is_installed(&self, commands: &dyn CommandRunner) -> bool {
        let script = UNINSTALL_REGISTRY_QUERY.replace("__NAME__", SERVICE_DISPLAY_NAME);
        let command =
            ExternalCommand::new("powershell.exe").args(["-NoProfile", "-Command", script.as_str()]);
        match commands.output(&command).await {
            Ok(out) => parse::registry_query_found(&out.stdout),
            Err(e) => {
                debug!(error = %e, "Registry query failed");
                false
            }
        }
    }

    async fn is_running(&self, commands: &dyn CommandRunner) -> bool {
        !self.tasklist_pids(commands).await.is_empty()
    }

    async fn find_pid(&self, commands: &dyn CommandRunner) -> Option<u32> {
        self.tasklist_pids(commands).await.into_iter().next()
    }

    async fn install(
        &self,
        commands: &dyn CommandRunner,
        installer: &Path,
    ) -> Result<(), CommandError> {
        let script = format!(
            "Start-Process -FilePath \"{}\" -ArgumentList '/S' -Verb RunAs",
            installer.display()
        );
        commands
            .run(&ExternalCommand::new("powershell.exe").args([
                "-ExecutionPolicy",
                "Bypass",
                "-NoProfile",
                "-Command",
                script.as_str(),
            ]))
            .await
            .map(|_| ())
    }
}

// ---------------------------------------------------------------------------
// macOS
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct MacService {
    applications_dir: PathBuf,
    volume: PathBuf,
}

impl Default for MacService {
    fn default() -> Self {
        Self::new("/Applications", SERVICE_MAC_VOLUME)
    }
}

impl MacService {
    pub fn new(applications_dir: impl Into<PathBuf>, volume: impl Into<PathBuf>) -> Self {
        Self {
            applications_dir: applications_dir.into(),
            volume: volume.into(),
        }
    }

    fn bundle_executable(&self) -> PathBuf {
        self.applications_dir
            .join(SERVICE_MAC_BUNDLE)
            .join("Contents")
            .join("MacOS")
            .join(SERVICE_BINARY)
    }
}

#[async_trait]
impl ServicePlatform for MacService {
    fn os(&self) -> Os {
        Os::Darwin
    }

    fn installer_extension(&self) -> &'static str {
        ".dmg"
    }

    fn conventional_locations(&self) -> Vec<PathBuf> {
        vec![self.bundle_executable()]
    }

    async fn is_installed(&self, _commands: &dyn CommandRunner) -> bool {
        self.bundle_executable().is_file()
    }

    async fn is_running(&self, commands: &dyn CommandRunner) -> bool {
        pgrep(commands, "-x").await.is_some()
    }

    async fn find_pid(&self, commands: &dyn CommandRunner) -> Option<u32> {
        pgrep(commands, "-f").await
    }

    /// Mount the image, copy the bundle, and always detach.
    async fn install(
        &self,
        commands: &dyn CommandRunner,
        installer: &Path,
    ) -> Result<(), CommandError> {
        let volume = self.volume.to_string_lossy().into_owned();
        let image = installer.to_string_lossy().into_owned();
        let bundle = self.volume.join(SERVICE_MAC_BUNDLE);

        let copied = async {
            commands
                .run(&ExternalCommand::new("hdiutil").args([
                    "attach",
                    image.as_str(),
                    "-mountpoint",
                    volume.as_str(),
                ]))
                .await?;
            commands
                .run(&ExternalCommand::new("cp").args([
                    "-R".to_string(),
                    bundle.to_string_lossy().into_owned(),
                    format!("{}/", self.applications_dir.display()),
                ]))
                .await
        }
        .await;

        if let Err(e) = commands
            .output(&ExternalCommand::new("hdiutil").args(["detach", volume.as_str()]))
            .await
        {
            debug!(error = %e, "hdiutil detach failed");
        }

        copied.map(|_| ())
    }
}

// ---------------------------------------------------------------------------
// Linux
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Clone, Copy)]
pub struct LinuxService;

#[async_trait]
impl ServicePlatform for LinuxService {
    fn os(&self) -> Os {
        Os::Linux
    }

    fn installer_extension(&self) -> &'static str {
        ".flatpak"
    }

    fn conventional_locations(&self) -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from("/usr/local/bin").join(SERVICE_BINARY),
            PathBuf::from("/usr/bin").join(SERVICE_BINARY),
        ];
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join("bin").join(SERVICE_BINARY));
        }
        paths
    }

    async fn locate_packaged(&self, commands: &dyn CommandRunner) -> Option<PathBuf> {
        let out = commands
            .output(&ExternalCommand::new("flatpak").args([
                "info",
                "--show-location",
                SERVICE_FLATPAK_ID,
            ]))
            .await
            .ok()
            .filter(CommandOutput::success)?;
        let location = out.stdout.trim();
        if location.is_empty() {
            return None;
        }
        let executable = Path::new(location)
            .join("files")
            .join("bin")
            .join(SERVICE_BINARY);
        executable.is_file().then_some(executable)
    }

    async fn is_installed(&self, commands: &dyn CommandRunner) -> bool {
        match commands
            .output(&ExternalCommand::new("flatpak").args(["info", SERVICE_FLATPAK_ID]))
            .await
        {
            Ok(out) => out.success() && parse::mentions_app_id(&out.stdout, SERVICE_FLATPAK_ID),
            Err(e) => {
                debug!(error = %e, "flatpak unavailable");
                false
            }
        }
    }

    async fn is_running(&self, commands: &dyn CommandRunner) -> bool {
        if pgrep(commands, "-x").await.is_some() {
            return true;
        }
        matches!(
            commands.output(&ExternalCommand::new("flatpak").arg("ps")).await,
            Ok(out) if out.success() && parse::mentions_app_id(&out.stdout, SERVICE_FLATPAK_ID)
        )
    }

    async fn find_pid(&self, commands: &dyn CommandRunner) -> Option<u32> {
        pgrep(commands, "-f").await
    }

    async fn install(
        &self,
        commands: &dyn CommandRunner,
        installer: &Path,
    ) -> Result<(), CommandError> {
        let remote = ExternalCommand::new("flatpak").args([
            "remote-add",
            "--user",
            "--if-not-exists",
            "flathub",
            FLATHUB_REMOTE_URL,
        ]);
        if let Err(e) = commands.run(&remote).await {
            debug!(error = %e, "flatpak remote-add failed; continuing");
        }

        let runtime_present = commands
            .output(&ExternalCommand::new("flatpak").args(["info", FLATPAK_RUNTIME]))
            .await
            .is_ok_and(|out| out.success());
        if !runtime_present {
            info!(runtime = FLATPAK_RUNTIME, "Installing required Flatpak runtime");
            commands
                .run(&ExternalCommand::new("flatpak").args([
                    "install",
                    "--user",
                    "-y",
                    "flathub",
                    FLATPAK_RUNTIME,
                ]))
                .await?;
        }

        let bundle = installer.to_string_lossy().into_owned();
        commands
            .run(&ExternalCommand::new("flatpak").args([
                "install",
                "--user",
                "-y",
                bundle.as_str(),
            ]))
            .await
            .map(|_| ())
    }

    fn launch_command(&self, executable: &Path) -> ExternalCommand {
        if parse::is_flatpak_deployment(executable) {
            ExternalCommand::new("flatpak").args(["run", SERVICE_FLATPAK_ID])
        } else {
            ExternalCommand::new(executable.to_string_lossy())
        }
    }
}
