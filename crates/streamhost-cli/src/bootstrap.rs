//! CLI bootstrap - the composition root.
//!
//! The only place where concrete adapters are wired together: the command
//! runner, the HTTP fetcher with its progress bar, the dialog presenter and
//! the process host that owns exit hooks.

use std::path::PathBuf;
use std::sync::Arc;

use streamhost_core::ports::{AlertPresenter, NonInteractiveAlerts};
use streamhost_core::{PlatformTarget, ProvisionConfig};
use streamhost_runtime::{ProcessHost, ProvisionContext, ReqwestFetcher};
use tokio_util::sync::CancellationToken;

use crate::error::CliError;
use crate::parser::Cli;
use crate::presentation::{ConsoleAlerts, DownloadProgress};

/// Values from flags (or their environment fallbacks) that override defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOverrides {
    pub data_dir: Option<PathBuf>,
    pub node_bin: Option<String>,
    pub service_dir: Option<PathBuf>,
    pub install_timeout: Option<u64>,
    pub non_interactive: bool,
}

impl From<&Cli> for CliOverrides {
    fn from(cli: &Cli) -> Self {
        Self {
            data_dir: cli.data_dir.clone(),
            node_bin: cli.node_bin.clone(),
            service_dir: cli.service_dir.clone(),
            install_timeout: cli.install_timeout,
            non_interactive: cli.non_interactive,
        }
    }
}

impl CliOverrides {
    /// Defaults, then environment, then these overrides.
    pub fn build_config(&self) -> Result<ProvisionConfig, CliError> {
        let mut config = match &self.data_dir {
            Some(dir) => ProvisionConfig::with_data_dir(dir),
            None => ProvisionConfig::from_env()?,
        };

        if let Some(node) = &self.node_bin {
            config.node_binary.clone_from(node);
        }
        if let Some(dir) = &self.service_dir {
            config.portable_service_dir = Some(dir.clone());
        }
        match self.install_timeout {
            Some(0) => {
                return Err(CliError::Config(
                    "install timeout must be at least one second".to_string(),
                ));
            }
            Some(secs) => config.install_timeout_secs = secs,
            None => {}
        }

        Ok(config)
    }
}

/// Fully composed context for command handlers.
#[derive(Debug)]
pub struct CliContext {
    pub provision: ProvisionContext,
    /// Concrete host so handlers can run exit hooks and force an exit.
    pub host: Arc<ProcessHost>,
    /// Cancelled on the first Ctrl-C.
    pub shutdown: CancellationToken,
}

pub fn bootstrap(overrides: &CliOverrides) -> Result<CliContext, CliError> {
    let platform = PlatformTarget::current()?;
    let config = overrides.build_config()?;

    let progress = Arc::new(DownloadProgress::new());
    let fetcher = ReqwestFetcher::new()
        .map_err(|e| CliError::Config(e.to_string()))?
        .with_progress(progress.callback());

    let alerts: Arc<dyn AlertPresenter> = if overrides.non_interactive {
        Arc::new(NonInteractiveAlerts)
    } else {
        Arc::new(ConsoleAlerts::new())
    };

    let host = ProcessHost::install();
    let provision = ProvisionContext::system(config, platform, fetcher, alerts, Arc::clone(&host));

    tracing::debug!(
        platform = %platform,
        data_dir = %provision.config.data_dir.display(),
        "CLI context ready"
    );

    Ok(CliContext {
        provision,
        host,
        shutdown: CancellationToken::new(),
    })
}
