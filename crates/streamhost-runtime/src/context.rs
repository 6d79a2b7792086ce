//! Explicit dependency context for the provisioning subsystem.
//!
//! Built once by the composition root and passed by reference to every
//! component. Collaborators are trait objects so tests can substitute
//! fakes for the command runner, fetcher, clock, presenter and host.

use std::sync::Arc;

use streamhost_core::ports::{AlertPresenter, Clock, CommandRunner, Fetcher, HostLifecycle};
use streamhost_core::{PlatformTarget, ProvisionConfig, StreamingPaths};

use crate::http::ReqwestFetcher;
use crate::lifecycle::ProcessHost;
use crate::system::{TokioClock, TokioCommandRunner};

#[derive(Clone)]
pub struct ProvisionContext {
    pub config: ProvisionConfig,
    pub platform: PlatformTarget,
    pub paths: StreamingPaths,
    pub commands: Arc<dyn CommandRunner>,
    pub fetcher: Arc<dyn Fetcher>,
    pub clock: Arc<dyn Clock>,
    pub alerts: Arc<dyn AlertPresenter>,
    pub host: Arc<dyn HostLifecycle>,
}

impl std::fmt::Debug for ProvisionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProvisionContext")
            .field("config", &self.config)
            .field("platform", &self.platform)
            .field("paths", &self.paths)
            .finish_non_exhaustive()
    }
}

impl ProvisionContext {
    /// Assemble a context from explicit collaborators.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: ProvisionConfig,
        platform: PlatformTarget,
        commands: Arc<dyn CommandRunner>,
        fetcher: Arc<dyn Fetcher>,
        clock: Arc<dyn Clock>,
        alerts: Arc<dyn AlertPresenter>,
        host: Arc<dyn HostLifecycle>,
    ) -> Self {
        let paths = StreamingPaths::new(&config.data_dir, platform.os);
        Self {
            config,
            platform,
            paths,
            commands,
            fetcher,
            clock,
            alerts,
            host,
        }
    }

    /// Production wiring: real processes, network, timers and exit hooks.
    pub fn system(
        config: ProvisionConfig,
        platform: PlatformTarget,
        fetcher: ReqwestFetcher,
        alerts: Arc<dyn AlertPresenter>,
        host: Arc<ProcessHost>,
    ) -> Self {
        Self::new(
            config,
            platform,
            Arc::new(TokioCommandRunner),
            Arc::new(fetcher),
            Arc::new(TokioClock),
            alerts,
            host,
        )
    }
}
