//! Runtime adapters and the streaming-backend provisioning subsystem.
//!
//! - [`binaries`]: ffmpeg/ffprobe lookup and archive installation
//! - [`server`]: the local `server.js` and its supervised process
//! - [`service`]: the external service (locate, launch, terminate, install)
//! - [`provision`]: backend selection and fallback
//! - [`system`], [`http`], [`process`], [`lifecycle`]: OS, network and
//!   process plumbing behind the core ports

pub mod binaries;
pub mod context;
pub mod http;
pub mod lifecycle;
pub mod process;
pub mod provision;
pub mod server;
pub mod service;
pub mod system;

pub use binaries::{ArchiveInstaller, BinaryResolver, ExtractError};
pub use context::ProvisionContext;
pub use http::{ProgressCallback, ReqwestFetcher};
pub use lifecycle::ProcessHost;
pub use provision::{BackendOutcome, LaunchOptions, Provisioner};
pub use server::{
    ServerLogFile, ServerProcessSupervisor, StreamingServer, SupervisedProcess, SupervisorError,
};
pub use service::{InstallError, ServiceInstaller, ServiceLocator, ServicePlatform};
pub use system::{TokioClock, TokioCommandRunner};
