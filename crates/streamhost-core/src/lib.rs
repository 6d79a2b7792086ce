//! Core domain types and port definitions for streamhost.
//!
//! This crate is pure: it owns the vocabulary of streaming-backend
//! provisioning (platform targets, binary assets, provisioning states,
//! service records), the path conventions of the user-data directory,
//! configuration, and the port traits that runtime adapters implement.
//! Nothing here spawns processes or touches the network.

pub mod config;
pub mod constants;
pub mod domain;
pub mod paths;
pub mod platform;
pub mod ports;
pub mod version;

pub use config::{ConfigError, ProvisionConfig};
pub use domain::{
    ArchiveFormat, BackendPreference, BinaryAsset, BinaryKind, InstalledServiceRecord,
    ProvisioningState, ProvisioningStatus, ResolvedBinaries, ServiceInstallRecord,
};
pub use paths::{PathError, StreamingPaths, data_root};
pub use platform::{Arch, Os, PlatformError, PlatformTarget};
pub use ports::{
    Alert, AlertKind, AlertPresenter, Clock, CommandError, CommandOutput, CommandRunner,
    DownloadError, ExitHook, ExternalCommand, Fetcher, HostLifecycle, NonInteractiveAlerts,
    ServerLogSinkPort,
};
pub use version::is_newer_version;
