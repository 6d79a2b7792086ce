//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces that the core domain expects from infrastructure.
//! They contain no implementation details and use only domain types.
//!
//! # Design Rules
//!
//! - No `reqwest`/`tokio::process` types in any signature
//! - Sentinel-friendly: callers branch on results rather than catching panics
//! - Every port is object-safe so the runtime context can hold `Arc<dyn _>`

pub mod alert;
pub mod clock;
pub mod command;
pub mod fetch;
pub mod lifecycle;
pub mod server_log_sink;

pub use alert::{Alert, AlertKind, AlertPresenter, NonInteractiveAlerts};
pub use clock::Clock;
pub use command::{CommandError, CommandOutput, CommandRunner, ExternalCommand};
pub use fetch::{DownloadError, Fetcher};
pub use lifecycle::{ExitHook, HostLifecycle};
pub use server_log_sink::ServerLogSinkPort;
