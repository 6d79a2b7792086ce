//! Provisioning states and outcomes of the local streaming server.

use std::fmt;

use super::binary::ResolvedBinaries;

/// Where the streaming-server directory stands during one provisioning pass.
///
/// Transitions only move forward within a single invocation:
/// `DirMissing → MissingServerScript` (terminal) or
/// `DirMissing → MissingBinaries → Ready`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ProvisioningState {
    DirMissing,
    MissingServerScript,
    MissingBinaries,
    Ready,
}

/// Result of `ensure_streaming_server_files`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisioningStatus {
    /// Script and both binaries are in place.
    Ready { binaries: ResolvedBinaries },
    /// `server.js` is absent and must be placed by the user.
    MissingServerJs,
    /// Script is present but the binaries could not be resolved or downloaded.
    MissingFfmpeg,
}

impl ProvisioningStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ready { .. } => "ready",
            Self::MissingServerJs => "missing_server_js",
            Self::MissingFfmpeg => "missing_ffmpeg",
        }
    }

    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }
}

impl fmt::Display for ProvisioningStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
