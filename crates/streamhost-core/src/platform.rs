//! Platform targets for binary and service provisioning.
//!
//! Only `{win32, darwin, linux} × {x64, arm64}` is supported. Every other
//! combination is rejected at parse time, so a constructed [`PlatformTarget`]
//! is always a member of the support matrix and downstream lookups can be
//! total functions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when the host platform is outside the support matrix.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlatformError {
    /// Operating system is not one of win32, darwin, linux.
    #[error("unsupported operating system: {0}")]
    UnsupportedOs(String),

    /// Architecture is not one of x64, arm64.
    #[error("unsupported architecture: {0}")]
    UnsupportedArch(String),
}

/// Supported operating systems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Os {
    Win32,
    Darwin,
    Linux,
}

impl Os {
    /// Canonical short name (`win32`, `darwin`, `linux`).
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Win32 => "win32",
            Self::Darwin => "darwin",
            Self::Linux => "linux",
        }
    }

    /// Suffix appended to executable file names.
    pub const fn exe_suffix(self) -> &'static str {
        match self {
            Self::Win32 => ".exe",
            Self::Darwin | Self::Linux => "",
        }
    }

    /// Whether both streaming backends are offered to the user.
    pub const fn offers_backend_choice(self) -> bool {
        matches!(self, Self::Win32)
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Os {
    type Err = PlatformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "win32" | "windows" => Ok(Self::Win32),
            "darwin" | "macos" => Ok(Self::Darwin),
            "linux" => Ok(Self::Linux),
            other => Err(PlatformError::UnsupportedOs(other.to_string())),
        }
    }
}

/// Supported CPU architectures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    X64,
    Arm64,
}

impl Arch {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::X64 => "x64",
            Self::Arm64 => "arm64",
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Arch {
    type Err = PlatformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "x64" | "x86_64" | "amd64" => Ok(Self::X64),
            "arm64" | "aarch64" => Ok(Self::Arm64),
            other => Err(PlatformError::UnsupportedArch(other.to_string())),
        }
    }
}

/// An `{os, arch}` pair from the support matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlatformTarget {
    pub os: Os,
    pub arch: Arch,
}

impl PlatformTarget {
    pub const fn new(os: Os, arch: Arch) -> Self {
        Self { os, arch }
    }

    /// Parse an `(os, arch)` pair, rejecting anything outside the matrix.
    pub fn parse(os: &str, arch: &str) -> Result<Self, PlatformError> {
        Ok(Self {
            os: os.parse()?,
            arch: arch.parse()?,
        })
    }

    /// Detect the platform this binary was compiled for.
    pub fn current() -> Result<Self, PlatformError> {
        Self::parse(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Every supported pair, in matrix order.
    pub const fn all() -> [Self; 6] {
        [
            Self::new(Os::Win32, Arch::X64),
            Self::new(Os::Win32, Arch::Arm64),
            Self::new(Os::Darwin, Arch::X64),
            Self::new(Os::Darwin, Arch::Arm64),
            Self::new(Os::Linux, Arch::X64),
            Self::new(Os::Linux, Arch::Arm64),
        ]
    }
}

impl fmt::Display for PlatformTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.os, self.arch)
    }
}
