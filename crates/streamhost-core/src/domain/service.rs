//! External service state and the user's backend preference.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants;

/// Snapshot of the external service, computed on demand and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct InstalledServiceRecord {
    pub installed: bool,
    pub running: bool,
    pub executable_path: Option<PathBuf>,
}

/// Which backend the user picked on platforms offering both.
///
/// Persisted as the presence of one of two flag files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendPreference {
    StremioService,
    ServerJs,
}

impl BackendPreference {
    pub const fn flag_file(self) -> &'static str {
        match self {
            Self::StremioService => constants::USE_SERVICE_FLAG,
            Self::ServerJs => constants::USE_SERVER_JS_FLAG,
        }
    }

    pub const fn other(self) -> Self {
        match self {
            Self::StremioService => Self::ServerJs,
            Self::ServerJs => Self::StremioService,
        }
    }
}

/// Written after a successful service install.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInstallRecord {
    /// Release tag the installer came from (e.g. `v0.1.13`).
    pub version: String,
    pub platform: String,
    pub installed_at: DateTime<Utc>,
}

impl ServiceInstallRecord {
    pub fn new(version: impl Into<String>, platform: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            platform: platform.into(),
            installed_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preference_flags_are_distinct() {
        assert_ne!(
            BackendPreference::StremioService.flag_file(),
            BackendPreference::ServerJs.flag_file()
        );
        assert_eq!(
            BackendPreference::ServerJs.other(),
            BackendPreference::StremioService
        );
    }

    #[test]
    fn install_record_serializes_with_timestamp() {
        let record = ServiceInstallRecord::new("v0.1.13", "linux-x64");
        let json = serde_json::to_string(&record).unwrap();
        let back: ServiceInstallRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
