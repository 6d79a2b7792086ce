//! Release metadata and the local install record.

use std::fs;
use std::io;
use std::path::Path;

use serde::Deserialize;
use streamhost_core::ServiceInstallRecord;
use tracing::{debug, warn};

/// GitHub API response for a release.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubRelease {
    pub tag_name: String,
    #[serde(default)]
    pub assets: Vec<GitHubAsset>,
}

/// GitHub API response for a release asset.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubAsset {
    pub name: String,
    pub browser_download_url: String,
    #[serde(default)]
    pub size: u64,
}

impl GitHubRelease {
    /// First asset whose name ends with `extension`, ignoring case.
    pub fn asset_with_extension(&self, extension: &str) -> Option<&GitHubAsset> {
        let extension = extension.to_ascii_lowercase();
        self.assets
            .iter()
            .find(|asset| asset.name.to_ascii_lowercase().ends_with(&extension))
    }
}

/// Read the install record, treating a missing or unreadable file as absent.
pub fn read_install_record(path: &Path) -> Option<ServiceInstallRecord> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Could not read service install record");
            return None;
        }
    };
    match serde_json::from_str(&contents) {
        Ok(record) => Some(record),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Ignoring malformed service install record");
            None
        }
    }
}

pub fn write_install_record(path: &Path, record: &ServiceInstallRecord) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(record).map_err(io::Error::other)?;
    fs::write(path, json)?;
    debug!(path = %path.display(), version = %record.version, "Saved service install record");
    Ok(())
}
