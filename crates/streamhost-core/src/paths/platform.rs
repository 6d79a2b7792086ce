//! User-data root resolution.

use std::env;
use std::fs;
use std::path::PathBuf;

use super::error::PathError;

/// Environment override for the user-data directory.
pub const DATA_DIR_ENV: &str = "STREAMHOST_DATA_DIR";

/// Get the root directory for user data (streaming server, logs, flags).
///
/// Resolution order:
/// 1. `STREAMHOST_DATA_DIR` environment variable (highest priority)
/// 2. System data directory (e.g., `~/.local/share/streamhost`)
///
/// The directory is created if it does not exist.
pub fn data_root() -> Result<PathBuf, PathError> {
    let root = match env::var(DATA_DIR_ENV) {
        Ok(path) if !path.trim().is_empty() => PathBuf::from(path),
        Ok(_) => return Err(PathError::EmptyPath),
        Err(_) => dirs::data_local_dir()
            .ok_or(PathError::NoDataDir)?
            .join("streamhost"),
    };

    if !root.exists() {
        fs::create_dir_all(&root).map_err(|e| PathError::CreateFailed {
            path: root.clone(),
            reason: e.to_string(),
        })?;
    }

    Ok(root)
}
