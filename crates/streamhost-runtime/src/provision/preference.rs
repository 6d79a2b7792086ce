//! Persisted backend choice (Windows only): two mutually exclusive flag files.

use std::fs;
use std::io;

use streamhost_core::{BackendPreference, StreamingPaths};
use tracing::info;

/// The saved choice, if any. The service flag wins if both somehow exist.
pub fn read_preference(paths: &StreamingPaths) -> Option<BackendPreference> {
    [BackendPreference::StremioService, BackendPreference::ServerJs]
        .into_iter()
        .find(|pref| paths.preference_flag_path(*pref).exists())
}

/// Write the flag for `preference` and remove the other one.
pub fn persist_preference(paths: &StreamingPaths, preference: BackendPreference) -> io::Result<()> {
    fs::create_dir_all(paths.data_dir())?;
    fs::write(paths.preference_flag_path(preference), b"")?;
    match fs::remove_file(paths.preference_flag_path(preference.other())) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }
    info!(flag = preference.flag_file(), "Saved streaming backend preference");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use streamhost_core::Os;

    #[test]
    fn switching_preference_replaces_flag() {
        let dir = tempfile::tempdir().unwrap();
        let paths = StreamingPaths::new(dir.path(), Os::Win32);
        assert_eq!(read_preference(&paths), None);

        persist_preference(&paths, BackendPreference::ServerJs).unwrap();
        assert_eq!(read_preference(&paths), Some(BackendPreference::ServerJs));

        persist_preference(&paths, BackendPreference::StremioService).unwrap();
        assert_eq!(read_preference(&paths), Some(BackendPreference::StremioService));
        assert!(!paths.preference_flag_path(BackendPreference::ServerJs).exists());
    }
}
