//! Layout of the streaming-server files inside the user-data directory.
//!
//! ```text
//! <data>/
//!   streamingserver/
//!     server.js
//!     ffmpeg[.exe]
//!     ffprobe[.exe]
//!   stremio-server.log
//!   stremio-service.json
//!   use_stremio_service_for_streaming   (flag, Windows only)
//!   use_server_js_for_streaming         (flag, Windows only)
//! ```

use std::path::{Path, PathBuf};

use crate::constants;
use crate::domain::{BackendPreference, BinaryKind};
use crate::platform::Os;

/// Resolved locations of every persisted artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamingPaths {
    data_dir: PathBuf,
    os: Os,
}

impl StreamingPaths {
    pub fn new(data_dir: impl Into<PathBuf>, os: Os) -> Self {
        Self {
            data_dir: data_dir.into(),
            os,
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub const fn os(&self) -> Os {
        self.os
    }

    pub fn streaming_server_dir(&self) -> PathBuf {
        self.data_dir.join(constants::STREAMING_SERVER_DIR)
    }

    pub fn server_js_path(&self) -> PathBuf {
        self.streaming_server_dir().join(constants::SERVER_JS_FILE)
    }

    /// Conventional destination of a downloaded binary.
    pub fn binary_path(&self, kind: BinaryKind) -> PathBuf {
        self.streaming_server_dir().join(kind.file_name(self.os))
    }

    pub fn log_file_path(&self) -> PathBuf {
        self.data_dir.join(constants::SERVER_LOG_FILE)
    }

    pub fn preference_flag_path(&self, preference: BackendPreference) -> PathBuf {
        self.data_dir.join(preference.flag_file())
    }

    pub fn service_record_path(&self) -> PathBuf {
        self.data_dir.join(constants::SERVICE_RECORD_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binaries_live_next_to_server_js() {
        let paths = StreamingPaths::new("/data", Os::Win32);
        assert_eq!(
            paths.binary_path(BinaryKind::Ffmpeg),
            PathBuf::from("/data").join("streamingserver").join("ffmpeg.exe")
        );
        assert_eq!(
            paths.server_js_path(),
            PathBuf::from("/data").join("streamingserver").join("server.js")
        );
    }

    #[test]
    fn log_and_flags_live_in_data_root() {
        let paths = StreamingPaths::new("/data", Os::Linux);
        assert_eq!(paths.log_file_path(), PathBuf::from("/data").join("stremio-server.log"));
        assert_eq!(
            paths.preference_flag_path(BackendPreference::StremioService),
            PathBuf::from("/data").join("use_stremio_service_for_streaming")
        );
        assert_eq!(
            paths.binary_path(BinaryKind::Ffprobe),
            PathBuf::from("/data").join("streamingserver").join("ffprobe")
        );
    }
}
