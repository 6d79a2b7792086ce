//! Remote endpoints, well-known names and default timings.

/// Streaming server script download.
pub const SERVER_JS_URL: &str = "https://dl.strem.io/server/v4.20.12/desktop/server.js";

/// Latest-release metadata for the external service.
pub const SERVICE_RELEASES_API: &str =
    "https://api.github.com/repos/Stremio/stremio-service/releases/latest";

/// User agent sent with every HTTP request.
pub const USER_AGENT: &str = concat!("streamhost/", env!("CARGO_PKG_VERSION"));

pub const FFMPEG_WIN32_X64: &str = "https://github.com/BtbN/FFmpeg-Builds/releases/download/latest/ffmpeg-master-latest-win64-gpl.zip";
pub const FFMPEG_WIN32_ARM64: &str = "https://github.com/BtbN/FFmpeg-Builds/releases/download/latest/ffmpeg-master-latest-winarm64-gpl.zip";
pub const FFMPEG_DARWIN_X64: &str =
    "https://ffmpeg.martin-riedl.de/download/macos/amd64/1766437297_8.0.1/ffmpeg.zip";
pub const FFMPEG_DARWIN_ARM64: &str =
    "https://ffmpeg.martin-riedl.de/download/macos/arm64/1766430132_8.0.1/ffmpeg.zip";
pub const FFPROBE_DARWIN_X64: &str =
    "https://ffmpeg.martin-riedl.de/download/macos/amd64/1766437297_8.0.1/ffprobe.zip";
pub const FFPROBE_DARWIN_ARM64: &str =
    "https://ffmpeg.martin-riedl.de/download/macos/arm64/1766430132_8.0.1/ffprobe.zip";
pub const FFMPEG_LINUX_X64: &str =
    "https://johnvansickle.com/ffmpeg/releases/ffmpeg-release-amd64-static.tar.xz";
pub const FFMPEG_LINUX_ARM64: &str =
    "https://johnvansickle.com/ffmpeg/releases/ffmpeg-release-arm64-static.tar.xz";

// User-data layout
pub const STREAMING_SERVER_DIR: &str = "streamingserver";
pub const SERVER_JS_FILE: &str = "server.js";
pub const SERVER_LOG_FILE: &str = "stremio-server.log";
pub const SERVICE_RECORD_FILE: &str = "stremio-service.json";
pub const USE_SERVICE_FLAG: &str = "use_stremio_service_for_streaming";
pub const USE_SERVER_JS_FLAG: &str = "use_server_js_for_streaming";

// External service identity
pub const SERVICE_BINARY: &str = "stremio-service";
pub const SERVICE_FLATPAK_ID: &str = "com.stremio.Service";
pub const SERVICE_DISPLAY_NAME: &str = "Stremio Service";
pub const SERVICE_MAC_BUNDLE: &str = "StremioService.app";
pub const SERVICE_MAC_VOLUME: &str = "/Volumes/StremioService";
pub const FLATHUB_REMOTE_URL: &str = "https://dl.flathub.org/repo/flathub.flatpakrepo";
pub const FLATPAK_RUNTIME: &str = "org.freedesktop.Platform//24.08";

// Environment variables injected into the streaming server
pub const FFMPEG_ENV: &str = "FFMPEG_BIN";
pub const FFPROBE_ENV: &str = "FFPROBE_BIN";

// Timings
pub const INSTALL_COMPLETION_TIMEOUT_SECS: u64 = 120;
pub const SERVICE_CHECK_INTERVAL_SECS: u64 = 5;
pub const SERVER_SHUTDOWN_GRACE_SECS: u64 = 5;
