//! Transcoding binaries and the archives they ship in.

use std::fmt;
use std::path::PathBuf;

use crate::constants;
use crate::platform::{Arch, Os, PlatformError, PlatformTarget};

/// The two transcoding binaries the streaming server depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryKind {
    Ffmpeg,
    Ffprobe,
}

impl BinaryKind {
    pub const ALL: [Self; 2] = [Self::Ffmpeg, Self::Ffprobe];

    /// Bare command name, as looked up on the search path.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ffmpeg => "ffmpeg",
            Self::Ffprobe => "ffprobe",
        }
    }

    /// On-disk file name for the given OS (`ffmpeg.exe` on Windows).
    pub fn file_name(self, os: Os) -> String {
        format!("{}{}", self.name(), os.exe_suffix())
    }

    /// Environment variable the streaming server reads this binary's path from.
    pub const fn env_var(self) -> &'static str {
        match self {
            Self::Ffmpeg => constants::FFMPEG_ENV,
            Self::Ffprobe => constants::FFPROBE_ENV,
        }
    }

    /// Download URL of the archive containing this binary.
    ///
    /// Total over the support matrix. On Windows and Linux both binaries
    /// ship in the same archive; macOS publishes one archive per binary.
    pub const fn download_url(self, platform: PlatformTarget) -> &'static str {
        match (platform.os, platform.arch, self) {
            (Os::Win32, Arch::X64, _) => constants::FFMPEG_WIN32_X64,
            (Os::Win32, Arch::Arm64, _) => constants::FFMPEG_WIN32_ARM64,
            (Os::Darwin, Arch::X64, Self::Ffmpeg) => constants::FFMPEG_DARWIN_X64,
            (Os::Darwin, Arch::Arm64, Self::Ffmpeg) => constants::FFMPEG_DARWIN_ARM64,
            (Os::Darwin, Arch::X64, Self::Ffprobe) => constants::FFPROBE_DARWIN_X64,
            (Os::Darwin, Arch::Arm64, Self::Ffprobe) => constants::FFPROBE_DARWIN_ARM64,
            (Os::Linux, Arch::X64, _) => constants::FFMPEG_LINUX_X64,
            (Os::Linux, Arch::Arm64, _) => constants::FFMPEG_LINUX_ARM64,
        }
    }
}

impl fmt::Display for BinaryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Resolve a download URL from raw `(os, arch)` strings.
///
/// Pairs outside the support matrix yield [`PlatformError`].
pub fn binary_url(kind: BinaryKind, os: &str, arch: &str) -> Result<&'static str, PlatformError> {
    PlatformTarget::parse(os, arch).map(|platform| kind.download_url(platform))
}

/// Compression format of a downloaded archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    TarXz,
}

impl ArchiveFormat {
    pub const fn for_os(os: Os) -> Self {
        match os {
            Os::Win32 | Os::Darwin => Self::Zip,
            Os::Linux => Self::TarXz,
        }
    }

    /// File extension used for the temporary archive on disk.
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Zip => "zip",
            Self::TarXz => "tar.xz",
        }
    }
}

/// Where a binary comes from and where it must end up.
///
/// Derived from a [`PlatformTarget`] at lookup time and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryAsset {
    pub kind: BinaryKind,
    pub url: &'static str,
    pub archive_format: ArchiveFormat,
    pub dest_path: PathBuf,
}

impl BinaryAsset {
    pub fn new(kind: BinaryKind, platform: PlatformTarget, dest_path: PathBuf) -> Self {
        Self {
            kind,
            url: kind.download_url(platform),
            archive_format: ArchiveFormat::for_os(platform.os),
            dest_path,
        }
    }
}

/// Paths of both binaries once resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBinaries {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
}

impl ResolvedBinaries {
    pub fn get(&self, kind: BinaryKind) -> &PathBuf {
        match kind {
            BinaryKind::Ffmpeg => &self.ffmpeg,
            BinaryKind::Ffprobe => &self.ffprobe,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_supported_pair_has_urls() {
        for platform in PlatformTarget::all() {
            for kind in BinaryKind::ALL {
                let url = binary_url(kind, platform.os.as_str(), platform.arch.as_str()).unwrap();
                assert!(url.starts_with("https://"), "{platform} {kind}: {url}");
            }
        }
    }

    #[test]
    fn unsupported_pairs_are_rejected() {
        assert!(matches!(
            binary_url(BinaryKind::Ffmpeg, "sunos", "x64"),
            Err(PlatformError::UnsupportedOs(_))
        ));
        assert!(matches!(
            binary_url(BinaryKind::Ffprobe, "win32", "ia32"),
            Err(PlatformError::UnsupportedArch(_))
        ));
    }

    #[test]
    fn macos_ships_separate_archives() {
        let mac = PlatformTarget::new(Os::Darwin, Arch::Arm64);
        assert_ne!(
            BinaryKind::Ffmpeg.download_url(mac),
            BinaryKind::Ffprobe.download_url(mac)
        );

        let linux = PlatformTarget::new(Os::Linux, Arch::X64);
        assert_eq!(
            BinaryKind::Ffmpeg.download_url(linux),
            BinaryKind::Ffprobe.download_url(linux)
        );
    }

    #[test]
    fn archive_format_follows_os() {
        assert_eq!(ArchiveFormat::for_os(Os::Linux), ArchiveFormat::TarXz);
        assert_eq!(ArchiveFormat::for_os(Os::Win32), ArchiveFormat::Zip);
        assert_eq!(BinaryKind::Ffprobe.file_name(Os::Win32), "ffprobe.exe");
        assert_eq!(BinaryKind::Ffprobe.file_name(Os::Linux), "ffprobe");
    }
}
