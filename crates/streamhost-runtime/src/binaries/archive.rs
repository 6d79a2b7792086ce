//! Download-and-extract for ffmpeg/ffprobe release archives.
//!
//! Layouts differ per host:
//!
//! - Windows: one zip with `<root>/bin/ffmpeg.exe` and `ffprobe.exe`; the
//!   `bin/` contents are flattened into the destination.
//! - macOS: one zip per binary, each holding the bare executable.
//! - Linux: one `.tar.xz` with a versioned top-level directory, unpacked
//!   with the system `tar`.
//!
//! Everything is unpacked into a staging directory inside the destination
//! first. The archive and staging tree are always removed afterwards, and on
//! failure any binary already moved into place is removed too.

use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use streamhost_core::platform::{Os, PlatformTarget};
use streamhost_core::ports::{CommandError, DownloadError, ExternalCommand};
use streamhost_core::{ArchiveFormat, BinaryAsset, BinaryKind};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::context::ProvisionContext;
use crate::system::parse;

const STAGING_DIR: &str = ".extract";

/// Why an archive could not be turned into binaries.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error(transparent)]
    Download(#[from] DownloadError),

    #[error("failed to read archive {path}: {reason}")]
    Archive { path: PathBuf, reason: String },

    #[error("archive {0} does not have a single top-level directory")]
    Layout(PathBuf),

    #[error("archive from {url} contained no ffmpeg binaries")]
    NoBinaries { url: String },

    #[error(transparent)]
    Command(#[from] CommandError),

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Downloads and unpacks binary archives into the streaming-server directory.
#[derive(Debug, Clone, Copy)]
pub struct ArchiveInstaller<'a> {
    ctx: &'a ProvisionContext,
}

impl<'a> ArchiveInstaller<'a> {
    pub const fn new(ctx: &'a ProvisionContext) -> Self {
        Self { ctx }
    }

    /// Download `url` and extract its binaries into `dest_dir`.
    ///
    /// Returns `false` on any failure; nothing partial is left behind.
    pub async fn download_and_extract(
        &self,
        url: &str,
        dest_dir: &Path,
        platform: PlatformTarget,
    ) -> bool {
        let mut placed = Vec::new();
        let format = ArchiveFormat::for_os(platform.os);
        let archive = dest_dir.join(archive_file_name(url, format));
        let staging = dest_dir.join(STAGING_DIR);

        let result = self
            .extract_into(url, &archive, &staging, dest_dir, platform, &mut placed)
            .await;

        remove_quietly(&archive);
        remove_quietly(&staging);

        match result {
            Ok(()) => {
                info!(url, count = placed.len(), dest = %dest_dir.display(), "Binaries installed");
                true
            }
            Err(e) => {
                error!(url, error = %e, "Failed to install binaries");
                for path in &placed {
                    remove_quietly(path);
                }
                false
            }
        }
    }

    /// Fetch every archive needed for `missing` binaries.
    ///
    /// Windows and Linux ship both binaries in one archive; macOS needs one
    /// download per binary. Succeeds only when every missing binary ends up
    /// at its destination.
    pub async fn install_binaries(&self, missing: &[BinaryKind], platform: PlatformTarget) -> bool {
        let assets: Vec<BinaryAsset> = missing
            .iter()
            .map(|&kind| BinaryAsset::new(kind, platform, self.ctx.paths.binary_path(kind)))
            .collect();
        let urls: BTreeSet<&'static str> = assets.iter().map(|asset| asset.url).collect();
        let dest = self.ctx.paths.streaming_server_dir();

        for url in urls {
            if !self.download_and_extract(url, &dest, platform).await {
                return false;
            }
        }

        match assets.iter().find(|asset| !asset.dest_path.is_file()) {
            Some(asset) => {
                warn!(
                    binary = %asset.kind,
                    url = asset.url,
                    path = %asset.dest_path.display(),
                    "Archive did not provide binary"
                );
                false
            }
            None => true,
        }
    }

    async fn extract_into(
        &self,
        url: &str,
        archive: &Path,
        staging: &Path,
        dest_dir: &Path,
        platform: PlatformTarget,
        placed: &mut Vec<PathBuf>,
    ) -> Result<(), ExtractError> {
        fs::create_dir_all(dest_dir)?;
        self.ctx.fetcher.download(url, archive).await?;

        remove_quietly(staging);
        fs::create_dir_all(staging)?;

        let source = match platform.os {
            Os::Win32 => {
                extract_zip(archive, staging).await?;
                find_dir_named(staging, "bin")?.unwrap_or_else(|| staging.to_path_buf())
            }
            Os::Darwin => {
                extract_zip(archive, staging).await?;
                staging.to_path_buf()
            }
            Os::Linux => self.extract_tar_xz(archive, staging).await?,
        };

        move_binaries(&source, dest_dir, platform.os, placed)?;
        if placed.is_empty() {
            return Err(ExtractError::NoBinaries {
                url: url.to_string(),
            });
        }
        Ok(())
    }

    /// Unpack with the system `tar`; returns the archive's top-level directory.
    async fn extract_tar_xz(&self, archive: &Path, staging: &Path) -> Result<PathBuf, ExtractError> {
        let archive_arg = archive.to_string_lossy().into_owned();
        let staging_arg = staging.to_string_lossy().into_owned();

        let listing = self
            .ctx
            .commands
            .run(&ExternalCommand::new("tar").args(["-tJf", archive_arg.as_str()]))
            .await?;
        let top = parse::tar_top_level_dir(&listing.stdout)
            .ok_or_else(|| ExtractError::Layout(archive.to_path_buf()))?;
        debug!(top = %top, "Archive top-level directory");

        self.ctx
            .commands
            .run(&ExternalCommand::new("tar").args([
                "-xJf",
                archive_arg.as_str(),
                "-C",
                staging_arg.as_str(),
            ]))
            .await?;

        Ok(staging.join(top))
    }
}

fn archive_file_name(url: &str, format: ArchiveFormat) -> String {
    url.rsplit('/')
        .next()
        .filter(|name| !name.is_empty() && !name.contains('?'))
        .map_or_else(|| format!("download.{}", format.extension()), str::to_string)
}

async fn extract_zip(archive: &Path, staging: &Path) -> Result<(), ExtractError> {
    let archive = archive.to_path_buf();
    let staging = staging.to_path_buf();
    tokio::task::spawn_blocking(move || extract_zip_blocking(&archive, &staging))
        .await
        .map_err(|e| ExtractError::Io(io::Error::other(e)))?
}

fn extract_zip_blocking(archive: &Path, staging: &Path) -> Result<(), ExtractError> {
    let archive_err = |reason: String| ExtractError::Archive {
        path: archive.to_path_buf(),
        reason,
    };

    let file = File::open(archive)?;
    let mut zip = zip::ZipArchive::new(file).map_err(|e| archive_err(e.to_string()))?;

    for i in 0..zip.len() {
        let mut entry = zip.by_index(i).map_err(|e| archive_err(e.to_string()))?;
        // Entries escaping the staging directory are skipped
        let Some(relative) = entry.enclosed_name() else {
            warn!(entry = entry.name(), "Skipping unsafe archive entry");
            continue;
        };
        let out = staging.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&out)?;
            continue;
        }
        if let Some(parent) = out.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut dest = File::create(&out)?;
        io::copy(&mut entry, &mut dest)?;
    }
    Ok(())
}

/// Depth-first search for a directory called `name` below `root`.
fn find_dir_named(root: &Path, name: &str) -> io::Result<Option<PathBuf>> {
    for entry in fs::read_dir(root)? {
        let path = entry?.path();
        if !path.is_dir() {
            continue;
        }
        if path.file_name().is_some_and(|n| n == name) {
            return Ok(Some(path));
        }
        if let Some(found) = find_dir_named(&path, name)? {
            return Ok(Some(found));
        }
    }
    Ok(None)
}

/// Move the binaries found in `source` into `dest_dir`.
///
/// On Windows every file in `bin/` moves up; elsewhere only ffmpeg/ffprobe do.
fn move_binaries(
    source: &Path,
    dest_dir: &Path,
    os: Os,
    placed: &mut Vec<PathBuf>,
) -> io::Result<()> {
    let wanted: Vec<String> = BinaryKind::ALL.iter().map(|k| k.file_name(os)).collect();

    for entry in fs::read_dir(source)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()).map(str::to_string) else {
            continue;
        };
        if os != Os::Win32 && !wanted.contains(&name) {
            continue;
        }

        let target = dest_dir.join(&name);
        fs::rename(&path, &target)?;
        placed.push(target.clone());
        if os != Os::Win32 {
            make_executable(&target)?;
        }
        debug!(path = %target.display(), "Placed binary");
    }

    if os == Os::Win32 && !placed.iter().any(|p| wanted.iter().any(|w| p.ends_with(w))) {
        // bin/ held something, but not the binaries we need
        for path in placed.drain(..) {
            remove_quietly(&path);
        }
    }
    Ok(())
}

#[cfg(unix)]
fn make_executable(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
}

#[cfg(not(unix))]
#[allow(clippy::unnecessary_wraps)]
fn make_executable(_path: &Path) -> io::Result<()> {
    Ok(())
}

fn remove_quietly(path: &Path) {
    let result = if path.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    if let Err(e) = result
        && e.kind() != io::ErrorKind::NotFound
    {
        warn!(path = %path.display(), error = %e, "Cleanup failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn archive_names_come_from_url() {
        assert_eq!(
            archive_file_name(
                "https://johnvansickle.com/ffmpeg/releases/ffmpeg-release-amd64-static.tar.xz",
                ArchiveFormat::TarXz
            ),
            "ffmpeg-release-amd64-static.tar.xz"
        );
        assert_eq!(archive_file_name("https://host/", ArchiveFormat::Zip), "download.zip");
    }

    #[test]
    fn finds_nested_bin_dir() {
        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join("ffmpeg-master-latest-win64-gpl").join("bin");
        fs::create_dir_all(&bin).unwrap();
        fs::create_dir_all(dir.path().join("ffmpeg-master-latest-win64-gpl").join("doc")).unwrap();
        assert_eq!(find_dir_named(dir.path(), "bin").unwrap(), Some(bin));
    }

    #[test]
    fn non_windows_moves_only_wanted_binaries() {
        let src = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        fs::write(src.path().join("ffmpeg"), b"bin").unwrap();
        fs::write(src.path().join("README.txt"), b"doc").unwrap();

        let mut placed = Vec::new();
        move_binaries(src.path(), dest.path(), Os::Linux, &mut placed).unwrap();

        assert_eq!(placed, vec![dest.path().join("ffmpeg")]);
        assert!(!dest.path().join("README.txt").exists());
    }

    #[test]
    fn windows_bin_without_ffmpeg_places_nothing() {
        let src = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        fs::write(src.path().join("ffplay.exe"), b"bin").unwrap();

        let mut placed = Vec::new();
        move_binaries(src.path(), dest.path(), Os::Win32, &mut placed).unwrap();

        assert!(placed.is_empty());
        assert!(!dest.path().join("ffplay.exe").exists());
    }
}
