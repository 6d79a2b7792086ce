//! Locating ffmpeg/ffprobe on this machine.

use std::path::PathBuf;

use streamhost_core::platform::{Os, PlatformTarget};
use streamhost_core::ports::ExternalCommand;
use streamhost_core::{BinaryKind, ResolvedBinaries};
use tracing::debug;

use crate::context::ProvisionContext;
use crate::system::parse;

/// Finds binaries on the search path or in the streaming-server directory.
#[derive(Debug, Clone, Copy)]
pub struct BinaryResolver<'a> {
    ctx: &'a ProvisionContext,
}

impl<'a> BinaryResolver<'a> {
    pub const fn new(ctx: &'a ProvisionContext) -> Self {
        Self { ctx }
    }

    /// Resolve one binary. A system installation wins over a downloaded copy.
    ///
    /// Never fails: lookup errors are logged at debug level and treated as absence.
    pub async fn resolve(&self, kind: BinaryKind, platform: PlatformTarget) -> Option<PathBuf> {
        if let Some(system) = self.system_binary(kind, platform.os).await {
            debug!(binary = %kind, path = %system.display(), "Using system binary");
            return Some(system);
        }

        let local = self
            .ctx
            .paths
            .streaming_server_dir()
            .join(kind.file_name(platform.os));
        if local.is_file() {
            debug!(binary = %kind, path = %local.display(), "Using downloaded binary");
            Some(local)
        } else {
            None
        }
    }

    /// Resolve both binaries, or `None` when either is missing.
    pub async fn resolve_all(&self, platform: PlatformTarget) -> Option<ResolvedBinaries> {
        Some(ResolvedBinaries {
            ffmpeg: self.resolve(BinaryKind::Ffmpeg, platform).await?,
            ffprobe: self.resolve(BinaryKind::Ffprobe, platform).await?,
        })
    }

    /// Kinds that currently resolve to nothing.
    pub async fn missing(&self, platform: PlatformTarget) -> Vec<BinaryKind> {
        let mut missing = Vec::new();
        for kind in BinaryKind::ALL {
            if self.resolve(kind, platform).await.is_none() {
                missing.push(kind);
            }
        }
        missing
    }

    async fn system_binary(&self, kind: BinaryKind, os: Os) -> Option<PathBuf> {
        let command = locate_command(os, kind.name());
        match self.ctx.commands.output(&command).await {
            Ok(out) if out.success() => parse::first_existing_path(&out.stdout),
            Ok(_) => None,
            Err(e) => {
                debug!(binary = %kind, error = %e, "Locate command unavailable");
                None
            }
        }
    }
}

/// `where <name>` on Windows, `which <name>` elsewhere.
pub fn locate_command(os: Os, name: &str) -> ExternalCommand {
    let program = if os == Os::Win32 { "where" } else { "which" };
    ExternalCommand::new(program).arg(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locate_command_per_os() {
        assert_eq!(locate_command(Os::Win32, "ffmpeg").to_string(), "where ffmpeg");
        assert_eq!(locate_command(Os::Darwin, "ffprobe").to_string(), "which ffprobe");
    }
}
